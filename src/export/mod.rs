//! Serialization of a [`Document`](crate::Document) to FictionBook markup.
//!
//! Callers normally go through [`Document::write_to_string`],
//! [`Document::write_to`] or [`Document::write_to_file`]; this module holds
//! the splicing algorithm and the format's namespace constants.
//!
//! [`Document::write_to_string`]: crate::Document::write_to_string
//! [`Document::write_to`]: crate::Document::write_to
//! [`Document::write_to_file`]: crate::Document::write_to_file

mod fb2;

pub(crate) use fb2::render;
pub use fb2::{FB2_NAMESPACE, XLINK_NAMESPACE};
