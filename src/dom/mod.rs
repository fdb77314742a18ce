//! Generic element tree for free-form content.
//!
//! The book body and annotation are arbitrary markup supplied by callers, so
//! they live in this loosely-typed tree rather than in the typed metadata
//! record. The tree supports the handful of operations the builder needs:
//! parse, deep copy (`Clone`), path lookup and exact serialization.

mod node;
mod parse;
mod write;

pub use node::{Attribute, Element, Node, XmlDocument};
pub use parse::{parse_document, parse_fragment};
pub use write::{write_document, write_element};
