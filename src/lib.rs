//! # fictionbook
//!
//! Build FictionBook 2 (FB2) ebooks incrementally and write them out as a
//! single XML document.
//!
//! ## Features
//!
//! - Typed metadata: title, authors, genres, series, dates, identifiers
//! - Free-form body sections and annotation given as markup text
//! - Embedded PNG/JPEG images from files, URLs or memory, including a cover
//! - Stylesheet processing instructions
//! - Thread-safe: one [`Document`] can be shared between threads
//!
//! ## Quick Start
//!
//! ```
//! use fictionbook::{Author, Document};
//!
//! let doc = Document::new("The Book");
//! doc.set_author(Author::new("Jane", "Doe"));
//! doc.set_lang("en");
//! doc.set_genres(["sf"]);
//! doc.set_description("A short story.")?;
//! doc.add_section("<p>It was a dark and stormy night.</p>", "Chapter 1")?;
//!
//! let fb2 = doc.write_to_string()?;
//! assert!(fb2.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
//! # Ok::<(), fictionbook::Error>(())
//! ```

pub mod document;
pub mod dom;
pub mod error;
pub mod export;
pub mod media;
pub mod model;
pub mod util;

pub use document::{Document, DocumentConfig};
pub use error::{Error, Result};
pub use media::{FetchConfig, MediaFetcher, SourceFetcher};
pub use model::{Author, FictionBook, Genre, Sequence};
