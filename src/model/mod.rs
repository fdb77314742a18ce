//! Typed metadata record for a FictionBook document.
//!
//! These structs mirror the format's `<description>` and `<binary>` sections
//! and are marshaled to markup with quick-xml's serde support. Field order is
//! element order. No validation happens here: free-form strings go out as-is.
//!
//! The book body is *not* modeled here; it is free-form markup held in a
//! [`dom::Element`](crate::dom::Element) and spliced in at the `<body>` mount
//! point when the document is written.

mod description;
mod types;

use serde::Serialize;

pub use description::{AnnotationMount, Description, DocumentInfo, PublishInfo, TitleInfo};
pub use types::{Author, Binary, Coverpage, CustomInfo, Date, Genre, InlineImage, Sequence, Stylesheet};

use crate::error::{Error, Result};

/// Root record: everything except the body content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename = "FictionBook")]
pub struct FictionBook {
    /// Written as processing instructions before the root, never as elements.
    #[serde(skip)]
    pub stylesheets: Vec<Stylesheet>,
    pub description: Description,
    /// Mount point for the body fragment.
    pub body: BodyMount,
    #[serde(rename = "binary")]
    pub binaries: Vec<Binary>,
}

/// Empty placeholder replaced by the body fragment at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BodyMount {}

impl FictionBook {
    /// Marshal the record to indented markup (two spaces per level), without
    /// an XML declaration.
    pub fn to_markup(&self) -> Result<String> {
        let mut out = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut out);
        ser.indent(' ', 2);
        self.serialize(ser)
            .map_err(|e| Error::Serialize(e.to_string()))?;
        Ok(out)
    }

    /// Whether a binary with this id is already registered.
    pub fn has_binary(&self, id: &str) -> bool {
        self.binaries.iter().any(|b| b.id == id)
    }
}
