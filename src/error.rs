//! Error types for fictionbook operations.

use thiserror::Error;

/// Errors that can occur while building or writing a book.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied section or description text is not well-formed markup.
    #[error("malformed markup: {0}")]
    MalformedMarkup(String),

    /// An image source could not be retrieved or read.
    #[error("failed to fetch media from '{location}': {reason}")]
    MediaFetch { location: String, reason: String },

    /// Fetched bytes are neither PNG nor JPEG.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The body title block was corrupted before a write.
    #[error("invalid document structure: {0}")]
    InvalidStructure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata record could not be marshaled.
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl Error {
    pub(crate) fn fetch(location: &str, reason: impl ToString) -> Self {
        Error::MediaFetch {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
