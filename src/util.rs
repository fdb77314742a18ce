//! Text decoding and media sniffing helpers.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Decode a markup file read from disk, such as a CLI section file.
///
/// Valid UTF-8 is borrowed as-is, minus a byte-order mark. Anything else is
/// decoded with the charset named in the file's `<?xml?>` declaration, or
/// Windows-1252 when it names none. Older Russian FB2 sources are usually
/// windows-1251 and declare it.
pub fn decode_markup(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text));
    }

    let encoding = declared_encoding(bytes)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(WINDOWS_1252);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "markup has bytes invalid in its charset");
    }
    text
}

/// Charset named by a leading `<?xml ... encoding="..."?>`, if any.
/// Whitespace may precede the declaration; any other content may not.
pub fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf).ok()? {
            Event::Decl(decl) => {
                let label = decl.encoding()?.ok()?;
                return Some(String::from_utf8_lossy(&label).into_owned());
            }
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            _ => return None,
        }
    }
}

/// Image formats that may be embedded in a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Jpeg,
    Png,
}

impl MediaFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
        }
    }
}

/// Sniff an image format from its magic bytes.
///
/// Only PNG and JPEG are recognized; anything else yields `None`.
pub fn sniff_media_format(data: &[u8]) -> Option<MediaFormat> {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(MediaFormat::Png)
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(MediaFormat::Jpeg)
    } else {
        None
    }
}

/// Short human-readable description of an unrecognized payload.
pub fn describe_unknown(data: &[u8]) -> String {
    if data.starts_with(b"GIF8") {
        "image/gif".to_string()
    } else if data.starts_with(b"RIFF") && data.len() > 12 && &data[8..12] == b"WEBP" {
        "image/webp".to_string()
    } else if data.is_empty() {
        "empty payload".to_string()
    } else if std::str::from_utf8(data).is_ok() {
        "text/plain".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

/// File extension of a local path or URL, with the leading dot
/// (`".jpeg"`), or an empty string.
pub fn source_extension(source: &str) -> String {
    // Query strings and fragments are not part of a URL's file name.
    let path = source
        .split(['?', '#'])
        .next()
        .unwrap_or(source);
    let name = path.rsplit('/').next().unwrap_or(path);
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Whether an internal resource name already carries an extension.
pub fn has_extension(name: &str) -> bool {
    Path::new(name).extension().is_some()
}

/// MIME type implied by a file extension: `image/<ext>`, defaulting to
/// `image/jpg` when there is no extension.
pub fn mime_from_extension(ext: &str) -> String {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() {
        "image/jpg".to_string()
    } else {
        format!("image/{ext}")
    }
}
