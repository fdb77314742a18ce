//! The book being authored.
//!
//! A [`Document`] owns three things: the typed [`FictionBook`] metadata
//! record, a free-form body fragment, and an optional annotation fragment.
//! All state sits behind one mutex; every operation, reads included, holds
//! it for its whole duration, so concurrent callers serialize completely.
//! Media downloads are the exception: bytes are fetched before the lock is
//! taken, and only the resource table update happens under it.

use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;

use crate::dom::{Element, Node, parse_document, parse_fragment, write_element};
use crate::error::{Error, Result};
use crate::export;
use crate::media::{FetchConfig, MediaFetcher, SourceFetcher, encode_image};
use crate::model::{
    Author, Binary, Coverpage, CustomInfo, Date, FictionBook, Genre, InlineImage, Sequence,
    Stylesheet,
};
use crate::util::{has_extension, mime_from_extension, source_extension};

const DATE_VALUE_FORMAT: &str = "%Y-%m-%d";
const DATE_TEXT_FORMAT: &str = "%Y";

/// Internal name and alt text used for cover images.
pub const COVER_ID: &str = "cover";
pub const COVER_ALT: &str = "Cover";

/// Settings applied when a [`Document`] is created.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Written to `document-info/program-used`.
    pub program_used: String,
    /// Written to `document-info/version`.
    pub program_version: String,
    pub fetch: FetchConfig,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            program_used: env!("CARGO_PKG_NAME").to_string(),
            program_version: "1.0".to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

impl DocumentConfig {
    pub fn with_program(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.program_used = name.into();
        self.program_version = version.into();
        self
    }

    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }
}

/// Everything guarded by the document lock.
#[derive(Debug, Clone)]
pub(crate) struct DocumentState {
    pub(crate) data: FictionBook,
    pub(crate) body: Element,
    pub(crate) annotation: Option<Element>,
}

/// A FictionBook document under construction.
///
/// # Example
///
/// ```no_run
/// use fictionbook::{Author, Document};
///
/// let doc = Document::new("My Book");
/// doc.set_author(Author::new("Jane", "Doe"));
/// doc.add_section("<p>Once upon a time.</p>", "Chapter 1")?;
/// doc.set_cover("cover.jpg")?;
/// doc.write_to_file("my-book.fb2")?;
/// # Ok::<(), fictionbook::Error>(())
/// ```
pub struct Document {
    state: Mutex<DocumentState>,
    fetcher: Box<dyn MediaFetcher>,
}

impl Document {
    /// Create a document with default settings.
    pub fn new(title: &str) -> Self {
        Self::with_config(title, DocumentConfig::default())
    }

    pub fn with_config(title: &str, config: DocumentConfig) -> Self {
        let fetcher = SourceFetcher::new(config.fetch.clone());
        Self::with_fetcher(title, config, fetcher)
    }

    /// Create a document that retrieves images through `fetcher`.
    pub fn with_fetcher(title: &str, config: DocumentConfig, fetcher: impl MediaFetcher + 'static) -> Self {
        let now = Local::now();
        let mut data = FictionBook::default();

        let title_info = &mut data.description.title_info;
        title_info.book_title = title.to_string();

        let document_info = &mut data.description.document_info;
        document_info.id = uuid::Uuid::new_v4().to_string();
        document_info.date = Date {
            value: now.format(DATE_VALUE_FORMAT).to_string(),
            text: now.format(DATE_TEXT_FORMAT).to_string(),
        };
        document_info.program_used = config.program_used;
        document_info.version = config.program_version;

        data.description.publish_info.book_name = title.to_string();

        Self {
            state: Mutex::new(DocumentState {
                data,
                body: body_skeleton(title),
                annotation: None,
            }),
            fetcher: Box::new(fetcher),
        }
    }

    fn state(&self) -> MutexGuard<'_, DocumentState> {
        // Every mutation is a single assignment or push, so a panic in
        // another thread cannot leave the state half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Stylesheets and binaries
    // ------------------------------------------------------------------

    /// Append an `xml-stylesheet` reference. Duplicates are kept.
    pub fn add_stylesheet(&self, mime_type: &str, href: &str) {
        self.state().data.stylesheets.push(Stylesheet {
            mime_type: mime_type.to_string(),
            href: href.to_string(),
        });
    }

    /// Fetch an image from a path or URL and embed it.
    ///
    /// An empty `internal_name` becomes `_image<N>` with the source's
    /// extension, where N is the number of binaries already embedded; a
    /// given name without an extension gets the source's extension appended.
    /// An empty `mime_type` is derived from the extension. Returns the final
    /// internal name, which in-document links reference as `#<name>`.
    pub fn add_image(&self, source: &str, internal_name: &str, mime_type: &str) -> Result<String> {
        self.embed_source(source, internal_name, mime_type, true)
    }

    fn embed_source(
        &self,
        source: &str,
        internal_name: &str,
        mime_type: &str,
        append_extension: bool,
    ) -> Result<String> {
        let raw = self.fetcher.fetch(source)?;
        let encoded = encode_image(&raw)?;
        let ext = source_extension(source);

        let mut state = self.state();
        let id = if internal_name.is_empty() {
            format!("_image{}{}", state.data.binaries.len(), ext)
        } else if append_extension && !has_extension(internal_name) {
            format!("{internal_name}{ext}")
        } else {
            internal_name.to_string()
        };
        let content_type = if mime_type.is_empty() {
            mime_from_extension(&ext)
        } else {
            mime_type.to_string()
        };
        push_binary(&mut state.data, id.clone(), content_type, encoded.base64);
        Ok(id)
    }

    /// Embed an in-memory image. The content type defaults to the sniffed
    /// type when `mime_type` is empty.
    pub fn add_image_data(&self, data: &[u8], internal_name: &str, mime_type: &str) -> Result<String> {
        let encoded = encode_image(data)?;

        let mut state = self.state();
        let id = if internal_name.is_empty() {
            format!("_image{}", state.data.binaries.len())
        } else {
            internal_name.to_string()
        };
        let content_type = if mime_type.is_empty() {
            encoded.format.mime_type().to_string()
        } else {
            mime_type.to_string()
        };
        push_binary(&mut state.data, id.clone(), content_type, encoded.base64);
        Ok(id)
    }

    /// Embed an image under the id `cover` and reference it from
    /// title-info as `#cover`.
    ///
    /// Calling this again adds another coverpage entry; readers use the first.
    pub fn set_cover(&self, source: &str) -> Result<()> {
        let id = self.embed_source(source, COVER_ID, "", false)?;
        self.push_coverpage(&id);
        Ok(())
    }

    /// [`set_cover`](Self::set_cover) for an in-memory image.
    pub fn set_cover_data(&self, data: &[u8]) -> Result<()> {
        let id = self.add_image_data(data, COVER_ID, "")?;
        self.push_coverpage(&id);
        Ok(())
    }

    fn push_coverpage(&self, id: &str) {
        self.state()
            .data
            .description
            .title_info
            .coverpages
            .push(Coverpage {
                image: InlineImage {
                    href: format!("#{id}"),
                    alt: COVER_ALT.to_string(),
                },
            });
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Append a section built from `body_markup` with `section_title` as its
    /// heading. The markup may hold several top-level elements; each is
    /// deep-copied into the section in source order.
    pub fn add_section(&self, body_markup: &str, section_title: &str) -> Result<()> {
        let content = parse_fragment(body_markup)?;

        let mut title = Element::new("title");
        title.push_element(Element::new("p").with_text(section_title));

        let mut section = Element::new("section");
        section.push_text("\n");
        section.push_element(title);
        section.push_text("\n");
        for node in content {
            if let Node::Element(element) = node {
                section.push_element(element);
                section.push_text("\n");
            }
        }

        let mut state = self.state();
        state.body.push_element(section);
        state.body.push_text("\n");
        tracing::debug!(title = section_title, "section appended");
        Ok(())
    }

    /// Replace the annotation with `text`. Plain text is wrapped in a
    /// paragraph; on error the previous annotation is kept.
    pub fn set_description(&self, text: &str) -> Result<()> {
        let text = text.trim();
        let wrapped = if text.starts_with("<p>") {
            format!("<section>{text}</section>")
        } else {
            format!("<section><p>{text}</p></section>")
        };
        let doc = parse_document(&wrapped)?;
        let root = doc
            .root()
            .cloned()
            .ok_or_else(|| Error::MalformedMarkup("description has no root".into()))?;
        self.state().annotation = Some(root);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Metadata setters
    // ------------------------------------------------------------------

    /// Add an author and refresh the body's author line with every author
    /// set so far.
    pub fn set_author(&self, author: Author) {
        let mut state = self.state();
        state.data.description.title_info.authors.push(author);
        let joined = join_authors(&state.data.description.title_info.authors);
        if let Some(line) = state.body.find_mut("title/p") {
            line.set_text(joined);
        }
    }

    /// Rename the book in title-info, publish-info and the body title block.
    pub fn set_title(&self, title: &str) {
        let mut state = self.state();
        state.data.description.title_info.book_title = title.to_string();
        state.data.description.publish_info.book_name = title.to_string();
        if let Some(line) = state.body.find_nth_mut("title/p", 1) {
            line.set_text(title);
        }
    }

    pub fn set_identifier(&self, identifier: &str) {
        self.state().data.description.document_info.id = identifier.to_string();
    }

    pub fn set_lang(&self, lang: &str) {
        self.state().data.description.title_info.lang = lang.to_string();
    }

    pub fn set_sequence(&self, name: &str, number: u32) {
        self.state().data.description.title_info.sequence = Some(Sequence {
            name: name.to_string(),
            number: Some(number),
        });
    }

    /// Replace the genre list.
    pub fn set_genres<I, S>(&self, genres: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().data.description.title_info.genres =
            genres.into_iter().map(Genre::new).collect();
    }

    pub fn add_genre(&self, genre: &str) {
        self.state()
            .data
            .description
            .title_info
            .genres
            .push(Genre::new(genre));
    }

    pub fn add_translator(&self, translator: Author) {
        self.state()
            .data
            .description
            .title_info
            .translators
            .push(translator);
    }

    pub fn set_keywords(&self, keywords: &str) {
        self.state().data.description.title_info.keywords = keywords.to_string();
    }

    /// Add a contributor to document-info (the person who prepared the file).
    pub fn add_document_author(&self, author: Author) {
        self.state()
            .data
            .description
            .document_info
            .authors
            .push(author);
    }

    /// Add a publisher entry to document-info.
    pub fn add_publisher(&self, publisher: Author) {
        self.state()
            .data
            .description
            .document_info
            .publishers
            .push(publisher);
    }

    /// Set the paper edition's publisher name in publish-info.
    pub fn set_publisher(&self, name: &str) {
        self.state().data.description.publish_info.publisher = name.to_string();
    }

    pub fn add_custom_info(&self, info_type: &str, text: &str) {
        self.state().data.description.custom_info.push(CustomInfo {
            info_type: info_type.to_string(),
            text: text.to_string(),
        });
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn title(&self) -> String {
        self.state().data.description.title_info.book_title.clone()
    }

    /// Comma-joined display names of all authors.
    pub fn author(&self) -> String {
        join_authors(&self.state().data.description.title_info.authors)
    }

    /// The annotation as markup, or an empty string if none is set.
    pub fn description(&self) -> String {
        self.state()
            .annotation
            .as_ref()
            .map(write_element)
            .unwrap_or_default()
    }

    pub fn identifier(&self) -> String {
        self.state().data.description.document_info.id.clone()
    }

    pub fn lang(&self) -> String {
        self.state().data.description.title_info.lang.clone()
    }

    pub fn genres(&self) -> Vec<String> {
        self.state()
            .data
            .description
            .title_info
            .genres
            .iter()
            .map(|g| g.name.clone())
            .collect()
    }

    /// Series display string, or an empty string if no series is set.
    pub fn sequence(&self) -> String {
        self.state()
            .data
            .description
            .title_info
            .sequence
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Deep copy of the body fragment.
    pub fn body(&self) -> Element {
        self.state().body.clone()
    }

    /// Deep copy of the metadata record.
    pub fn metadata(&self) -> FictionBook {
        self.state().data.clone()
    }

    /// Edit the body fragment directly while holding the document lock.
    ///
    /// The write-time structure check still applies: a body whose title
    /// block no longer holds two paragraphs cannot be written.
    pub fn update_body<R>(&self, f: impl FnOnce(&mut Element) -> R) -> R {
        f(&mut self.state().body)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Render the complete document. Does not modify the document, so
    /// repeated calls yield identical output.
    pub fn write_to_string(&self) -> Result<String> {
        let state = self.state();
        export::render(&state)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let book = self.write_to_string()?;
        writer.write_all(book.as_bytes())?;
        Ok(())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let book = self.write_to_string()?;
        std::fs::write(path, book)?;
        Ok(())
    }
}

/// Two-paragraph title block: an empty author line, then the title.
fn body_skeleton(title: &str) -> Element {
    let mut block = Element::new("title");
    block.push_text("\n");
    block.push_element(Element::new("p"));
    block.push_text("\n");
    block.push_element(Element::new("p").with_text(title));
    block.push_text("\n");

    let mut body = Element::new("body");
    body.push_text("\n");
    body.push_element(block);
    body.push_text("\n");
    body
}

fn join_authors(authors: &[Author]) -> String {
    authors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_binary(data: &mut FictionBook, id: String, content_type: String, base64: String) {
    if data.has_binary(&id) {
        tracing::warn!(id = %id, "duplicate binary id; readers may resolve links to either copy");
    }
    tracing::debug!(id = %id, content_type = %content_type, "binary embedded");
    data.binaries.push(Binary {
        content_type,
        id,
        data: base64,
    });
}
