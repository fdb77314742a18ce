//! The `<description>` block: title-info, document-info, publish-info.

use serde::Serialize;

use super::types::{Author, Coverpage, CustomInfo, Date, Genre, Sequence};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Description {
    #[serde(rename = "title-info")]
    pub title_info: TitleInfo,
    #[serde(rename = "document-info")]
    pub document_info: DocumentInfo,
    #[serde(rename = "publish-info")]
    pub publish_info: PublishInfo,
    #[serde(rename = "custom-info", skip_serializing_if = "Vec::is_empty")]
    pub custom_info: Vec<CustomInfo>,
}

/// Bibliographic data about the book itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitleInfo {
    #[serde(rename = "genre")]
    pub genres: Vec<Genre>,
    #[serde(rename = "author")]
    pub authors: Vec<Author>,
    #[serde(rename = "book-title")]
    pub book_title: String,
    /// Mount point for the free-form annotation; always emitted empty.
    pub annotation: AnnotationMount,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub keywords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(rename = "coverpage")]
    pub coverpages: Vec<Coverpage>,
    pub lang: String,
    #[serde(rename = "src-lang", skip_serializing_if = "String::is_empty")]
    pub src_lang: String,
    #[serde(rename = "translator")]
    pub translators: Vec<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Sequence>,
}

/// Data about this electronic document: who made it, with what, and when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    #[serde(rename = "author")]
    pub authors: Vec<Author>,
    #[serde(rename = "program-used", skip_serializing_if = "String::is_empty")]
    pub program_used: String,
    pub date: Date,
    #[serde(rename = "src-url", skip_serializing_if = "Vec::is_empty")]
    pub src_urls: Vec<String>,
    #[serde(rename = "src-ocr", skip_serializing_if = "String::is_empty")]
    pub src_ocr: String,
    pub id: String,
    pub version: String,
    #[serde(rename = "publisher")]
    pub publishers: Vec<Author>,
}

/// Data about the paper edition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishInfo {
    #[serde(rename = "book-name")]
    pub book_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub publisher: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub year: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub isbn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Sequence>,
}

/// Empty placeholder replaced by the annotation fragment at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationMount {}
