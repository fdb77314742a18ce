//! Document API tests.
//!
//! Tests for metadata setters, the author line, annotations, sections and
//! concurrent use of a shared document.

use std::sync::Arc;
use std::thread;

use fictionbook::dom::{Element, Node, parse_document, write_element};
use fictionbook::{Author, Document, Error};

/// Element structure with whitespace-only text dropped, for comparisons
/// that ignore formatting.
fn normalized(element: &Element) -> String {
    fn strip(element: &Element) -> Element {
        let mut out = Element::new(element.name.clone());
        out.attributes = element.attributes.clone();
        for child in &element.children {
            match child {
                Node::Element(e) => out.push_element(strip(e)),
                Node::Text(t) if t.trim().is_empty() => {}
                Node::Text(t) => out.push_text(t.trim()),
                _ => {}
            }
        }
        out
    }
    write_element(&strip(element))
}

fn normalized_markup(markup: &str) -> String {
    let doc = parse_document(markup).expect("markup is not well-formed");
    normalized(doc.root().expect("no root"))
}

// ============================================================================
// Authors
// ============================================================================

#[test]
fn test_author_line_tracks_every_author() {
    let doc = Document::new("Test1");
    doc.set_author(Author::new("Leo", "Tolstoy"));
    assert_eq!(doc.author(), "Leo Tolstoy");
    assert_eq!(doc.body().find("title/p").unwrap().text(), "Leo Tolstoy");

    doc.set_author(Author::new("Anna", "Karenina"));
    assert_eq!(doc.author(), "Leo Tolstoy, Anna Karenina");
    let body = doc.body();
    let paras = body.find_all("title/p");
    assert_eq!(paras[0].text(), "Leo Tolstoy, Anna Karenina");
    assert_eq!(paras[1].text(), "Test1");
}

#[test]
fn test_author_from_display_name() {
    let doc = Document::new("T");
    doc.set_author(Author::from_display_name("Arthur Conan Doyle"));
    let author = &doc.metadata().description.title_info.authors[0];
    assert_eq!(author.first_name, "Arthur Conan");
    assert_eq!(author.last_name, "Doyle");
}

#[test]
fn test_document_info_contributors() {
    let doc = Document::new("T");
    doc.add_document_author(Author::new("Scan", "Person"));
    doc.add_publisher(Author::new("Pub", "House"));
    doc.add_translator(Author::new("Tran", "Slator"));
    doc.set_publisher("Penguin");

    let data = doc.metadata();
    assert_eq!(data.description.document_info.authors.len(), 1);
    assert_eq!(data.description.document_info.publishers.len(), 1);
    assert_eq!(data.description.title_info.translators.len(), 1);
    assert_eq!(data.description.publish_info.publisher, "Penguin");
    // Contributors do not touch the body author line.
    assert_eq!(doc.body().find("title/p").unwrap().text(), "");
}

// ============================================================================
// Simple Metadata
// ============================================================================

#[test]
fn test_simple_setters_and_accessors() {
    let doc = Document::new("Test1");
    assert_eq!(doc.title(), "Test1");
    assert_eq!(doc.lang(), "");

    doc.set_lang("en");
    doc.set_identifier("urn:isbn:123");
    doc.set_keywords("sea, whales");
    doc.add_custom_info("source", "scanned");

    assert_eq!(doc.lang(), "en");
    assert_eq!(doc.identifier(), "urn:isbn:123");
    let data = doc.metadata();
    assert_eq!(data.description.title_info.keywords, "sea, whales");
    assert_eq!(data.description.custom_info[0].info_type, "source");
    assert_eq!(data.description.custom_info[0].text, "scanned");
}

#[test]
fn test_sequence_display() {
    let doc = Document::new("T");
    doc.set_sequence("Foundation", 1);
    assert_eq!(doc.sequence(), "Foundation #1");
}

// ============================================================================
// Annotation
// ============================================================================

#[test]
fn test_description_round_trip() {
    let doc = Document::new("T");
    let text = "<p>First <emphasis>para</emphasis>.</p>\n  <p>Second.</p>";
    doc.set_description(text).unwrap();

    assert_eq!(
        normalized_markup(&doc.description()),
        normalized_markup(&format!("<section>{text}</section>"))
    );
}

#[test]
fn test_description_plain_text_is_wrapped() {
    let doc = Document::new("T");
    doc.set_description("Just a blurb").unwrap();
    assert_eq!(doc.description(), "<section><p>Just a blurb</p></section>");
}

#[test]
fn test_malformed_description_keeps_previous() {
    let doc = Document::new("T");
    doc.set_description("Kept").unwrap();

    let err = doc.set_description("<p>broken").unwrap_err();
    assert!(matches!(err, Error::MalformedMarkup(_)), "got: {err}");
    assert_eq!(doc.description(), "<section><p>Kept</p></section>");
}

#[test]
fn test_description_replaces_rather_than_appends() {
    let doc = Document::new("T");
    doc.set_description("one").unwrap();
    doc.set_description("two").unwrap();
    let out = doc.write_to_string().unwrap();
    assert!(!out.contains("<p>one</p>"));
    assert!(out.contains("<annotation><section><p>two</p></section></annotation>"));
}

// ============================================================================
// Sections
// ============================================================================

#[test]
fn test_section_copies_top_level_elements_in_order() {
    let doc = Document::new("T");
    doc.add_section(
        "<p>one</p>\n<empty-line/>\n<subtitle>two</subtitle>\n<p>three</p>",
        "Heading",
    )
    .unwrap();

    let body = doc.body();
    let section = body.find("section").unwrap();
    let names: Vec<_> = section.child_elements().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["title", "p", "empty-line", "subtitle", "p"]);
    assert_eq!(section.find("title/p").unwrap().text(), "Heading");
}

#[test]
fn test_section_preserves_nested_markup() {
    let doc = Document::new("T");
    doc.add_section(
        "<p>See <a l:href=\"#note1\" type=\"note\">[1]</a> and <strong>this</strong>.</p>",
        "Notes",
    )
    .unwrap();

    let body = doc.body();
    let para = body.find("section/p").unwrap();
    assert_eq!(para.text_content(), "See [1] and this.");
    let link = para.find("a").unwrap();
    assert_eq!(link.attr("l:href"), Some("#note1"));
    assert_eq!(link.attr("type"), Some("note"));
}

#[test]
fn test_failed_section_leaves_body_unchanged() {
    let doc = Document::new("T");
    doc.add_section("<p>ok</p>", "One").unwrap();
    let before = write_element(&doc.body());

    assert!(doc.add_section("<p>a</p><p>b", "Two").is_err());
    assert_eq!(write_element(&doc.body()), before);
}

#[test]
fn test_body_accessor_is_a_copy() {
    let doc = Document::new("T");
    let mut body = doc.body();
    body.children.clear();
    assert!(doc.write_to_string().is_ok());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_mutation() {
    let doc = Arc::new(Document::new("Shared"));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let doc = Arc::clone(&doc);
            thread::spawn(move || {
                doc.add_section(&format!("<p>part {i}</p>"), &format!("S{i}"))
                    .unwrap();
                doc.set_author(Author::new(format!("A{i}"), "Writer"));
                doc.add_genre("prose");
                doc.write_to_string().unwrap()
            })
        })
        .collect();

    for handle in handles {
        let out = handle.join().unwrap();
        assert!(out.contains("<FictionBook"));
    }

    assert_eq!(doc.body().find_all("section").len(), 8);
    assert_eq!(doc.metadata().description.title_info.authors.len(), 8);
    assert_eq!(doc.genres().len(), 8);
    let author_line = doc.body().find("title/p").unwrap().text();
    assert_eq!(author_line.split(", ").count(), 8);
}
