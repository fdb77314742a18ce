//! FictionBook writer.
//!
//! Writing happens in two phases. The typed metadata record is marshaled to
//! indented markup and parsed back into a tree; the document's free-form
//! fragments are then spliced into that tree at fixed mount points:
//!
//! 1. `<?xml?>` declaration and one `<?xml-stylesheet?>` per stylesheet,
//!    in insertion order, before the root element.
//! 2. Namespace declarations on `<FictionBook>`.
//! 3. The annotation fragment as the sole child of
//!    `description/title-info/annotation`.
//! 4. The body fragment in place of `<body>`, followed by a single newline.
//!
//! The result is checked for an intact body title block before it is
//! serialized.

use quick_xml::escape::escape;

use crate::document::DocumentState;
use crate::dom::{Node, parse_document, write_document};
use crate::error::{Error, Result};

/// Namespace of FictionBook 2 elements.
pub const FB2_NAMESPACE: &str = "http://www.gribuser.ru/xml/fictionbook/2.0";
/// XLink namespace, bound to the `l` prefix.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

const ANNOTATION_PATH: &str = "description/title-info/annotation";
const BODY_NAME: &str = "body";
const TITLE_PARAGRAPHS: &str = "title/p";

pub(crate) fn render(state: &DocumentState) -> Result<String> {
    let markup = state.data.to_markup()?;
    let mut doc = parse_document(&markup)?;

    doc.insert_before_root("xml", r#"version="1.0" encoding="UTF-8""#);
    for sheet in &state.data.stylesheets {
        let content = format!(
            r#"type="{}" href="{}""#,
            escape(sheet.mime_type.as_str()),
            escape(sheet.href.as_str())
        );
        doc.insert_before_root("xml-stylesheet", &content);
    }

    let root = doc
        .root_mut()
        .ok_or_else(|| Error::InvalidStructure("marshaled metadata has no root".into()))?;
    root.set_attr("xmlns:l", XLINK_NAMESPACE);
    root.set_attr("xmlns", FB2_NAMESPACE);

    if let Some(annotation) = &state.annotation
        && let Some(mount) = root.find_mut(ANNOTATION_PATH)
    {
        mount.children = vec![Node::Element(annotation.clone())];
    }

    let at = root
        .children
        .iter()
        .position(|n| matches!(n, Node::Element(e) if e.name == BODY_NAME))
        .ok_or_else(|| Error::InvalidStructure("marshaled metadata has no body".into()))?;
    root.children[at] = Node::Element(state.body.clone());
    // The body's tail is a bare newline, like the skeleton's own children.
    match root.children.get_mut(at + 1) {
        Some(Node::Text(tail)) => *tail = "\n".to_string(),
        _ => root.children.insert(at + 1, Node::Text("\n".to_string())),
    }

    let paragraphs = root.children[at]
        .as_element()
        .map_or(0, |body| body.find_all(TITLE_PARAGRAPHS).len());
    if paragraphs < 2 {
        return Err(Error::InvalidStructure(format!(
            "body title block has {paragraphs} paragraph(s), expected at least 2"
        )));
    }

    let out = write_document(&doc);
    tracing::debug!(bytes = out.len(), "document written");
    Ok(out)
}
