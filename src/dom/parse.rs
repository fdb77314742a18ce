//! Markup text to tree, built on the quick-xml pull reader.
//!
//! Whitespace is never trimmed: every text run becomes a [`Node::Text`] so
//! that re-serializing a parsed tree reproduces its layout.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

use super::node::{Attribute, Element, Node, XmlDocument};

/// Parse a complete document. Exactly one root element is required.
pub fn parse_document(markup: &str) -> Result<XmlDocument> {
    let children = parse_nodes(markup)?;
    match children.iter().filter(|n| matches!(n, Node::Element(_))).count() {
        1 => Ok(XmlDocument { children }),
        0 => Err(Error::MalformedMarkup("document has no root element".into())),
        n => Err(Error::MalformedMarkup(format!(
            "document has {n} root elements"
        ))),
    }
}

/// Parse a fragment that may hold any number of top-level elements
/// interleaved with text, e.g. a run of paragraphs.
pub fn parse_fragment(markup: &str) -> Result<Vec<Node>> {
    parse_nodes(markup)
}

fn parse_nodes(markup: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);

    let mut top: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::MalformedMarkup(format!("{e} at position {}", reader.error_position()))
        })?;
        match event {
            Event::Start(e) => stack.push(start_element(&e)?),
            Event::Empty(e) => {
                let element = start_element(&e)?;
                append(&mut stack, &mut top, Node::Element(element));
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::MalformedMarkup("unexpected closing tag".into()))?;
                append(&mut stack, &mut top, Node::Element(element));
            }
            Event::Text(e) => {
                let text = String::from_utf8_lossy(e.as_ref());
                push_text(&mut stack, &mut top, &text);
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&entity).ok_or_else(|| {
                    Error::MalformedMarkup(format!("undefined entity '&{entity};'"))
                })?;
                push_text(&mut stack, &mut top, &resolved);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                append(&mut stack, &mut top, Node::CData(text));
            }
            Event::Comment(e) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                append(&mut stack, &mut top, Node::Comment(text));
            }
            Event::Decl(e) => {
                let (target, content) = split_instruction(&String::from_utf8_lossy(&e));
                append(
                    &mut stack,
                    &mut top,
                    Node::ProcessingInstruction { target, content },
                );
            }
            Event::PI(e) => {
                let (target, content) = split_instruction(&String::from_utf8_lossy(&e));
                append(
                    &mut stack,
                    &mut top,
                    Node::ProcessingInstruction { target, content },
                );
            }
            Event::DocType(e) => {
                let text = String::from_utf8_lossy(&e).trim().to_string();
                append(&mut stack, &mut top, Node::DocType(text));
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::MalformedMarkup(format!(
            "unclosed element <{}>",
            open.name
        )));
    }
    Ok(top)
}

fn start_element(start: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::MalformedMarkup(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|e| Error::MalformedMarkup(e.to_string()))?;
        element.attributes.push(Attribute {
            key,
            value: value.into_owned(),
        });
    }
    Ok(element)
}

fn append(stack: &mut [Element], top: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    }
}

/// Text arrives in pieces around entity references; merge adjacent runs.
fn push_text(stack: &mut [Element], top: &mut Vec<Node>, text: &str) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => top,
    };
    match siblings.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => siblings.push(Node::Text(text.to_string())),
    }
}

fn split_instruction(raw: &str) -> (String, String) {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((target, content)) => (target.to_string(), content.trim().to_string()),
        None => (raw.to_string(), String::new()),
    }
}

/// Resolve predefined XML entities and character references.
fn resolve_entity(entity: &str) -> Option<Cow<'static, str>> {
    match entity {
        "apos" => return Some(Cow::Borrowed("'")),
        "quot" => return Some(Cow::Borrowed("\"")),
        "lt" => return Some(Cow::Borrowed("<")),
        "gt" => return Some(Cow::Borrowed(">")),
        "amp" => return Some(Cow::Borrowed("&")),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code).map(|c| Cow::Owned(c.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_keeps_whitespace_and_order() {
        let nodes = parse_fragment("<p>one</p>\n<p>two</p>").unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1], Node::Text("\n".into()));
        let names: Vec<_> = nodes
            .iter()
            .filter_map(Node::as_element)
            .map(|e| e.text())
            .collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_entities_and_char_refs() {
        let nodes = parse_fragment("<p>a &amp; b &lt;c&gt; &#65;&#x42;</p>").unwrap();
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.text(), "a & b <c> AB");
        assert_eq!(p.children.len(), 1);
    }

    #[test]
    fn test_parse_attributes_with_prefix() {
        let nodes = parse_fragment(r#"<a l:href="https://x.test/?a=1&amp;b=2">link</a>"#).unwrap();
        let a = nodes[0].as_element().unwrap();
        assert_eq!(a.attr("l:href"), Some("https://x.test/?a=1&b=2"));
    }

    #[test]
    fn test_parse_mismatched_tags_fails() {
        let err = parse_fragment("<p><strong>text</p></strong>").unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(_)));
    }

    #[test]
    fn test_parse_unclosed_tag_fails() {
        let err = parse_fragment("<p>text").unwrap_err();
        assert!(matches!(err, Error::MalformedMarkup(_)));
    }

    #[test]
    fn test_parse_unknown_entity_fails() {
        assert!(parse_fragment("<p>&nbsp;</p>").is_err());
    }

    #[test]
    fn test_parse_document_with_prolog() {
        let doc = parse_document(
            "<?xml version=\"1.0\"?>\n<?xml-stylesheet href=\"a.css\"?>\n<!--c--><root/>",
        )
        .unwrap();
        assert!(matches!(
            &doc.children[0],
            Node::ProcessingInstruction { target, content }
                if target == "xml" && content == "version=\"1.0\""
        ));
        assert!(matches!(
            &doc.children[2],
            Node::ProcessingInstruction { target, .. } if target == "xml-stylesheet"
        ));
        assert_eq!(doc.root().unwrap().name, "root");
    }

    #[test]
    fn test_parse_document_requires_single_root() {
        assert!(parse_document("<a/><b/>").is_err());
        assert!(parse_document("  ").is_err());
    }

    #[test]
    fn test_parse_empty_fragment() {
        assert!(parse_fragment("").unwrap().is_empty());
    }
}
