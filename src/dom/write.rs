//! Tree to markup text.
//!
//! Output is byte-exact with respect to the tree: no indentation is added
//! and no whitespace is dropped. Childless elements are self-closed.

use quick_xml::escape::{escape, partial_escape};

use super::node::{Element, Node, XmlDocument};

/// Serialize a whole document, prolog included.
pub fn write_document(doc: &XmlDocument) -> String {
    let mut out = String::new();
    for node in &doc.children {
        write_node(node, &mut out);
    }
    out
}

/// Serialize a single element and its subtree.
pub fn write_element(element: &Element) -> String {
    let mut out = String::new();
    write_element_into(element, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(e) => write_element_into(e, out),
        Node::Text(t) => out.push_str(&partial_escape(t.as_str())),
        Node::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        Node::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        Node::ProcessingInstruction { target, content } => {
            out.push_str("<?");
            out.push_str(target);
            if !content.is_empty() {
                out.push(' ');
                out.push_str(content);
            }
            out.push_str("?>");
        }
        Node::DocType(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t);
            out.push('>');
        }
    }
}

fn write_element_into(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attributes {
        out.push(' ');
        out.push_str(&attr.key);
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
