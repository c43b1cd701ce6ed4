//! Serializing an [`XmlDocument`] back to text.
//!
//! Output is a pure function of the tree: no reformatting, attributes in
//! stored order, whitespace text written verbatim.

use super::tree::{Element, Node, XmlDocument};
use crate::error::XmlError;
use quick_xml::escape::{escape, partial_escape};

pub(crate) fn write_document(doc: &XmlDocument) -> Result<String, XmlError> {
    let mut out = String::new();
    if let Some(decl) = &doc.declaration {
        if decl.contains("?>") {
            return Err(XmlError::Unserializable("XML declaration".into()));
        }
        out.push_str("<?");
        out.push_str(decl);
        out.push_str("?>");
    }
    for node in &doc.nodes {
        write_node(&mut out, node)?;
    }
    Ok(out)
}

fn write_node(out: &mut String, node: &Node) -> Result<(), XmlError> {
    match node {
        Node::Element(element) => write_element(out, element)?,
        Node::Text(text) => push_text(out, text),
        Node::CData(text) => {
            if text.contains("]]>") {
                return Err(XmlError::Unserializable("CDATA section containing ']]>'".into()));
            }
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        Node::Comment(text) => {
            if text.contains("-->") {
                return Err(XmlError::Unserializable("comment containing '-->'".into()));
            }
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(text) => {
            if text.contains("?>") {
                return Err(XmlError::Unserializable(
                    "processing instruction containing '?>'".into(),
                ));
            }
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
        Node::DocType(text) => {
            out.push_str("<!DOCTYPE");
            out.push_str(text);
            out.push('>');
        }
    }
    Ok(())
}

fn write_element(out: &mut String, element: &Element) -> Result<(), XmlError> {
    check_name(&element.name)?;
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        check_name(key)?;
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        push_attr_value(out, value);
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return Ok(());
    }
    out.push('>');
    for child in &element.children {
        write_node(out, child)?;
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
    Ok(())
}

/// Carriage returns are written as references; a reader would normalize a raw one away.
fn push_text(out: &mut String, text: &str) {
    for ch in partial_escape(text).chars() {
        match ch {
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

fn push_attr_value(out: &mut String, value: &str) {
    for ch in escape(value).chars() {
        match ch {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(ch),
        }
    }
}

fn check_name(name: &str) -> Result<(), XmlError> {
    let valid = !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\'' | '&'));
    if valid {
        Ok(())
    } else {
        Err(XmlError::Unserializable(format!("invalid name '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" office:version="1.3"><office:body><!-- c --><text:p>a &amp; b &lt;c&gt;</text:p><x y="1 &quot;q&quot;"/></office:body></office:document-content>"#;

    #[test]
    fn test_round_trip_is_stable() {
        let doc = XmlDocument::parse(CONTENT).unwrap();
        let first = doc.to_xml().unwrap();
        let second = XmlDocument::parse(&first).unwrap().to_xml().unwrap();
        assert_eq!(first, second);
        assert_eq!(XmlDocument::parse(&first).unwrap(), doc);
    }

    #[test]
    fn test_round_trip_keeps_layout() {
        let doc = XmlDocument::parse(CONTENT).unwrap();
        let out = doc.to_xml().unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<office:document-content"));
        assert!(out.contains("<!-- c -->"));
        assert!(out.contains("<text:p>a &amp; b &lt;c&gt;</text:p>"));
    }

    #[test]
    fn test_attribute_whitespace_is_escaped() {
        let mut root = Element::new("r");
        root.set_attr("v", "a\nb\t\"c\"");
        let doc = XmlDocument {
            declaration: None,
            nodes: vec![Node::Element(root)],
        };
        let out = doc.to_xml().unwrap();
        assert_eq!(out, r#"<r v="a&#10;b&#9;&quot;c&quot;"/>"#);
        let reparsed = XmlDocument::parse(&out).unwrap();
        assert_eq!(reparsed.root().unwrap().attr("v"), Some("a\nb\t\"c\""));
    }

    #[test]
    fn test_carriage_return_in_text_survives() {
        let doc = XmlDocument::parse("<r>a&#13;b</r>").unwrap();
        assert_eq!(doc.root().unwrap().children, vec![Node::Text("a\rb".into())]);
        let out = doc.to_xml().unwrap();
        assert_eq!(out, "<r>a&#13;b</r>");
        assert_eq!(XmlDocument::parse(&out).unwrap(), doc);
        assert_eq!(XmlDocument::parse(&out).unwrap().to_xml().unwrap(), out);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let doc = XmlDocument {
            declaration: None,
            nodes: vec![Node::Element(Element::new("bad name"))],
        };
        assert!(matches!(doc.to_xml(), Err(XmlError::Unserializable(_))));
    }

    #[test]
    fn test_unterminable_cdata_is_rejected() {
        let mut root = Element::new("r");
        root.children.push(Node::CData("x]]>y".into()));
        let doc = XmlDocument {
            declaration: None,
            nodes: vec![Node::Element(root)],
        };
        assert!(doc.to_xml().is_err());
    }
}
