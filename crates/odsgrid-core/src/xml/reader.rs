//! Building an [`XmlDocument`] from text with quick-xml.

use super::tree::{Element, Node, XmlDocument};
use crate::error::XmlError;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

pub(crate) fn read_document(text: &str) -> Result<XmlDocument, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut doc = XmlDocument::default();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(XmlError::Syntax {
                    position: reader.error_position() as u64,
                    message: err.to_string(),
                });
            }
        };

        match event {
            Event::Decl(e) => {
                if stack.is_empty() && doc.declaration.is_none() {
                    doc.declaration = Some(utf8(&e, position)?.to_string());
                }
            }
            Event::Start(e) => stack.push(start_element(&e, position)?),
            Event::Empty(e) => {
                let element = start_element(&e, position)?;
                push_node(&mut stack, &mut doc, Node::Element(element));
            }
            Event::End(e) => {
                let Some(element) = stack.pop() else {
                    let name = utf8(e.name().as_ref(), position)?.to_string();
                    return Err(XmlError::UnmatchedEnd(name));
                };
                push_node(&mut stack, &mut doc, Node::Element(element));
            }
            Event::Text(e) => {
                let raw = utf8(&e, position)?;
                let text = unescape(raw)
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                push_text(&mut stack, &mut doc, &text);
            }
            Event::GeneralRef(e) => {
                let entity = format!("&{};", utf8(&e, position)?);
                let text = unescape(&entity)
                    .map(|t| t.into_owned())
                    .unwrap_or(entity);
                push_text(&mut stack, &mut doc, &text);
            }
            Event::CData(e) => {
                let text = utf8(&e, position)?.to_string();
                push_node(&mut stack, &mut doc, Node::CData(text));
            }
            Event::Comment(e) => {
                let text = utf8(&e, position)?.to_string();
                push_node(&mut stack, &mut doc, Node::Comment(text));
            }
            Event::PI(e) => {
                let text = utf8(&e, position)?.to_string();
                push_node(&mut stack, &mut doc, Node::ProcessingInstruction(text));
            }
            Event::DocType(e) => {
                let text = utf8(&e, position)?.to_string();
                push_node(&mut stack, &mut doc, Node::DocType(text));
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    if doc.root().is_none() {
        return Err(XmlError::NoRoot);
    }
    Ok(doc)
}

fn start_element(e: &BytesStart<'_>, position: u64) -> Result<Element, XmlError> {
    let mut element = Element::new(utf8(e.name().as_ref(), position)?);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::Syntax {
            position,
            message: err.to_string(),
        })?;
        let key = utf8(attr.key.as_ref(), position)?.to_string();
        let raw = utf8(&attr.value, position)?;
        let value = unescape(raw)
            .map_err(|err| XmlError::Syntax {
                position,
                message: err.to_string(),
            })?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn push_node(stack: &mut [Element], doc: &mut XmlDocument, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => doc.nodes.push(node),
    }
}

/// Append text, merging with a preceding text node so entity references
/// reported as separate events end up in one run.
fn push_text(stack: &mut [Element], doc: &mut XmlDocument, text: &str) {
    let nodes = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => &mut doc.nodes,
    };
    if let Some(Node::Text(existing)) = nodes.last_mut() {
        existing.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|_| XmlError::Utf8 { position })
}
