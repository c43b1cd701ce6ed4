use crate::error::XmlError;
use std::str::FromStr;

/// One node of the XML tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data.
    Text(String),
    CData(String),
    /// Raw comment body, without the `<!--` / `-->` markers.
    Comment(String),
    /// Raw processing instruction body, without `<?` / `?>`.
    ProcessingInstruction(String),
    /// Raw doctype body, without `<!DOCTYPE` / `>`.
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_element_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|e| e.name == name)
    }
}

/// An element with its qualified name, attributes in source order and children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute by qualified name (e.g. `table:name`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Child elements, skipping text and other node kinds.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|e| e.name == name)
    }

    /// Every child element named `name`, with its index in `children`.
    ///
    /// Zero, one or many matches all come back as one ordered sequence, so
    /// callers never have to tell a lone child apart from a list of them.
    pub fn collect_children_indexed(&self, name: &str) -> Vec<(usize, &Element)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| match node {
                Node::Element(e) if e.name == name => Some((idx, e)),
                _ => None,
            })
            .collect()
    }

    /// Every child element named `name`, in document order.
    pub fn collect_children(&self, name: &str) -> Vec<&Element> {
        self.collect_children_indexed(name)
            .into_iter()
            .map(|(_, e)| e)
            .collect()
    }

    /// Mutable access to the element stored at `children[index]`.
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index).and_then(Node::as_element_mut)
    }

    /// Follow a path of child indices down the tree.
    pub fn descendant(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &idx in path {
            current = current.children.get(idx)?.as_element()?;
        }
        Some(current)
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &idx in path {
            current = current.element_at_mut(idx)?;
        }
        Some(current)
    }
}

/// A parsed XML document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlDocument {
    /// Raw declaration body (`xml version="1.0" encoding="UTF-8"`), if present.
    pub declaration: Option<String>,
    /// Top-level nodes in document order, including the root element.
    pub nodes: Vec<Node>,
}

impl XmlDocument {
    /// Parse XML text into a tree.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        super::reader::read_document(text)
    }

    /// Serialize the tree back to XML text.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        super::writer::write_document(self)
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(Node::as_element_mut)
    }
}

impl FromStr for XmlDocument {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
