//! Generic attributed XML tree used as the retained document model.
//!
//! The tree keeps everything the ODS writer needs to rebuild `content.xml`:
//! the XML declaration, prolog nodes, attribute order and qualified names,
//! whitespace text, comments, CDATA and processing instructions.

mod reader;
mod tree;
mod writer;

pub use tree::{Element, Node, XmlDocument};
