use crate::address::CellAddress;
use crate::model::{Cell, Sheet, SpreadsheetModel};
use crate::ods;
use crate::storage::Package;
use crate::xml::XmlDocument;
use std::path::PathBuf;
use tracing::{debug, warn};

/// One open spreadsheet: the package it came from, the retained content.xml
/// tree and the model derived from it.
#[derive(Clone, Debug)]
pub struct Document {
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether content has changed since the last save
    pub modified: bool,
    /// Archive the content was read from, if any
    pub(crate) package: Option<Package>,
    /// Retained tree; `None` when content.xml could not be parsed
    pub(crate) tree: Option<XmlDocument>,
    /// Why the tree is missing
    pub(crate) read_only_reason: Option<String>,
    /// Current content.xml text
    pub(crate) content: String,
    pub(crate) model: SpreadsheetModel,
}

impl Document {
    /// Create a session over bare content.xml text.
    ///
    /// Content that is not well-formed still produces a document: its model
    /// is the error placeholder and edits are refused.
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        let (tree, model, read_only_reason) = match XmlDocument::parse(&content) {
            Ok(tree) => {
                let model = ods::parse_document(&tree);
                (Some(tree), model, None)
            }
            Err(err) => {
                warn!(error = %err, "content.xml cannot be parsed, opening read-only");
                (None, ods::parse(&content), Some(err.to_string()))
            }
        };
        debug!(sheets = model.sheets.len(), "document loaded");

        Document {
            file_path: None,
            modified: false,
            package: None,
            tree,
            read_only_reason,
            content,
            model,
        }
    }

    pub fn model(&self) -> &SpreadsheetModel {
        &self.model
    }

    /// Current content.xml text.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn package(&self) -> Option<&Package> {
        self.package.as_ref()
    }

    pub fn sheet_count(&self) -> usize {
        self.model.sheets.len()
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.model.sheets.get(index)
    }

    pub fn cell(&self, address: CellAddress) -> Option<&Cell> {
        self.model.cell(address)
    }

    /// Reason edits are refused, if they are.
    pub fn read_only_reason(&self) -> Option<&str> {
        self.read_only_reason.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.tree.is_none()
    }
}
