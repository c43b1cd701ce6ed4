//! Error types for odsgrid core.

use thiserror::Error;

use crate::address::CellAddress;

/// Errors that can occur while opening, editing or saving a document
#[derive(Error, Debug)]
pub enum OdsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    #[error("content.xml is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("content.xml not found in package")]
    MissingContent,

    #[error("No file path set")]
    NoFilePath,

    #[error("Document cannot be edited: {0}")]
    ReadOnly(String),

    #[error("Sheet {0} does not exist")]
    NoSuchSheet(usize),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

pub type Result<T> = std::result::Result<T, OdsError>;

/// Errors raised while reading or writing the XML tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("invalid UTF-8 at byte {position}")]
    Utf8 { position: u64 },

    #[error("unexpected end of document: <{0}> is never closed")]
    Unclosed(String),

    #[error("closing tag </{0}> has no matching start tag")]
    UnmatchedEnd(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("cannot serialize {0}")]
    Unserializable(String),
}

/// Structural problems in the ODS element layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("root element is <{0}>, expected <office:document-content>")]
    UnexpectedRoot(String),

    #[error("missing <{0}> element")]
    MissingNode(&'static str),

    #[error("row expands to more than {limit} columns")]
    RowTooWide { limit: usize },

    #[error("table has more than {limit} rows")]
    TooManyRows { limit: usize },

    #[error("text run of {0} characters is too long")]
    TextRunTooLong(usize),
}

/// Reasons a single cell edit could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("sheet {0} does not exist")]
    SheetOutOfRange(usize),

    #[error("row {row} does not exist in sheet {sheet}")]
    RowOutOfRange { sheet: usize, row: usize },

    #[error("cell {0} does not exist")]
    CellOutOfRange(CellAddress),

    #[error("failed to rebuild content.xml: {0}")]
    Serialize(#[from] XmlError),
}

/// Invalid textual cell address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid cell address '{0}': expected SHEET:ROW:COL")]
    Invalid(String),

    #[error("invalid cell reference '{0}'")]
    InvalidReference(String),
}
