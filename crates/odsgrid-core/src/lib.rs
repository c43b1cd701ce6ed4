//! odsgrid-core - UI-agnostic ODS content model, cell patching and storage.

pub mod address;
pub mod document;
pub mod error;
pub mod model;
pub mod ods;
pub mod storage;
pub mod xml;

pub use address::CellAddress;
pub use document::Document;
pub use error::{AddressError, OdsError, PatchError, Result};
pub use model::{Cell, Row, Sheet, SpreadsheetModel};
pub use ods::{apply_edit, parse};
pub use xml::XmlDocument;
