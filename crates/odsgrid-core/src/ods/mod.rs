//! The content.xml <-> spreadsheet model transform.
//!
//! [`parse`] flattens the XML into a [`SpreadsheetModel`](crate::SpreadsheetModel);
//! [`apply_edit`] writes one cell back into the retained tree. Both locate
//! tables, rows and cells through the shared functions in `layout`, so a
//! cell address means the same node on both sides.

mod layout;
mod parser;
mod patch;

pub use layout::{MAX_COLUMNS, MAX_ROWS};
pub use parser::{parse, parse_document};
pub use patch::{apply_edit, patch_cell};

/// Qualified element and attribute names used by the spreadsheet layer.
pub mod names {
    pub const DOCUMENT_CONTENT: &str = "office:document-content";
    pub const BODY: &str = "office:body";
    pub const SPREADSHEET: &str = "office:spreadsheet";

    pub const TABLE: &str = "table:table";
    pub const TABLE_ROW: &str = "table:table-row";
    pub const TABLE_CELL: &str = "table:table-cell";
    /// Containers that may wrap rows inside a table, in any nesting.
    pub const ROW_CONTAINERS: [&str; 3] = [
        "table:table-header-rows",
        "table:table-rows",
        "table:table-row-group",
    ];

    pub const TEXT_P: &str = "text:p";
    pub const TEXT_S: &str = "text:s";
    pub const TEXT_TAB: &str = "text:tab";
    pub const TEXT_LINE_BREAK: &str = "text:line-break";

    pub const ATTR_TABLE_NAME: &str = "table:name";
    pub const ATTR_COLUMNS_REPEATED: &str = "table:number-columns-repeated";
    pub const ATTR_VALUE_TYPE: &str = "office:value-type";
    pub const ATTR_FORMULA: &str = "table:formula";
    pub const ATTR_STYLE_NAME: &str = "table:style-name";
    pub const ATTR_SPACE_COUNT: &str = "text:c";
}
