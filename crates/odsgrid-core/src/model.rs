//! Flat, addressable spreadsheet model handed to the presentation layer.

use crate::address::CellAddress;
use serde::{Deserialize, Serialize};

/// Every sheet of the document, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetModel {
    pub sheets: Vec<Sheet>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

/// One row, already expanded: a repeated cell record appears once per column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub formula: String,
    pub style: String,
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

impl Cell {
    pub const DEFAULT_TYPE: &'static str = "string";

    pub fn empty() -> Self {
        Cell::text("")
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell {
            value: value.into(),
            value_type: Self::DEFAULT_TYPE.to_string(),
            formula: String::new(),
            style: String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.formula.is_empty()
    }
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row { cells }
    }

    /// A row holding one cell with the given text.
    pub fn single(value: impl Into<String>) -> Self {
        Row::new(vec![Cell::text(value)])
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Sheet {
    /// Number of columns of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Row::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.get(col)
    }

    /// Rows and columns spanned by non-blank cells, as `(rows, cols)` counts.
    ///
    /// Trailing blank cells and rows (typically produced by large repeat
    /// counts) are not counted.
    pub fn used_extent(&self) -> (usize, usize) {
        let mut rows = 0;
        let mut cols = 0;
        for (r, row) in self.rows.iter().enumerate() {
            if let Some(last) = row.cells.iter().rposition(|c| !c.is_blank()) {
                rows = r + 1;
                cols = cols.max(last + 1);
            }
        }
        (rows, cols)
    }
}

impl SpreadsheetModel {
    /// A one-sheet, one-cell model whose cell carries `message`.
    pub fn error(message: impl Into<String>) -> Self {
        SpreadsheetModel {
            sheets: vec![Sheet {
                name: "Sheet1".to_string(),
                rows: vec![Row::single(message)],
            }],
        }
    }

    pub fn cell(&self, address: CellAddress) -> Option<&Cell> {
        self.sheets
            .get(address.sheet)?
            .cell(address.row, address.col)
    }

    /// Index of the sheet with the given name (case-insensitive).
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }
}
