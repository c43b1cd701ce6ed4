//! content.xml -> [`SpreadsheetModel`].
//!
//! Parsing never fails: a problem is contained at the smallest scope that
//! holds it (cell, row, table, document) and replaced by a placeholder whose
//! text says what went wrong.

use super::layout::{self, MAX_COLUMNS};
use super::names::*;
use crate::error::LayoutError;
use crate::model::{Cell, Row, Sheet, SpreadsheetModel};
use crate::xml::{Element, Node, XmlDocument};
use tracing::{debug, warn};

const CELL_ERROR: &str = "Error converting cell";
const ROW_ERROR: &str = "Error converting row";
const TABLE_ERROR: &str = "Error converting table";
const DOCUMENT_ERROR: &str = "Error loading spreadsheet";

/// Parse content.xml text into a spreadsheet model.
pub fn parse(xml: &str) -> SpreadsheetModel {
    match XmlDocument::parse(xml) {
        Ok(doc) => parse_document(&doc),
        Err(err) => {
            warn!(error = %err, "content.xml is not well-formed");
            SpreadsheetModel::error(format!("{}: {}", DOCUMENT_ERROR, err))
        }
    }
}

/// Build the model from an already parsed tree.
pub fn parse_document(doc: &XmlDocument) -> SpreadsheetModel {
    let spreadsheet = match layout::spreadsheet(doc) {
        Ok(spreadsheet) => spreadsheet,
        Err(err) => {
            warn!(error = %err, "content.xml has no spreadsheet body");
            return SpreadsheetModel::error(format!("{}: {}", DOCUMENT_ERROR, err));
        }
    };

    let sheets: Vec<Sheet> = layout::tables(spreadsheet)
        .into_iter()
        .enumerate()
        .map(|(index, (_, table))| {
            let name = sheet_name(table, index);
            convert_table(table, &name).unwrap_or_else(|err| {
                warn!(sheet = %name, error = %err, "failed to convert table");
                Sheet {
                    name,
                    rows: vec![Row::single(TABLE_ERROR)],
                }
            })
        })
        .collect();

    debug!(sheets = sheets.len(), "parsed spreadsheet");
    SpreadsheetModel { sheets }
}

fn sheet_name(table: &Element, index: usize) -> String {
    match table.attr(ATTR_TABLE_NAME) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Sheet{}", index + 1),
    }
}

fn convert_table(table: &Element, name: &str) -> Result<Sheet, LayoutError> {
    let rows = layout::rows(table)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            convert_row(row).unwrap_or_else(|err| {
                warn!(sheet = %name, row = index, error = %err, "failed to convert row");
                Row::single(ROW_ERROR)
            })
        })
        .collect();
    Ok(Sheet {
        name: name.to_string(),
        rows,
    })
}

fn convert_row(row: &Element) -> Result<Row, LayoutError> {
    let spans = layout::cell_spans(row)?;
    if spans.is_empty() {
        return Ok(Row::single(""));
    }

    let mut cells = Vec::with_capacity(spans.iter().map(|s| s.width).sum());
    for span in spans {
        let cell = convert_cell(span.element).unwrap_or_else(|err| {
            warn!(column = span.start, error = %err, "failed to convert cell");
            Cell::text(CELL_ERROR)
        });
        cells.extend(std::iter::repeat_n(cell, span.width));
    }
    Ok(Row::new(cells))
}

fn convert_cell(cell: &Element) -> Result<Cell, LayoutError> {
    let value_type = cell
        .attr(ATTR_VALUE_TYPE)
        .filter(|t| !t.is_empty())
        .unwrap_or(Cell::DEFAULT_TYPE);
    Ok(Cell {
        value: cell_text(cell)?,
        value_type: value_type.to_string(),
        formula: cell.attr(ATTR_FORMULA).unwrap_or_default().to_string(),
        style: cell.attr(ATTR_STYLE_NAME).unwrap_or_default().to_string(),
    })
}

/// Visible text of a cell: every `text:p` paragraph, joined by single spaces.
fn cell_text(cell: &Element) -> Result<String, LayoutError> {
    let paragraphs = cell.collect_children(TEXT_P);
    let mut parts = Vec::with_capacity(paragraphs.len());
    for paragraph in paragraphs {
        let mut text = ParagraphText::default();
        text.walk(paragraph)?;
        parts.push(text.finish());
    }
    Ok(parts.join(" "))
}

/// Text of one paragraph, collapsing whitespace across element boundaries.
///
/// Whitespace runs in character data become one space, dropped at the start
/// and end of the paragraph. Spaces, tabs and line breaks that must survive
/// are encoded as `text:s`, `text:tab` and `text:line-break`.
struct ParagraphText {
    out: String,
    /// The last character emitted was a space, or nothing was emitted yet.
    in_space: bool,
    /// The last character is a collapsed space from character data.
    collapsed_tail: bool,
}

impl Default for ParagraphText {
    fn default() -> Self {
        ParagraphText {
            out: String::new(),
            in_space: true,
            collapsed_tail: false,
        }
    }
}

impl ParagraphText {
    fn walk(&mut self, element: &Element) -> Result<(), LayoutError> {
        for node in &element.children {
            match node {
                Node::Text(text) | Node::CData(text) => self.push_collapsed(text),
                Node::Element(child) => match child.name.as_str() {
                    TEXT_S => {
                        let count = child
                            .attr(ATTR_SPACE_COUNT)
                            .and_then(|c| c.trim().parse::<usize>().ok())
                            .unwrap_or(1)
                            .max(1);
                        if count > MAX_COLUMNS {
                            return Err(LayoutError::TextRunTooLong(count));
                        }
                        self.out.extend(std::iter::repeat_n(' ', count));
                        self.in_space = true;
                        self.collapsed_tail = false;
                    }
                    TEXT_TAB => self.push_literal('\t'),
                    TEXT_LINE_BREAK => self.push_literal('\n'),
                    _ => self.walk(child)?,
                },
                _ => {}
            }
        }
        Ok(())
    }

    fn push_collapsed(&mut self, text: &str) {
        for ch in text.chars() {
            if matches!(ch, ' ' | '\t' | '\n' | '\r') {
                if !self.in_space {
                    self.out.push(' ');
                    self.in_space = true;
                    self.collapsed_tail = true;
                }
            } else {
                self.push_literal(ch);
            }
        }
    }

    fn push_literal(&mut self, ch: char) {
        self.out.push(ch);
        self.in_space = false;
        self.collapsed_tail = false;
    }

    fn finish(mut self) -> String {
        if self.collapsed_tail {
            self.out.pop();
        }
        self.out
    }
}
