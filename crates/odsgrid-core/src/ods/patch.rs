//! Writing one cell value back into the retained content.xml tree.

use super::layout;
use super::names::*;
use crate::address::CellAddress;
use crate::error::PatchError;
use crate::model::Cell;
use crate::xml::{Element, Node, XmlDocument};
use tracing::debug;

/// Set the cell at `address` to the string `value` and return the new
/// content.xml text.
///
/// On error the tree is left as it was.
pub fn apply_edit(
    doc: &mut XmlDocument,
    address: CellAddress,
    value: &str,
) -> Result<String, PatchError> {
    patch_cell(doc, address, value)?;
    Ok(doc.to_xml()?)
}

/// Patch the tree in place without serializing it.
pub fn patch_cell(
    doc: &mut XmlDocument,
    address: CellAddress,
    value: &str,
) -> Result<(), PatchError> {
    let spreadsheet = layout::spreadsheet_mut(doc)?;

    let table_node = layout::tables(spreadsheet)
        .get(address.sheet)
        .map(|(node, _)| *node)
        .ok_or(PatchError::SheetOutOfRange(address.sheet))?;
    let table = spreadsheet
        .element_at_mut(table_node)
        .ok_or(PatchError::SheetOutOfRange(address.sheet))?;

    let row_out_of_range = PatchError::RowOutOfRange {
        sheet: address.sheet,
        row: address.row,
    };
    let path = layout::row_paths(table)?
        .into_iter()
        .nth(address.row)
        .ok_or_else(|| row_out_of_range.clone())?;
    let row = table.descendant_mut(&path).ok_or(row_out_of_range)?;

    let spans = layout::cell_spans(row)?;
    if spans.is_empty() {
        if address.col != 0 {
            return Err(PatchError::CellOutOfRange(address));
        }
        debug!(%address, "row has no cells, appending one");
        let mut cell = Element::new(TABLE_CELL);
        overwrite(&mut cell, value);
        row.children.push(Node::Element(cell));
        return Ok(());
    }

    let (node, start, width) = spans
        .iter()
        .find(|span| span.contains(address.col))
        .map(|span| (span.node, span.start, span.width))
        .ok_or(PatchError::CellOutOfRange(address))?;

    let node = split_repeated(row, node, address.col - start, width);
    let cell = row
        .element_at_mut(node)
        .ok_or(PatchError::CellOutOfRange(address))?;
    overwrite(cell, value);
    debug!(%address, "patched cell");
    Ok(())
}

/// Break the record at `row.children[node]` covering `width` columns into
/// `offset` copies before, the target, and the remaining copies after.
/// Returns the child index of the target.
fn split_repeated(row: &mut Element, node: usize, offset: usize, width: usize) -> usize {
    if width <= 1 {
        return node;
    }
    let Some(original) = row.children.get(node).and_then(Node::as_element).cloned() else {
        return node;
    };
    let after = width - offset - 1;

    let mut records = Vec::with_capacity(3);
    if offset > 0 {
        records.push(Node::Element(with_repeat(&original, offset)));
    }
    records.push(Node::Element(with_repeat(&original, 1)));
    if after > 0 {
        records.push(Node::Element(with_repeat(&original, after)));
    }
    row.children.splice(node..=node, records);

    if offset > 0 { node + 1 } else { node }
}

fn with_repeat(cell: &Element, count: usize) -> Element {
    let mut copy = cell.clone();
    if count == 1 {
        copy.remove_attr(ATTR_COLUMNS_REPEATED);
    } else {
        copy.set_attr(ATTR_COLUMNS_REPEATED, count.to_string());
    }
    copy
}

/// Make `cell` a string cell showing `value`, leaving its other attributes
/// and non-paragraph children alone.
fn overwrite(cell: &mut Element, value: &str) {
    cell.set_attr(ATTR_VALUE_TYPE, Cell::DEFAULT_TYPE);

    let first = cell
        .children
        .iter()
        .position(|n| n.is_element_named(TEXT_P))
        .unwrap_or(cell.children.len());
    cell.children.retain(|n| !n.is_element_named(TEXT_P));
    cell.children.insert(first, Node::Element(paragraph(value)));
}

/// Encode `value` as a `text:p`, keeping spaces, tabs and newlines that
/// plain character data would lose.
fn paragraph(value: &str) -> Element {
    let mut p = Element::new(TEXT_P);
    let mut text = String::new();
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ' ' => {
                let mut run = 1;
                while chars.next_if_eq(&' ').is_some() {
                    run += 1;
                }
                let leading = p.children.is_empty() && text.is_empty();
                let trailing = chars.peek().is_none();
                if leading || trailing {
                    flush(&mut p, &mut text);
                    p.children.push(Node::Element(spaces(run)));
                } else {
                    text.push(' ');
                    if run > 1 {
                        flush(&mut p, &mut text);
                        p.children.push(Node::Element(spaces(run - 1)));
                    }
                }
            }
            '\t' => {
                flush(&mut p, &mut text);
                p.children.push(Node::Element(Element::new(TEXT_TAB)));
            }
            '\n' => {
                flush(&mut p, &mut text);
                p.children.push(Node::Element(Element::new(TEXT_LINE_BREAK)));
            }
            '\r' => {}
            _ => text.push(ch),
        }
    }
    flush(&mut p, &mut text);
    p
}

fn spaces(count: usize) -> Element {
    let mut s = Element::new(TEXT_S);
    if count > 1 {
        s.set_attr(ATTR_SPACE_COUNT, count.to_string());
    }
    s
}

fn flush(p: &mut Element, text: &mut String) {
    if !text.is_empty() {
        p.children.push(Node::Text(std::mem::take(text)));
    }
}
