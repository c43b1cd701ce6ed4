//! Locating tables, rows and cells inside content.xml.
//!
//! Parser and patcher both go through these functions, which is what keeps
//! model addresses and tree nodes in step.

use super::names::*;
use crate::error::LayoutError;
use crate::xml::{Element, Node, XmlDocument};

/// Widest row accepted, in expanded columns.
pub const MAX_COLUMNS: usize = 16_384;
/// Most rows accepted per table.
pub const MAX_ROWS: usize = 1_048_576;

/// Descend `office:document-content / office:body / office:spreadsheet`.
pub(crate) fn spreadsheet(doc: &XmlDocument) -> Result<&Element, LayoutError> {
    let root = doc
        .root()
        .ok_or(LayoutError::MissingNode(DOCUMENT_CONTENT))?;
    if root.name != DOCUMENT_CONTENT {
        return Err(LayoutError::UnexpectedRoot(root.name.clone()));
    }
    root.child(BODY)
        .ok_or(LayoutError::MissingNode(BODY))?
        .child(SPREADSHEET)
        .ok_or(LayoutError::MissingNode(SPREADSHEET))
}

pub(crate) fn spreadsheet_mut(doc: &mut XmlDocument) -> Result<&mut Element, LayoutError> {
    let root = doc
        .root_mut()
        .ok_or(LayoutError::MissingNode(DOCUMENT_CONTENT))?;
    if root.name != DOCUMENT_CONTENT {
        return Err(LayoutError::UnexpectedRoot(root.name.clone()));
    }
    root.child_mut(BODY)
        .ok_or(LayoutError::MissingNode(BODY))?
        .child_mut(SPREADSHEET)
        .ok_or(LayoutError::MissingNode(SPREADSHEET))
}

/// Tables of the spreadsheet body with their child indices.
pub(crate) fn tables(spreadsheet: &Element) -> Vec<(usize, &Element)> {
    spreadsheet.collect_children_indexed(TABLE)
}

/// Child-index paths from `table` to each of its rows, in document order.
///
/// Rows nested in header/group containers are included where they appear.
pub(crate) fn row_paths(table: &Element) -> Result<Vec<Vec<usize>>, LayoutError> {
    let mut paths = Vec::new();
    collect_row_paths(table, &mut Vec::new(), &mut paths);
    if paths.len() > MAX_ROWS {
        return Err(LayoutError::TooManyRows { limit: MAX_ROWS });
    }
    Ok(paths)
}

fn collect_row_paths(parent: &Element, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (idx, node) in parent.children.iter().enumerate() {
        let Node::Element(child) = node else {
            continue;
        };
        if child.name == TABLE_ROW {
            let mut path = prefix.clone();
            path.push(idx);
            out.push(path);
        } else if ROW_CONTAINERS.contains(&child.name.as_str()) {
            prefix.push(idx);
            collect_row_paths(child, prefix, out);
            prefix.pop();
        }
    }
}

pub(crate) fn rows(table: &Element) -> Result<Vec<&Element>, LayoutError> {
    Ok(row_paths(table)?
        .iter()
        .filter_map(|path| table.descendant(path))
        .collect())
}

/// Expanded width of a cell record: `table:number-columns-repeated`, with
/// missing, unparseable and non-positive values counting as 1.
pub(crate) fn repeat_count(cell: &Element) -> usize {
    cell.attr(ATTR_COLUMNS_REPEATED)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(1)
}

/// One cell record of a row and the expanded columns it covers.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CellSpan<'a> {
    /// Index of the record in the row's `children`.
    pub node: usize,
    /// First expanded column covered.
    pub start: usize,
    pub width: usize,
    pub element: &'a Element,
}

impl CellSpan<'_> {
    pub fn contains(&self, col: usize) -> bool {
        col >= self.start && col - self.start < self.width
    }
}

pub(crate) fn cell_spans(row: &Element) -> Result<Vec<CellSpan<'_>>, LayoutError> {
    let mut start = 0usize;
    row.collect_children_indexed(TABLE_CELL)
        .into_iter()
        .map(|(node, element)| {
            let width = repeat_count(element);
            let span = CellSpan {
                node,
                start,
                width,
                element,
            };
            start = start
                .checked_add(width)
                .filter(|&end| end <= MAX_COLUMNS)
                .ok_or(LayoutError::RowTooWide { limit: MAX_COLUMNS })?;
            Ok(span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_with_repeat(raw: Option<&str>) -> Element {
        let mut cell = Element::new(TABLE_CELL);
        if let Some(raw) = raw {
            cell.set_attr(ATTR_COLUMNS_REPEATED, raw);
        }
        cell
    }

    #[test]
    fn test_repeat_count_floor() {
        assert_eq!(repeat_count(&cell_with_repeat(None)), 1);
        assert_eq!(repeat_count(&cell_with_repeat(Some("0"))), 1);
        assert_eq!(repeat_count(&cell_with_repeat(Some("-4"))), 1);
        assert_eq!(repeat_count(&cell_with_repeat(Some("abc"))), 1);
        assert_eq!(repeat_count(&cell_with_repeat(Some(" 7 "))), 7);
    }

    #[test]
    fn test_cell_spans_accumulate_widths() {
        let doc = XmlDocument::parse(
            r#"<table:table-row><table:table-cell table:number-columns-repeated="3"/><table:covered-table-cell/><table:table-cell/></table:table-row>"#,
        )
        .unwrap();
        let spans = cell_spans(doc.root().unwrap()).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].node, spans[0].start, spans[0].width), (0, 0, 3));
        assert_eq!((spans[1].node, spans[1].start, spans[1].width), (2, 3, 1));
        assert!(spans[0].contains(2));
        assert!(!spans[0].contains(3));
    }

    #[test]
    fn test_cell_spans_reject_huge_rows() {
        let doc = XmlDocument::parse(
            r#"<table:table-row><table:table-cell table:number-columns-repeated="100000000"/></table:table-row>"#,
        )
        .unwrap();
        assert_eq!(
            cell_spans(doc.root().unwrap()).unwrap_err(),
            LayoutError::RowTooWide { limit: MAX_COLUMNS }
        );
    }

    #[test]
    fn test_rows_inside_containers_keep_document_order() {
        let doc = XmlDocument::parse(
            r#"<table:table><table:table-column/><table:table-header-rows><table:table-row table:style-name="h"/></table:table-header-rows><table:table-row table:style-name="a"/><table:table-row-group><table:table-row-group><table:table-row table:style-name="b"/></table:table-row-group></table:table-row-group></table:table>"#,
        )
        .unwrap();
        let table = doc.root().unwrap();
        let styles: Vec<_> = rows(table)
            .unwrap()
            .iter()
            .map(|r| r.attr("table:style-name").unwrap_or_default())
            .collect();
        assert_eq!(styles, vec!["h", "a", "b"]);
        assert_eq!(row_paths(table).unwrap()[2], vec![3, 0, 0]);
    }

    #[test]
    fn test_spreadsheet_requires_expected_root() {
        let doc = XmlDocument::parse("<office:document-styles/>").unwrap();
        assert!(matches!(
            spreadsheet(&doc),
            Err(LayoutError::UnexpectedRoot(_))
        ));
        let doc = XmlDocument::parse(
            "<office:document-content><office:body/></office:document-content>",
        )
        .unwrap();
        assert_eq!(
            spreadsheet(&doc).unwrap_err(),
            LayoutError::MissingNode(SPREADSHEET)
        );
    }
}
