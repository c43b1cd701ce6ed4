//! CSV export functionality

use crate::error::{OdsError, Result};
use crate::model::SpreadsheetModel;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export one sheet to CSV, skipping trailing blank rows and columns.
pub fn write_csv(path: &Path, model: &SpreadsheetModel, sheet: usize) -> Result<()> {
    let sheet = model.sheets.get(sheet).ok_or(OdsError::NoSuchSheet(sheet))?;
    let (rows, cols) = sheet.used_extent();

    let mut file = BufWriter::new(std::fs::File::create(path)?);
    for row in sheet.rows.iter().take(rows) {
        let fields: Vec<String> = (0..cols)
            .map(|col| {
                row.cells
                    .get(col)
                    .map(|cell| escape_csv_field(&cell.value))
                    .unwrap_or_default()
            })
            .collect();
        writeln!(file, "{}", fields.join(","))?;
    }
    file.flush()?;
    Ok(())
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    // Guard against CSV formula injection in spreadsheet apps.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let safe_field = if matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if safe_field.contains(',')
        || safe_field.contains('"')
        || safe_field.contains('\n')
        || safe_field.contains('\r')
    {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row, Sheet};

    fn model() -> SpreadsheetModel {
        let mut wide = vec![Cell::text("a"), Cell::text("b, c")];
        wide.extend(std::iter::repeat_n(Cell::empty(), 500));
        SpreadsheetModel {
            sheets: vec![Sheet {
                name: "Data".into(),
                rows: vec![
                    Row::new(wide),
                    Row::new(vec![Cell::empty(), Cell::text("say \"hi\"")]),
                    Row::single(""),
                    Row::single(""),
                ],
            }],
        }
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("simple"), "simple");
        assert_eq!(escape_csv_field("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv_field("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_escape_csv_field_formula_injection_with_leading_whitespace() {
        assert_eq!(escape_csv_field(" =1+1"), "' =1+1");
        assert_eq!(escape_csv_field("\t-2+3"), "'\t-2+3");
        assert_eq!(escape_csv_field(" \t@cmd"), "' \t@cmd");
    }

    #[test]
    fn test_export_trims_trailing_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &model(), 0).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a,\"b, c\"\n,\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_export_unknown_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert!(matches!(
            write_csv(&path, &model(), 3),
            Err(OdsError::NoSuchSheet(3))
        ));
        assert!(!path.exists());
    }
}
