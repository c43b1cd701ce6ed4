//! Markdown export functionality

use crate::address::col_to_letters;
use crate::model::{Sheet, SpreadsheetModel};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write every sheet to a markdown file, one table per sheet.
pub fn write_markdown(path: &Path, model: &SpreadsheetModel) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);
    for (idx, sheet) in model.sheets.iter().enumerate() {
        if idx > 0 {
            writeln!(file)?;
        }
        write_sheet(&mut file, sheet)?;
    }
    file.flush()
}

fn write_sheet<W: Write>(w: &mut W, sheet: &Sheet) -> std::io::Result<()> {
    writeln!(w, "# {}", escape_markdown(&sheet.name))?;
    writeln!(w)?;

    let (rows, cols) = sheet.used_extent();
    if rows == 0 {
        writeln!(w, "*Empty sheet*")?;
        return Ok(());
    }

    // Header with column letters
    write!(w, "|   |")?;
    for col in 0..cols {
        write!(w, " {} |", col_to_letters(col))?;
    }
    writeln!(w)?;

    write!(w, "|---|")?;
    for _ in 0..cols {
        write!(w, "---|")?;
    }
    writeln!(w)?;

    for (r, row) in sheet.rows.iter().take(rows).enumerate() {
        write!(w, "| {} |", r + 1)?; // 1-based row numbers
        for col in 0..cols {
            let value = row.cells.get(col).map(|c| c.value.as_str()).unwrap_or("");
            write!(w, " {} |", escape_markdown(value))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row};

    #[test]
    fn test_markdown_export() {
        let model = SpreadsheetModel {
            sheets: vec![
                Sheet {
                    name: "Totals".into(),
                    rows: vec![
                        Row::new(vec![Cell::text("a|b"), Cell::text("1"), Cell::empty()]),
                        Row::new(vec![Cell::empty(), Cell::text("two\nlines")]),
                        Row::single(""),
                    ],
                },
                Sheet {
                    name: "Blank".into(),
                    rows: vec![Row::single("")],
                },
            ],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        write_markdown(&path, &model).unwrap();

        let expected = "\
# Totals

|   | A | B |
|---|---|---|
| 1 | a\\|b | 1 |
| 2 |  | two lines |

# Blank

*Empty sheet*
";
        assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    }
}
