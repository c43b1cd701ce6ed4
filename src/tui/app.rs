//! Application state and logic.
//!
//! [`App`] wraps the open [`Document`] with everything the terminal needs on
//! top of it: the current sheet, cursor and viewport, editing buffers and the
//! status line. Like Vim, the app is modal ([`Mode`]).

use odsgrid_core::{CellAddress, Document, address::parse_a1};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::keymap::Keymap;
use crate::config::{Config, MAX_COL_WIDTH, MIN_COL_WIDTH};

/// Modal editing state for the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Navigate the grid, execute single-key commands.
    Normal,
    /// Edit the contents of the current cell.
    Edit,
    /// Enter ex-style commands (`:w`, `:q`, etc.).
    Command,
}

/// Main application state container.
pub struct App {
    /// The open spreadsheet
    pub doc: Document,
    /// Index of the sheet on screen
    pub sheet: usize,
    /// Current cursor position (column)
    pub cursor_col: usize,
    /// Current cursor position (row)
    pub cursor_row: usize,
    /// Viewport offset (column)
    pub viewport_col: usize,
    /// Viewport offset (row)
    pub viewport_row: usize,
    /// Number of visible columns
    pub visible_cols: usize,
    /// Number of visible rows
    pub visible_rows: usize,
    /// Current mode
    pub mode: Mode,
    /// Edit buffer for cell editing
    pub edit_buffer: String,
    /// Cursor position within edit buffer (byte offset)
    pub edit_cursor: usize,
    /// Command buffer for command mode
    pub command_buffer: String,
    /// Cursor position within command buffer (byte offset)
    pub command_cursor: usize,
    /// Status message to display
    pub status_message: String,
    /// Default column width for display
    pub col_width: usize,
    /// Per-column widths (column index -> width). Default is col_width.
    pub column_widths: HashMap<usize, usize>,
    /// Upper bound on navigable columns
    pub max_display_cols: usize,
    /// Save after every accepted edit
    pub autosave: bool,
    /// Help modal state
    pub help_modal: bool,
    pub help_scroll: usize,
    /// Active keymap
    pub keymap: Keymap,
    /// First key of a `g` sequence was pressed
    pub pending_g: bool,
}

impl App {
    pub fn new(doc: Document, config: &Config, keymap: Keymap) -> Self {
        let mut app = App {
            doc,
            sheet: 0,
            cursor_col: 0,
            cursor_row: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 10,
            visible_rows: 20,
            mode: Mode::Normal,
            edit_buffer: String::new(),
            edit_cursor: 0,
            command_buffer: String::new(),
            command_cursor: 0,
            status_message: String::new(),
            col_width: config.col_width,
            column_widths: HashMap::new(),
            max_display_cols: config.max_display_cols,
            autosave: config.autosave,
            help_modal: false,
            help_scroll: 0,
            keymap,
            pending_g: false,
        };
        if let Some(reason) = app.doc.read_only_reason() {
            app.status_message = format!("Error: read-only, {}", reason);
        }
        app
    }

    /// Open an `.ods` file.
    pub fn open(path: &Path, config: &Config, keymap: Keymap) -> odsgrid_core::Result<Self> {
        let doc = Document::open(path)?;
        Ok(Self::new(doc, config, keymap))
    }

    pub fn sheet_name(&self) -> &str {
        self.doc
            .sheet(self.sheet)
            .map(|s| s.name.as_str())
            .unwrap_or("")
    }

    /// Rows of the current sheet (at least 1).
    pub fn max_rows(&self) -> usize {
        self.doc
            .sheet(self.sheet)
            .map(|s| s.rows.len())
            .unwrap_or(0)
            .max(1)
    }

    /// Navigable columns of the current sheet (at least 1).
    pub fn max_cols(&self) -> usize {
        self.doc
            .sheet(self.sheet)
            .map(|s| s.width())
            .unwrap_or(0)
            .min(self.max_display_cols)
            .max(1)
    }

    /// Get the current cell address
    pub fn current_address(&self) -> CellAddress {
        CellAddress::new(self.sheet, self.cursor_row, self.cursor_col)
    }

    /// Text shown for a cell of the current sheet.
    pub fn cell_display(&self, row: usize, col: usize) -> &str {
        self.doc
            .sheet(self.sheet)
            .and_then(|s| s.cell(row, col))
            .map(|c| c.value.as_str())
            .unwrap_or("")
    }

    /// Move cursor by delta, clamping to valid range
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        self.cursor_col = clamp_offset(self.cursor_col, dx, self.max_cols());
        self.cursor_row = clamp_offset(self.cursor_row, dy, self.max_rows());
        self.update_viewport();
    }

    /// Update viewport to keep cursor visible
    pub fn update_viewport(&mut self) {
        // Horizontal scrolling
        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        } else if self.cursor_col >= self.viewport_col + self.visible_cols {
            self.viewport_col = self.cursor_col + 1 - self.visible_cols;
        }

        // Vertical scrolling
        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.cursor_row >= self.viewport_row + self.visible_rows {
            self.viewport_row = self.cursor_row + 1 - self.visible_rows;
        }
    }

    pub fn switch_sheet(&mut self, index: usize) {
        if index >= self.doc.sheet_count() {
            self.status_message = format!("No sheet {}", index + 1);
            return;
        }
        self.sheet = index;
        self.cursor_col = 0;
        self.cursor_row = 0;
        self.viewport_col = 0;
        self.viewport_row = 0;
        self.column_widths.clear();
        self.status_message.clear();
    }

    /// Step to the next (+1) or previous (-1) sheet, wrapping around.
    pub fn cycle_sheet(&mut self, step: i32) {
        let count = self.doc.sheet_count();
        if count < 2 {
            return;
        }
        let next = (self.sheet as i64 + step as i64).rem_euclid(count as i64) as usize;
        self.switch_sheet(next);
        self.status_message = format!("Sheet {}: {}", next + 1, self.sheet_name());
    }

    /// Enter edit mode for current cell
    pub fn enter_edit_mode(&mut self) {
        if let Some(reason) = self.doc.read_only_reason() {
            self.status_message = format!("Error: read-only, {}", reason);
            return;
        }
        self.edit_buffer = self
            .cell_display(self.cursor_row, self.cursor_col)
            .to_string();
        self.edit_cursor = self.edit_buffer.len(); // Cursor at end
        self.mode = Mode::Edit;
    }

    /// Commit the current edit
    pub fn commit_edit(&mut self) {
        let value = std::mem::take(&mut self.edit_buffer);
        self.edit_cursor = 0;
        self.mode = Mode::Normal;
        self.set_current_cell(&value);
    }

    /// Set the current cell to an empty string
    pub fn clear_current_cell(&mut self) {
        if self.cell_display(self.cursor_row, self.cursor_col).is_empty() {
            return;
        }
        self.set_current_cell("");
    }

    fn set_current_cell(&mut self, value: &str) {
        let address = self.current_address();
        match self.doc.apply_edit(address, value).map(|_| ()) {
            Ok(_) => {
                self.status_message = format!("{} updated", address.a1());
                if self.autosave && self.doc.file_path.is_some() {
                    self.save_file();
                }
            }
            Err(e) => {
                warn!(%address, error = %e, "edit failed");
                self.status_message = format!("Error: failed to save {}: {}", address.a1(), e);
            }
        }
    }

    /// Get width for a specific column
    pub fn get_column_width(&self, col: usize) -> usize {
        *self.column_widths.get(&col).unwrap_or(&self.col_width)
    }

    /// Set width for current column
    pub fn set_column_width(&mut self, width: usize) {
        let width = width.clamp(MIN_COL_WIDTH, MAX_COL_WIDTH);
        self.column_widths.insert(self.cursor_col, width);
    }

    /// Increase current column width
    pub fn increase_column_width(&mut self) {
        let current = self.get_column_width(self.cursor_col);
        self.set_column_width(current + 2);
    }

    /// Decrease current column width
    pub fn decrease_column_width(&mut self) {
        let current = self.get_column_width(self.cursor_col);
        self.set_column_width(current.saturating_sub(2));
    }

    /// Jump to a spreadsheet-style reference on the current sheet
    pub fn goto_cell(&mut self, reference: &str) {
        match parse_a1(reference) {
            Ok((row, col)) if row < self.max_rows() && col < self.max_cols() => {
                self.cursor_col = col;
                self.cursor_row = row;
                self.update_viewport();
                self.status_message = format!("Jumped to {}", reference.trim().to_uppercase());
            }
            Ok(_) => self.status_message = "Cell out of range".to_string(),
            Err(e) => self.status_message = format!("Error: {}", e),
        }
    }

    /// Go to the first cell (A1)
    pub fn goto_first(&mut self) {
        self.cursor_col = 0;
        self.cursor_row = 0;
        self.update_viewport();
    }

    /// Go to the last row holding data
    pub fn goto_last(&mut self) {
        let (rows, _) = self
            .doc
            .sheet(self.sheet)
            .map(|s| s.used_extent())
            .unwrap_or((0, 0));
        self.cursor_row = rows.saturating_sub(1);
        self.update_viewport();
    }

    pub fn close_help_modal(&mut self) {
        self.help_modal = false;
    }

    pub fn scroll_help_by(&mut self, delta: i32) {
        self.help_scroll = self.help_scroll.saturating_add_signed(delta as isize);
    }

    /// Execute a command entered in command mode.
    ///
    /// Returns `true` if the application should quit, `false` otherwise.
    pub fn execute_command(&mut self) -> bool {
        let cmd = self.command_buffer.trim().to_string();
        self.command_buffer.clear();
        self.command_cursor = 0;
        self.mode = Mode::Normal;

        let (command, args) = match cmd.split_once(' ') {
            Some((command, args)) => (command, Some(args.trim()).filter(|a| !a.is_empty())),
            None => (cmd.as_str(), None),
        };

        match command {
            "q" | "quit" => return self.request_quit(),
            "q!" => return true,
            "w" | "save" => match args {
                Some(path) => self.save_file_as(Path::new(path)),
                None => self.save_file(),
            },
            "wq" | "x" => {
                self.save_file();
                if !self.doc.modified {
                    return true;
                }
            }
            "sheet" | "s" => match args {
                Some(arg) => self.select_sheet(arg),
                None => {
                    let names: Vec<String> = self
                        .doc
                        .model()
                        .sheets
                        .iter()
                        .enumerate()
                        .map(|(i, s)| format!("{}:{}", i + 1, s.name))
                        .collect();
                    self.status_message = format!("Sheets: {}", names.join("  "));
                }
            },
            "goto" | "g" => {
                if let Some(reference) = args {
                    self.goto_cell(reference);
                } else {
                    self.status_message = "Usage: :goto CELL (e.g., :goto A100)".to_string();
                }
            }
            "colwidth" | "cw" => match args.and_then(|a| a.parse::<usize>().ok()) {
                Some(width) => {
                    self.set_column_width(width);
                    self.status_message = format!(
                        "Column width set to {}",
                        self.get_column_width(self.cursor_col)
                    );
                }
                None => self.status_message = "Usage: :colwidth WIDTH".to_string(),
            },
            "export" => {
                if let Some(path) = args {
                    self.export(path);
                } else {
                    self.status_message = "Usage: :export <file.csv|file.md>".to_string();
                }
            }
            "help" | "h" => {
                self.help_modal = true;
                self.help_scroll = 0;
            }
            "" => {}
            _ => {
                self.status_message = format!("Unknown command: {}", command);
            }
        }
        false
    }

    /// Returns `true` when it is safe to quit.
    pub fn request_quit(&mut self) -> bool {
        if self.doc.modified {
            self.status_message =
                "Unsaved changes! Use :q! to force quit or :wq to save and quit".to_string();
            return false;
        }
        true
    }

    /// Select a sheet by 1-based number or by name.
    fn select_sheet(&mut self, arg: &str) {
        let index = match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Some(n - 1),
            _ => self.doc.model().sheet_index(arg),
        };
        match index {
            Some(index) if index < self.doc.sheet_count() => {
                self.switch_sheet(index);
                self.status_message = format!("Sheet {}: {}", index + 1, self.sheet_name());
            }
            _ => self.status_message = format!("Error: no sheet '{}'", arg),
        }
    }

    /// Save to current file path
    pub fn save_file(&mut self) {
        match self.doc.save() {
            Ok(path) => {
                info!(path = %path.display(), "saved");
                self.status_message = format!("Saved to {}", path.display());
            }
            Err(odsgrid_core::OdsError::NoFilePath) => {
                self.status_message = "No file path. Use :w <path>".to_string();
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.status_message = format!("Error saving: {}", e);
            }
        }
    }

    fn save_file_as(&mut self, path: &Path) {
        match self.doc.save_as(path) {
            Ok(path) => self.status_message = format!("Saved to {}", path.display()),
            Err(e) => {
                warn!(error = %e, "save failed");
                self.status_message = format!("Error saving: {}", e);
            }
        }
    }

    /// Export the current sheet to CSV, or every sheet to markdown for `.md`
    fn export(&mut self, path: &str) {
        let path = PathBuf::from(path);
        let is_markdown = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        let result = if is_markdown {
            self.doc.export_markdown(&path)
        } else {
            self.doc.export_csv(&path, self.sheet)
        };
        match result {
            Ok(()) => self.status_message = format!("Exported to {}", path.display()),
            Err(e) => self.status_message = format!("Export error: {}", e),
        }
    }
}

fn clamp_offset(current: usize, delta: i32, len: usize) -> usize {
    current
        .saturating_add_signed(delta as isize)
        .min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use odsgrid_core::storage::Package;

    const CONTENT: &str = r#"<office:document-content><office:body><office:spreadsheet><table:table table:name="Data"><table:table-row><table:table-cell><text:p>a</text:p></table:table-cell><table:table-cell table:number-columns-repeated="3"/></table:table-row><table:table-row><table:table-cell><text:p>b</text:p></table:table-cell></table:table-row></table:table><table:table table:name="Notes"><table:table-row><table:table-cell><text:p>n</text:p></table:table-cell></table:table-row></table:table></office:spreadsheet></office:body></office:document-content>"#;

    fn app() -> App {
        App::new(Document::from_content(CONTENT), &Config::default(), Keymap::Vim)
    }

    fn command(app: &mut App, cmd: &str) -> bool {
        app.command_buffer = cmd.to_string();
        app.execute_command()
    }

    #[test]
    fn commit_edit_updates_document() {
        let mut app = app();
        app.move_cursor(2, 0);
        app.enter_edit_mode();
        assert_eq!(app.mode, Mode::Edit);
        app.edit_buffer = "new".to_string();
        app.commit_edit();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.cell_display(0, 2), "new");
        assert_eq!(app.cell_display(0, 1), "");
        assert!(app.doc.modified);
    }

    #[test]
    fn failed_edit_reports_in_status_bar() {
        let mut app = app();
        app.cursor_row = 1;
        app.cursor_col = 3;
        app.edit_buffer = "nope".to_string();
        app.commit_edit();
        assert!(app.status_message.starts_with("Error"));
        assert!(!app.doc.modified);
    }

    #[test]
    fn autosave_writes_after_each_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.ods");
        Package::from_content(CONTENT).save(&path).unwrap();

        let mut app = App::open(&path, &Config::default(), Keymap::Vim).unwrap();
        app.edit_buffer = "saved".to_string();
        app.commit_edit();
        assert!(!app.doc.modified);
        let reopened = Document::open(&path).unwrap();
        assert_eq!(reopened.model().sheets[0].rows[0].cells[0].value, "saved");
    }

    #[test]
    fn quit_refuses_with_unsaved_changes() {
        let mut app = app();
        app.clear_current_cell();
        assert!(app.doc.modified);
        assert!(!command(&mut app, "q"));
        assert!(app.status_message.contains("Unsaved changes"));
        assert!(command(&mut app, "q!"));
    }

    #[test]
    fn write_without_path_asks_for_one() {
        let mut app = app();
        command(&mut app, "w");
        assert_eq!(app.status_message, "No file path. Use :w <path>");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ods");
        command(&mut app, &format!("w {}", path.display()));
        assert_eq!(app.doc.file_path.as_deref(), Some(path.as_path()));
        assert!(path.exists());
    }

    #[test]
    fn sheet_command_by_number_and_name() {
        let mut app = app();
        command(&mut app, "sheet 2");
        assert_eq!(app.sheet, 1);
        assert_eq!(app.cell_display(0, 0), "n");
        command(&mut app, "sheet data");
        assert_eq!(app.sheet, 0);
        command(&mut app, "sheet 9");
        assert_eq!(app.sheet, 0);
        assert!(app.status_message.starts_with("Error"));
    }

    #[test]
    fn cycle_sheet_wraps() {
        let mut app = app();
        app.cycle_sheet(-1);
        assert_eq!(app.sheet, 1);
        app.cycle_sheet(1);
        assert_eq!(app.sheet, 0);
    }

    #[test]
    fn goto_parses_references() {
        let mut app = app();
        command(&mut app, "goto D1");
        assert_eq!((app.cursor_row, app.cursor_col), (0, 3));
        command(&mut app, "goto Z99");
        assert_eq!(app.status_message, "Cell out of range");
        command(&mut app, "goto 1A");
        assert!(app.status_message.starts_with("Error"));
    }

    #[test]
    fn cursor_is_clamped_to_sheet() {
        let mut app = app();
        app.move_cursor(100, 100);
        assert_eq!((app.cursor_row, app.cursor_col), (1, 3));
        app.move_cursor(-100, -100);
        assert_eq!((app.cursor_row, app.cursor_col), (0, 0));
    }

    #[test]
    fn unknown_command() {
        let mut app = app();
        assert!(!command(&mut app, "frobnicate"));
        assert_eq!(app.status_message, "Unknown command: frobnicate");
    }

    #[test]
    fn export_csv_of_current_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.csv");
        let mut app = app();
        app.cycle_sheet(1);
        command(&mut app, &format!("export {}", path.display()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "n\n");
    }
}

/// An app over a blank `rows` x `cols` sheet.
#[cfg(test)]
pub(crate) fn blank_app(rows: usize, cols: usize) -> App {
    let row = format!(
        r#"<table:table-row><table:table-cell table:number-columns-repeated="{}"/></table:table-row>"#,
        cols
    );
    let content = format!(
        r#"<office:document-content><office:body><office:spreadsheet><table:table table:name="Sheet1">{}</table:table></office:spreadsheet></office:body></office:document-content>"#,
        row.repeat(rows)
    );
    App::new(Document::from_content(content), &Config::default(), Keymap::Vim)
}
