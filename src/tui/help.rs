//! Help text content for the help modal

use super::keymap::Keymap;

/// Lines describing the program itself.
pub fn get_about_help() -> Vec<String> {
    vec![
        "About odsgrid",
        "",
        "  View and edit OpenDocument spreadsheets (.ods) in the terminal.",
        "  Cells hold plain text. Saving rewrites only the edited cells;",
        "  styles, formulas and other package entries are kept as they were.",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Get keybinding help text for the current keymap
pub fn get_help_text(keymap: Keymap) -> Vec<String> {
    match keymap {
        Keymap::Vim => vec![
            "Navigation:",
            "  h/j/k/l      Move left/down/up/right",
            "  Arrow keys   Move cursor",
            "  PageUp/Down  Scroll by page",
            "  0/$          First/last column",
            "  gg / G       First cell / last row with data",
            "  g            Open goto prompt",
            "",
            "Sheets:",
            "  Tab / gt     Next sheet",
            "  S-Tab / gT   Previous sheet",
            "",
            "Editing:",
            "  i / Enter    Edit cell",
            "  x / Delete   Clear cell",
            "  Esc          Cancel edit",
            "",
            "Other:",
            "  :            Enter command mode",
            "  +/-          Adjust column width",
            "  ?            This help",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
        Keymap::Emacs => vec![
            "Navigation:",
            "  C-n/C-p      Move down/up",
            "  C-f/C-b      Move right/left",
            "  Arrow keys   Move cursor",
            "  C-v/M-v      Page down/up",
            "  C-a/C-e      First/last column",
            "  M-< / M->    First cell / last row",
            "  M-g          Open goto prompt",
            "",
            "Sheets:",
            "  Tab / S-Tab  Next/previous sheet",
            "",
            "Editing:",
            "  Enter        Edit cell",
            "  C-d/Delete   Clear cell",
            "  C-g / Esc    Cancel",
            "",
            "Other:",
            "  M-x          Enter command mode",
            "  C-s          Save",
            "  C-q          Quit",
            "  M-h          This help",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
    }
}

/// Get command help text
pub fn get_commands_help() -> Vec<String> {
    vec![
        "Commands",
        "",
        "File:",
        "  :w [file]       Save",
        "  :q              Quit",
        "  :q!             Force quit",
        "  :wq             Save and quit",
        "",
        "Export:",
        "  :export <file>  Current sheet as CSV, or all sheets as .md",
        "",
        "Navigation:",
        "  :goto <cell>    Go to cell (e.g. :goto A100)",
        "  :sheet [n|name] List sheets or switch to one",
        "",
        "Display:",
        "  :colwidth <n>   Set column width",
        "",
        "Press Esc or q to close",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
