//! Keymap translation layer.
//!
//! This keeps key handling separate from app behavior.
//! - Vim keymap: hjkl navigation, `:` commands, modal editing.
//! - Emacs keymap is "strict": vim-style letter keys are not active.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::Mode;

/// Available keybinding schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keymap {
    /// Vim-style keybindings (hjkl, :commands, modal editing).
    Vim,
    /// Emacs-style keybindings (C-n/p/f/b, M-x commands).
    Emacs,
}

impl Keymap {
    /// Look up a keymap by name. Unknown names fall back to vim with a warning.
    pub fn from_name(name: &str) -> (Keymap, Option<String>) {
        let name = name.trim();
        if name.eq_ignore_ascii_case("emacs") {
            (Keymap::Emacs, None)
        } else if name.is_empty() || name.eq_ignore_ascii_case("vim") {
            (Keymap::Vim, None)
        } else {
            (
                Keymap::Vim,
                Some(format!("Falling back to built-in 'vim' keymap for '{}'", name)),
            )
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Keymap::Vim => "vim",
            Keymap::Emacs => "emacs",
        }
    }

    pub fn status_hint(&self) -> &'static str {
        match self {
            Keymap::Vim => "hjkl:move  i:edit  x:clear  gt/gT:sheet  +/-:colwidth  :w:save  :q:quit  :help",
            Keymap::Emacs => "C-n/p/f/b:move  Enter:edit  Tab:sheet  M-x:cmd  C-s:save  C-g:cancel  C-q:quit",
        }
    }
}

/// Actions that can be triggered by key presses.
///
/// The keymap translates key events into actions, which are then applied to
/// the application state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Cancel current operation and return to Normal mode.
    Cancel,
    /// Enter Edit mode for the current cell.
    EnterEdit,
    /// Commit the current edit and return to Normal mode.
    CommitEdit,
    /// Enter Command mode (`:` prompt).
    EnterCommand,
    /// Execute the command in the command buffer.
    ExecuteCommand,
    /// Set the current cell to an empty string.
    ClearCell,

    /// Move cursor by (dx, dy).
    Move(i32, i32),
    /// Page up (-1) or down (+1).
    Page(i32),
    /// Jump to first column.
    HomeCol,
    /// Jump to last column.
    EndCol,
    /// Jump to the first cell.
    GotoFirst,
    /// Jump to last row with data.
    GotoLast,
    /// Open the goto cell prompt.
    OpenGotoPrompt,

    NextSheet,
    PrevSheet,

    /// Increase current column width.
    IncColWidth,
    /// Decrease current column width.
    DecColWidth,
    /// Save the file.
    Save,
    /// Quit, refusing when there are unsaved changes.
    Quit,
    /// Open the help modal.
    Help,
}

/// Translate a key event to an action based on the current keymap and mode.
///
/// Returns `None` if the key has no binding in the current context.
pub fn translate(keymap: Keymap, mode: Mode, key: KeyEvent) -> Option<Action> {
    match keymap {
        Keymap::Vim => translate_vim(mode, key),
        Keymap::Emacs => translate_emacs(mode, key),
    }
}

fn translate_vim(mode: Mode, key: KeyEvent) -> Option<Action> {
    match mode {
        Mode::Normal => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(0, -1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(0, 1)),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(-1, 0)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(1, 0)),

            KeyCode::PageUp => Some(Action::Page(-1)),
            KeyCode::PageDown => Some(Action::Page(1)),
            KeyCode::Home | KeyCode::Char('0') => Some(Action::HomeCol),
            KeyCode::End | KeyCode::Char('$') => Some(Action::EndCol),

            KeyCode::Tab => Some(Action::NextSheet),
            KeyCode::BackTab => Some(Action::PrevSheet),

            KeyCode::Enter | KeyCode::Char('i') => Some(Action::EnterEdit),
            KeyCode::Char('x') | KeyCode::Delete => Some(Action::ClearCell),
            KeyCode::Char(':') => Some(Action::EnterCommand),
            KeyCode::Char('+') | KeyCode::Char('>') => Some(Action::IncColWidth),
            KeyCode::Char('-') | KeyCode::Char('<') => Some(Action::DecColWidth),
            KeyCode::Char('G') => Some(Action::GotoLast),
            KeyCode::Char('g') => Some(Action::OpenGotoPrompt),
            KeyCode::Char('?') => Some(Action::Help),
            _ => None,
        },

        Mode::Edit => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::CommitEdit),
            _ => None,
        },

        Mode::Command => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::ExecuteCommand),
            _ => None,
        },
    }
}

fn translate_emacs(mode: Mode, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match mode {
        Mode::Normal => match key.code {
            // Cancel
            KeyCode::Char('g') if ctrl => Some(Action::Cancel),

            // Movement
            KeyCode::Up => Some(Action::Move(0, -1)),
            KeyCode::Down => Some(Action::Move(0, 1)),
            KeyCode::Left => Some(Action::Move(-1, 0)),
            KeyCode::Right => Some(Action::Move(1, 0)),
            KeyCode::Char('p') if ctrl => Some(Action::Move(0, -1)),
            KeyCode::Char('n') if ctrl => Some(Action::Move(0, 1)),
            KeyCode::Char('b') if ctrl => Some(Action::Move(-1, 0)),
            KeyCode::Char('f') if ctrl => Some(Action::Move(1, 0)),
            KeyCode::PageUp => Some(Action::Page(-1)),
            KeyCode::PageDown => Some(Action::Page(1)),
            KeyCode::Char('v') if ctrl => Some(Action::Page(1)),
            KeyCode::Char('v') if alt => Some(Action::Page(-1)),

            // Home/End column
            KeyCode::Char('a') if ctrl => Some(Action::HomeCol),
            KeyCode::Char('e') if ctrl => Some(Action::EndCol),
            KeyCode::Home => Some(Action::HomeCol),
            KeyCode::End => Some(Action::EndCol),
            KeyCode::Char('<') if alt => Some(Action::GotoFirst),
            KeyCode::Char('>') if alt => Some(Action::GotoLast),

            // Sheets
            KeyCode::Tab => Some(Action::NextSheet),
            KeyCode::BackTab => Some(Action::PrevSheet),

            // Edit
            KeyCode::Enter => Some(Action::EnterEdit),
            KeyCode::Char('d') if ctrl => Some(Action::ClearCell),
            KeyCode::Delete => Some(Action::ClearCell),

            // Command prompt
            KeyCode::Char('x') if alt => Some(Action::EnterCommand),
            KeyCode::Char(':') => None, // strict
            KeyCode::Char('g') if alt => Some(Action::OpenGotoPrompt),

            KeyCode::Char('s') if ctrl => Some(Action::Save),
            KeyCode::Char('q') if ctrl => Some(Action::Quit),
            KeyCode::Char('h') if alt => Some(Action::Help),

            _ => None,
        },

        Mode::Edit => match key.code {
            KeyCode::Char('g') if ctrl => Some(Action::Cancel),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::CommitEdit),
            _ => None,
        },

        Mode::Command => match key.code {
            KeyCode::Char('g') if ctrl => Some(Action::Cancel),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::ExecuteCommand),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn from_name_falls_back_to_vim() {
        assert_eq!(Keymap::from_name("Emacs"), (Keymap::Emacs, None));
        assert_eq!(Keymap::from_name("vim"), (Keymap::Vim, None));
        let (keymap, warning) = Keymap::from_name("helix");
        assert_eq!(keymap, Keymap::Vim);
        assert!(warning.unwrap().contains("helix"));
    }

    #[test]
    fn vim_tab_switches_sheets() {
        assert_eq!(
            translate(Keymap::Vim, Mode::Normal, key(KeyCode::Tab, KeyModifiers::empty())),
            Some(Action::NextSheet)
        );
        assert_eq!(
            translate(Keymap::Vim, Mode::Normal, key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Action::PrevSheet)
        );
    }

    #[test]
    fn emacs_is_strict_about_letters() {
        let plain_j = key(KeyCode::Char('j'), KeyModifiers::empty());
        assert_eq!(translate(Keymap::Emacs, Mode::Normal, plain_j), None);
        assert_eq!(
            translate(Keymap::Emacs, Mode::Normal, key(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(Action::Move(0, 1))
        );
    }

    #[test]
    fn edit_mode_leaves_text_keys_unbound() {
        let plain_h = key(KeyCode::Char('h'), KeyModifiers::empty());
        assert_eq!(translate(Keymap::Vim, Mode::Edit, plain_h), None);
        assert_eq!(
            translate(Keymap::Vim, Mode::Edit, key(KeyCode::Enter, KeyModifiers::empty())),
            Some(Action::CommitEdit)
        );
    }
}
