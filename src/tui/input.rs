use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::prelude::*;
use std::io;

use super::actions::{ApplyResult, apply_action, handle_command_text, handle_edit_text};
use super::app::{App, Mode};
use super::keymap::{Action, Keymap, translate};
use super::ui;

fn handle_mouse_event(app: &mut App, terminal_area: Rect, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if app.help_modal || app.mode != Mode::Normal {
        return;
    }

    let [_formula_area, grid_area, _tabs_area, _status_area] = ui::split_main_chunks(terminal_area);
    if let Some((col, row)) = ui::grid_cell_at(app, grid_area, mouse.column, mouse.row) {
        app.cursor_col = col;
        app.cursor_row = row;
        app.update_viewport();
        app.pending_g = false;
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_help_modal(),
        KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.close_help_modal();
        }
        KeyCode::Down | KeyCode::Char('j') => app.scroll_help_by(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_help_by(-1),
        KeyCode::PageDown => app.scroll_help_by(12),
        KeyCode::PageUp => app.scroll_help_by(-12),
        KeyCode::Home | KeyCode::Char('g') => app.help_scroll = 0,
        _ => {}
    }
}

/// Resolve the second key of a vim `g` sequence.
fn g_sequence(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('g') => Action::GotoFirst,
        KeyCode::Char('t') => Action::NextSheet,
        KeyCode::Char('T') => Action::PrevSheet,
        _ => Action::OpenGotoPrompt,
    }
}

/// Process one key press. Returns `ApplyResult::Quit` when the app should exit.
pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    // Help modal takes over input
    if app.help_modal {
        handle_help_key(app, key);
        return ApplyResult::Continue;
    }

    if app.keymap == Keymap::Vim && app.mode == Mode::Normal {
        if app.pending_g {
            app.pending_g = false;
            return apply_action(app, g_sequence(key));
        }
        if key.code == KeyCode::Char('g') && key.modifiers.is_empty() {
            app.pending_g = true;
            return ApplyResult::Continue;
        }
    }

    if let Some(action) = translate(app.keymap, app.mode, key) {
        return apply_action(app, action);
    }

    // Text entry fallbacks (not bound in keymaps).
    match app.mode {
        Mode::Edit => handle_edit_text(app, key),
        Mode::Command => handle_command_text(app, key),
        Mode::Normal => {}
    }
    ApplyResult::Continue
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, key) == ApplyResult::Quit {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let terminal_area = Rect::new(0, 0, size.width, size.height);
                handle_mouse_event(app, terminal_area, mouse);
            }
            _ => {}
        }
    }
}
