//! UI rendering

use super::app::{App, Mode};
use super::help::{get_about_help, get_commands_help, get_help_text};
use odsgrid_core::address::col_to_letters;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 10;
pub(crate) const SHEET_TABS_HEIGHT: u16 = 1;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 5;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

/// Formula bar, grid, sheet tabs and status line.
pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(SHEET_TABS_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

pub(crate) fn grid_cell_at(
    app: &App,
    grid_area: Rect,
    mouse_col: u16,
    mouse_row: u16,
) -> Option<(usize, usize)> {
    if grid_area.width < 3 || grid_area.height < 4 {
        return None;
    }

    let inner_x = grid_area.x.saturating_add(1);
    let inner_y = grid_area.y.saturating_add(1);
    let inner_width = grid_area.width.saturating_sub(2);
    let inner_height = grid_area.height.saturating_sub(2);
    let inner_right = inner_x.saturating_add(inner_width);
    let inner_bottom = inner_y.saturating_add(inner_height);

    if mouse_col < inner_x
        || mouse_col >= inner_right
        || mouse_row < inner_y
        || mouse_row >= inner_bottom
    {
        return None;
    }

    // Header row contains column letters, not data cells.
    if inner_height <= 1 || mouse_row == inner_y {
        return None;
    }

    let rel_row = mouse_row.saturating_sub(inner_y.saturating_add(1)) as usize;
    if rel_row >= app.visible_rows {
        return None;
    }
    let row = app.viewport_row.saturating_add(rel_row);
    if row >= app.max_rows() {
        return None;
    }

    let row_header_end = inner_x.saturating_add(ROW_HEADER_WIDTH);
    if mouse_col < row_header_end {
        return None;
    }

    let mut x = row_header_end.saturating_add(GRID_COLUMN_SPACING);
    if mouse_col < x {
        return None;
    }

    let max_cols = app.max_cols();
    for offset in 0..app.visible_cols {
        let col = app.viewport_col + offset;
        if col >= max_cols {
            break;
        }

        let width = app.get_column_width(col) as u16;
        let cell_end = x.saturating_add(width);
        if mouse_col >= x && mouse_col < cell_end {
            return Some((col, row));
        }

        x = cell_end;
        let spacing_end = x.saturating_add(GRID_COLUMN_SPACING);
        if mouse_col >= x && mouse_col < spacing_end {
            return None;
        }
        x = spacing_end;

        if x >= inner_right {
            break;
        }
    }

    None
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [formula_area, grid_area, tabs_area, status_area] = split_main_chunks(f.area());

    // Update visible dimensions based on actual size
    let available_width = grid_area.width.saturating_sub(ROW_HEADER_WIDTH + 2) as usize;
    let available_height = grid_area.height.saturating_sub(3) as usize; // header + borders

    app.visible_cols = (available_width / (app.col_width + 1)).max(1);
    app.visible_rows = available_height.max(1);
    app.update_viewport();

    draw_formula_bar(f, app, formula_area);
    draw_grid(f, app, grid_area);
    draw_sheet_tabs(f, app, tabs_area);
    draw_status_bar(f, app, status_area);

    if app.help_modal {
        draw_help_modal(f, app);
    }
}

fn draw_formula_bar(f: &mut Frame, app: &App, area: Rect) {
    let cell_name = app.current_address().a1();

    let content = match app.mode {
        Mode::Edit => {
            // Insert cursor marker at cursor position
            let (before, after) = app.edit_buffer.split_at(app.edit_cursor);
            format!("{}: {}│{}", cell_name, before, after)
        }
        Mode::Command => {
            let (before, after) = app.command_buffer.split_at(app.command_cursor);
            format!(":{}│{}", before, after)
        }
        Mode::Normal => match app.doc.cell(app.current_address()) {
            Some(cell) if !cell.is_blank() => {
                let mut text = format!("{}: {}  [{}]", cell_name, cell.value, cell.value_type);
                if !cell.formula.is_empty() {
                    text.push_str("  ");
                    text.push_str(&cell.formula);
                }
                text
            }
            _ => format!("{}: (empty)", cell_name),
        },
    };

    let title = match app.mode {
        Mode::Edit => " Edit ",
        Mode::Command => " Command ",
        Mode::Normal => " Cell ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(match app.mode {
            Mode::Edit => Color::Yellow,
            Mode::Command => Color::Cyan,
            Mode::Normal => Color::White,
        }));

    let paragraph = Paragraph::new(content).block(block);
    f.render_widget(paragraph, area);
}

fn header_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let max_cols = app.max_cols();
    let max_rows = app.max_rows();
    let cols: Vec<usize> = (app.viewport_col..app.viewport_col + app.visible_cols)
        .take_while(|&col| col < max_cols)
        .collect();

    // Build header row
    let mut header_cells = vec![Cell::from(" ")]; // Corner
    for &col in &cols {
        header_cells.push(Cell::from(col_to_letters(col)).style(header_style(col == app.cursor_col)));
    }
    let header = Row::new(header_cells).height(1);

    // Build data rows
    let mut rows = Vec::new();
    for row in (app.viewport_row..app.viewport_row + app.visible_rows).take_while(|&r| r < max_rows)
    {
        let mut cells = vec![
            Cell::from(format!("{}", row + 1)).style(header_style(row == app.cursor_row)),
        ];

        for &col in &cols {
            let display = app.cell_display(row, col);
            let style = if row == app.cursor_row && col == app.cursor_col {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if display.starts_with("Error ") {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            cells.push(Cell::from(display.replace('\n', " ")).style(style));
        }

        rows.push(Row::new(cells));
    }

    // Build column widths dynamically based on per-column settings
    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)]; // Row header
    widths.extend(
        cols.iter()
            .map(|&col| Constraint::Length(app.get_column_width(col) as u16)),
    );

    let title = format!(" {} ", app.sheet_name());
    let border = if app.doc.is_read_only() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border),
        )
        .column_spacing(GRID_COLUMN_SPACING);

    f.render_widget(table, area);
}

fn draw_sheet_tabs(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for (i, sheet) in app.doc.model().sheets.iter().enumerate() {
        let style = if i == app.sheet {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", sheet.name), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let file_info = if let Some(ref path) = app.doc.file_path {
        let modified_indicator = if app.doc.modified { " [+]" } else { "" };
        format!("{}{}", path.display(), modified_indicator)
    } else if app.doc.modified {
        "[New File] [+]".to_string()
    } else {
        "[New File]".to_string()
    };

    let help = app.keymap.status_hint();

    let status = if !app.status_message.is_empty() {
        app.status_message.clone()
    } else {
        format!("{}  |  [{}]  |  {}", file_info, app.keymap.name(), help)
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(status, style)]));
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn push_section(lines: &mut Vec<Line<'static>>, section: Vec<String>, title: &str) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    for text in section {
        let style = if text == title {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if text.starts_with("  ") {
            Style::default().fg(Color::White)
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
}

fn draw_help_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(88, 88, f.area());

    let modal_style = Style::default().fg(Color::White).bg(Color::Black);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Green))
        .style(modal_style);

    let mut lines: Vec<Line> = Vec::new();
    push_section(&mut lines, get_about_help(), "About odsgrid");
    push_section(&mut lines, get_help_text(app.keymap), "");
    push_section(&mut lines, get_commands_help(), "Commands");

    let viewport_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(viewport_height);
    let effective_scroll = app.help_scroll.min(max_scroll);
    let scroll_y = u16::try_from(effective_scroll).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(modal_style)
        .scroll((scroll_y, 0))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::blank_app;
    use ratatui::{Terminal, backend::TestBackend};

    fn first_body_cell_point(grid_area: Rect) -> (u16, u16) {
        (
            grid_area.x + 1 + ROW_HEADER_WIDTH + GRID_COLUMN_SPACING,
            grid_area.y + 2,
        )
    }

    #[test]
    fn grid_cell_at_maps_first_visible_cell_to_viewport_origin() {
        let mut app = blank_app(20, 20);
        app.viewport_col = 5;
        app.viewport_row = 7;
        app.visible_cols = 4;
        app.visible_rows = 4;

        let grid_area = Rect::new(0, 0, 80, 20);
        let (x, y) = first_body_cell_point(grid_area);

        assert_eq!(grid_cell_at(&app, grid_area, x, y), Some((5, 7)));
    }

    #[test]
    fn grid_cell_at_maps_second_column_with_custom_width_and_spacing() {
        let mut app = blank_app(20, 20);
        app.viewport_col = 3;
        app.viewport_row = 2;
        app.visible_cols = 3;
        app.visible_rows = 3;
        app.column_widths.insert(3, 10);
        app.column_widths.insert(4, 8);

        let grid_area = Rect::new(0, 0, 80, 20);
        let (first_x, y) = first_body_cell_point(grid_area);
        let second_col_start = first_x + app.get_column_width(3) as u16 + GRID_COLUMN_SPACING;

        assert_eq!(
            grid_cell_at(&app, grid_area, second_col_start + 1, y),
            Some((4, 2))
        );
    }

    #[test]
    fn grid_cell_at_ignores_headers_and_spacing() {
        let mut app = blank_app(20, 20);
        app.visible_cols = 4;
        app.visible_rows = 4;

        let grid_area = Rect::new(0, 0, 80, 20);
        let (first_x, y) = first_body_cell_point(grid_area);
        let spacing_x = first_x + app.get_column_width(0) as u16;

        assert_eq!(grid_cell_at(&app, grid_area, grid_area.x + 2, y), None);
        assert_eq!(grid_cell_at(&app, grid_area, first_x, grid_area.y + 1), None);
        assert_eq!(grid_cell_at(&app, grid_area, grid_area.x, grid_area.y), None);
        assert_eq!(grid_cell_at(&app, grid_area, spacing_x, y), None);
    }

    #[test]
    fn grid_cell_at_respects_sheet_bounds() {
        let mut app = blank_app(1, 1);
        app.visible_cols = 3;
        app.visible_rows = 3;

        let grid_area = Rect::new(0, 0, 80, 20);
        let (first_x, first_y) = first_body_cell_point(grid_area);
        let second_col_x = first_x + app.get_column_width(0) as u16 + GRID_COLUMN_SPACING + 1;

        assert_eq!(
            grid_cell_at(&app, grid_area, first_x, first_y),
            Some((0, 0))
        );
        assert_eq!(grid_cell_at(&app, grid_area, second_col_x, first_y), None);
        assert_eq!(grid_cell_at(&app, grid_area, first_x, first_y + 1), None);
    }

    #[test]
    fn draw_renders_sheet_name_and_tabs() {
        let mut app = blank_app(3, 3);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Sheet1"));
        assert!(text.contains("A1: (empty)"));
        assert!(app.visible_rows > 1);
    }
}
