//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Focus};
use crate::printer::Tone;

const ACCENT: Color = Color::Rgb(0x10, 0xb9, 0x81);
const CLEAR_BUTTON: Color = Color::Rgb(0x7c, 0x3a, 0xed);
const DISABLED: Color = Color::Rgb(0x47, 0x55, 0x69);
const TEXT: Color = Color::Rgb(0xf1, 0xf5, 0xf9);
const PLACEHOLDER: Color = Color::Rgb(0x94, 0xa3, 0xb8);
const GUTTER: Color = Color::Rgb(0x64, 0x74, 0x8b);
const SPINNER: Color = Color::Rgb(0xfa, 0xcc, 0x15);
const ERROR_TEXT: Color = Color::Rgb(0xef, 0x44, 0x44);
const SUCCESS_TEXT: Color = Color::Rgb(0x22, 0xc5, 0x5e);

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Fill(2),   // Editor
            Constraint::Length(1), // Actions
            Constraint::Fill(3),   // Output
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let title = Paragraph::new("🐍 Paste Your Python Code Below")
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(title, main_layout[0]);

    render_editor(frame, app, main_layout[1]);
    render_actions(frame, app, main_layout[2]);
    render_output(frame, app, main_layout[3]);
    render_status_bar(frame, app, main_layout[4]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// First visible line/column so that `cursor` stays inside a `viewport` of that size.
pub fn follow_cursor(cursor: usize, viewport: usize) -> usize {
    if viewport == 0 {
        return cursor;
    }
    cursor.saturating_sub(viewport - 1)
}

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(GUTTER)
    }
}

/// Render the code editor with its line-number gutter
fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Editor;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border(focused))
        .title("Code");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line_count = app.editor.line_count();
    let gutter_width = line_count.to_string().len().max(3) as u16 + 1;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(gutter_width), Constraint::Min(1)])
        .split(inner);

    let (row, _) = app.editor.cursor();
    let top = follow_cursor(row, columns[1].height as usize) as u16;
    let left = follow_cursor(app.editor.cursor_display_col(), columns[1].width as usize) as u16;

    let numbers: Vec<Line> = (1..=line_count)
        .map(|n| Line::from(format!("{:>width$} ", n, width = gutter_width as usize - 1)))
        .collect();
    let gutter = Paragraph::new(numbers)
        .style(Style::default().fg(GUTTER))
        .scroll((top, 0));
    frame.render_widget(gutter, columns[0]);

    let code_style = if app.editor.showing_placeholder() {
        Style::default().fg(PLACEHOLDER).add_modifier(Modifier::ITALIC)
    } else {
        Style::default().fg(TEXT)
    };
    let lines: Vec<Line> = app
        .editor
        .display_lines()
        .into_iter()
        .map(|l| Line::from(l.to_string()))
        .collect();
    let code = Paragraph::new(lines)
        .style(code_style)
        .scroll((top, if app.editor.showing_placeholder() { 0 } else { left }));
    frame.render_widget(code, columns[1]);

    if focused && !app.editor.showing_placeholder() {
        let x = columns[1].x + (app.editor.cursor_display_col() as u16).saturating_sub(left);
        let y = columns[1].y + (row as u16).saturating_sub(top);
        frame.set_cursor_position((x, y));
    }
}

/// Render the analyze/clear action row and the busy spinner
fn render_actions(frame: &mut Frame, app: &App, area: Rect) {
    let analyze_bg = if app.is_busy() { DISABLED } else { ACCENT };
    let spans = vec![
        Span::styled(
            " 🔍 Analyze Code [F5] ",
            Style::default().bg(analyze_bg).fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            " 🗑️ Clear Output [Ctrl+L] ",
            Style::default().bg(CLEAR_BUTTON).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            app.spinner_text(),
            Style::default().fg(SPINNER).add_modifier(Modifier::ITALIC),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the report panel
fn render_output(frame: &mut Frame, app: &App, area: Rect) {
    let (text, tone) = app.output_text();
    let style = match tone {
        Some(Tone::Success) => Style::default().fg(SUCCESS_TEXT),
        Some(Tone::Error) => Style::default().fg(ERROR_TEXT),
        None => Style::default().fg(PLACEHOLDER),
    };

    let paragraph = Paragraph::new(Text::from(text))
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused_border(app.focus == Focus::Output))
                .title("🧾 Output & Explanation")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = format!(
        "{} | {} | F1 help",
        app.status_message, app.interpreter_label
    );

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create centered popup area
    let popup_area = centered_rect(70, 60, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("BugFinder Help"),
        Line::from(""),
        Line::from("Analyze:"),
        Line::from("  F5 / Ctrl+Enter / Ctrl+R - Run the code and explain failures"),
        Line::from("  Ctrl+L                   - Clear the output panel"),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  Type or paste            - Edit code (placeholder clears itself)"),
        Line::from("  Tab                      - Insert four spaces"),
        Line::from("  Esc                      - Leave the editor"),
        Line::from("  PgUp/PgDn                - Scroll the output"),
        Line::from(""),
        Line::from("  F1                       - Toggle this help"),
        Line::from("  Ctrl+C / Ctrl+Q          - Quit"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
