//! TUI application state: the code editor (input surface) and the report
//! panel (output surface).

use crate::dispatch::Completion;
use crate::execution::ExecutionReport;
use crate::printer::{self, Tone};
use crate::utils::unicode::{char_to_byte_index, display_width_of_prefix};

/// Spaces inserted for a Tab key.
const INDENT: &str = "    ";

/// Which pane receives plain keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Output,
}

/// Multi-line code buffer with a placeholder shown while empty and unfocused.
#[derive(Debug, Clone)]
pub struct Editor {
    lines: Vec<String>,
    /// Cursor row
    row: usize,
    /// Cursor column, in characters
    col: usize,
    placeholder: String,
    showing_placeholder: bool,
}

impl Editor {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            placeholder: placeholder.into(),
            showing_placeholder: true,
        }
    }

    pub fn with_text(placeholder: impl Into<String>, text: &str) -> Self {
        let mut editor = Self::new(placeholder);
        editor.focus_in();
        editor.insert_str(text);
        editor.row = 0;
        editor.col = 0;
        editor
    }

    /// Text handed to the pipeline; the placeholder itself while it is shown.
    pub fn text(&self) -> String {
        if self.showing_placeholder {
            self.placeholder.clone()
        } else {
            self.lines.join("\n")
        }
    }

    pub fn showing_placeholder(&self) -> bool {
        self.showing_placeholder
    }

    /// Lines to draw, placeholder included.
    pub fn display_lines(&self) -> Vec<&str> {
        if self.showing_placeholder {
            self.placeholder.lines().collect()
        } else {
            self.lines.iter().map(String::as_str).collect()
        }
    }

    pub fn line_count(&self) -> usize {
        self.display_lines().len().max(1)
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Cursor column in terminal cells.
    pub fn cursor_display_col(&self) -> usize {
        display_width_of_prefix(&self.lines[self.row], self.col)
    }

    fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Drop the placeholder so typing starts from an empty buffer.
    pub fn focus_in(&mut self) {
        if self.showing_placeholder {
            self.showing_placeholder = false;
            self.lines = vec![String::new()];
            self.row = 0;
            self.col = 0;
        }
    }

    /// Bring the placeholder back when nothing but whitespace was typed.
    pub fn focus_out(&mut self) {
        if !self.showing_placeholder && self.is_blank() {
            self.lines = vec![String::new()];
            self.row = 0;
            self.col = 0;
            self.showing_placeholder = true;
        }
    }

    fn current_len(&self) -> usize {
        self.lines[self.row].chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        self.focus_in();
        match c {
            '\n' => self.newline(),
            '\r' => {}
            '\t' => self.insert_plain(INDENT),
            c => {
                let line = &mut self.lines[self.row];
                let at = char_to_byte_index(line, self.col);
                line.insert(at, c);
                self.col += 1;
            }
        }
    }

    /// Insert pasted text; CRLF and lone CR become newlines.
    pub fn insert_str(&mut self, text: &str) {
        self.focus_in();
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for (i, part) in normalized.split('\n').enumerate() {
            if i > 0 {
                self.split_line();
            }
            self.insert_plain(&part.replace('\t', INDENT));
        }
    }

    fn insert_plain(&mut self, s: &str) {
        let line = &mut self.lines[self.row];
        let at = char_to_byte_index(line, self.col);
        line.insert_str(at, s);
        self.col += s.chars().count();
    }

    fn split_line(&mut self) {
        let line = &mut self.lines[self.row];
        let at = char_to_byte_index(line, self.col);
        let rest = line.split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    /// Enter: split the line, keeping its indentation (one level deeper after ':').
    pub fn newline(&mut self) {
        self.focus_in();
        let current = &self.lines[self.row];
        let before = &current[..char_to_byte_index(current, self.col)];
        let mut indent: String = before.chars().take_while(|c| *c == ' ').collect();
        if before.trim_end().ends_with(':') {
            indent.push_str(INDENT);
        }
        self.split_line();
        self.insert_plain(&indent);
    }

    pub fn backspace(&mut self) {
        if self.showing_placeholder {
            return;
        }
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = char_to_byte_index(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.current_len();
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.showing_placeholder {
            return;
        }
        if self.col < self.current_len() {
            let line = &mut self.lines[self.row];
            let at = char_to_byte_index(line, self.col);
            line.remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.current_len();
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.current_len() {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.current_len());
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.current_len());
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.current_len();
    }
}

/// What the output panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputState {
    /// Nothing analyzed yet
    Hint,
    Report(ExecutionReport),
    /// The pipeline itself failed
    Error(String),
    Cleared,
}

/// Application state for the TUI
#[derive(Debug)]
pub struct App {
    pub editor: Editor,
    pub focus: Focus,
    pub output: OutputState,
    /// Scroll offset of the output panel, in lines
    pub output_scroll: u16,
    /// Generation of the analysis in flight, if any
    pub pending_generation: Option<u64>,
    /// Generation of the report currently shown
    pub applied_generation: u64,
    pub status_message: String,
    pub interpreter_label: String,
    pub show_help: bool,
}

impl App {
    pub fn new(editor: Editor, interpreter_label: String) -> Self {
        let focus = if editor.showing_placeholder() { Focus::Output } else { Focus::Editor };
        Self {
            editor,
            focus,
            output: OutputState::Hint,
            output_scroll: 0,
            pending_generation: None,
            applied_generation: 0,
            status_message: "Ready".to_string(),
            interpreter_label,
            show_help: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_generation.is_some()
    }

    pub fn spinner_text(&self) -> &'static str {
        if self.is_busy() { "⏳ Analyzing..." } else { "" }
    }

    pub fn focus_editor(&mut self) {
        self.focus = Focus::Editor;
        self.editor.focus_in();
    }

    pub fn unfocus_editor(&mut self) {
        self.focus = Focus::Output;
        self.editor.focus_out();
    }

    /// Record that `generation` was submitted.
    pub fn begin_analysis(&mut self, generation: u64) {
        self.pending_generation = Some(generation);
        self.status_message = "Analyzing...".to_string();
    }

    /// Show a finished analysis unless a newer one is already on screen.
    /// Returns whether the panel changed.
    pub fn apply_completion(&mut self, completion: Completion) -> bool {
        if self.pending_generation == Some(completion.generation) {
            self.pending_generation = None;
        }
        if completion.generation < self.applied_generation {
            tracing::debug!(generation = completion.generation, "dropping stale completion");
            return false;
        }

        self.applied_generation = completion.generation;
        self.output_scroll = 0;
        match completion.result {
            Ok(report) => {
                self.status_message = match report.failure() {
                    Some(info) => format!("Failed: {}", info.category.name()),
                    None => "Done".to_string(),
                };
                self.output = OutputState::Report(report);
            }
            Err(e) => {
                self.status_message = "Analysis could not run".to_string();
                self.output = OutputState::Error(format!("❌ {}", e));
            }
        }
        true
    }

    /// Discard the shown report; an analysis in flight still lands later.
    pub fn clear_output(&mut self) {
        self.output = OutputState::Cleared;
        self.output_scroll = 0;
        self.status_message = "Output cleared".to_string();
    }

    /// Text and tone of the output panel.
    pub fn output_text(&self) -> (String, Option<Tone>) {
        match &self.output {
            OutputState::Hint => (printer::IDLE_HINT.to_string(), None),
            OutputState::Report(report) => {
                (printer::render_report(report), Some(Tone::from(report.status())))
            }
            OutputState::Error(msg) => (msg.clone(), Some(Tone::Error)),
            OutputState::Cleared => (String::new(), None),
        }
    }

    pub fn scroll_output_up(&mut self, lines: u16) {
        self.output_scroll = self.output_scroll.saturating_sub(lines);
    }

    pub fn scroll_output_down(&mut self, lines: u16) {
        self.output_scroll = self.output_scroll.saturating_add(lines);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}
