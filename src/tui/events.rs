//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::dispatch::Completion;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// Terminal was resized; redraw
    Resize,
    /// Background analysis finished
    AnalysisFinished(Completion),
}
