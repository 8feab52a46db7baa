//! Async event handler for the TUI.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use is_terminal::IsTerminal;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::{
    config::Config,
    dispatch::{Analyzer, Dispatcher},
    execution::PLACEHOLDER,
};
use super::{
    app::{App, Editor, Focus},
    events::TuiEvent,
    ui::render_ui,
};

/// Lines moved by PageUp/PageDown in the output panel.
const PAGE: u16 = 5;

/// Run the TUI, optionally starting with `initial_code` in the editor.
pub async fn run_tui(cfg: &Config, initial_code: Option<String>) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    let dispatcher = Dispatcher::from_config(cfg);
    let interpreter = dispatcher.analyzer().interpreter().clone();
    let interpreter_label = match interpreter.probe_version().await {
        Some(version) => format!("{} ({})", version, interpreter.program),
        None => format!("{} (not found)", interpreter.program),
    };
    tracing::info!(interpreter = %interpreter_label, "starting TUI");

    let editor = match initial_code {
        Some(code) if !code.trim().is_empty() => Editor::with_text(PLACEHOLDER, &code),
        _ => Editor::new(PLACEHOLDER),
    };
    let mut app = App::new(editor, interpreter_label);

    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &dispatcher, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app<A: Analyzer>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher<A>,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    // Spawn input handler; it stops once the receiver is gone.
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        while !input_tx.is_closed() {
            // Poll for terminal events
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => TuiEvent::Key(key),
                Ok(Event::Paste(text)) => TuiEvent::Paste(text),
                Ok(Event::Resize(_, _)) => TuiEvent::Resize,
                _ => continue,
            };
            if input_tx.send(forwarded).is_err() {
                break; // Channel closed
            }
        }
    });

    loop {
        // Render UI
        terminal.draw(|frame| render_ui(frame, app))?;

        // Handle events
        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, key, dispatcher, &event_tx) {
                        return Ok(()); // Quit requested
                    }
                }
                TuiEvent::Paste(text) => {
                    app.focus_editor();
                    app.editor.insert_str(&text);
                }
                TuiEvent::Resize => {}
                TuiEvent::AnalysisFinished(completion) => {
                    app.apply_completion(completion);
                }
            }
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }
}

/// Handle keyboard events; returns true when the user asked to quit.
fn handle_key_event<A: Analyzer>(
    app: &mut App,
    key: KeyEvent,
    dispatcher: &Dispatcher<A>,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    // Help overlay: any key closes it
    if app.show_help {
        app.toggle_help();
        return false;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return true,
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(5) => trigger_analyze(app, dispatcher, event_tx),
        KeyCode::Char('r') if ctrl => trigger_analyze(app, dispatcher, event_tx),
        KeyCode::Enter if ctrl => trigger_analyze(app, dispatcher, event_tx),
        KeyCode::Char('l') if ctrl => app.clear_output(),
        KeyCode::PageUp => app.scroll_output_up(PAGE),
        KeyCode::PageDown => app.scroll_output_down(PAGE),
        KeyCode::Esc => app.unfocus_editor(),
        _ => edit(app, key),
    }
    false
}

fn edit(app: &mut App, key: KeyEvent) {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return;
    }
    if app.focus != Focus::Editor {
        if !matches!(key.code, KeyCode::Char(_) | KeyCode::Enter | KeyCode::Tab) {
            return;
        }
        app.focus_editor();
    }

    let editor = &mut app.editor;
    match key.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Enter => editor.newline(),
        KeyCode::Tab => editor.insert_char('\t'),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => {}
    }
}

/// Submit the editor text unless an analysis is already running.
fn trigger_analyze<A: Analyzer>(
    app: &mut App,
    dispatcher: &Dispatcher<A>,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) {
    if app.is_busy() {
        app.status_message = "Analysis already running".to_string();
        return;
    }

    let tx = event_tx.clone();
    match dispatcher.submit(app.editor.text(), move |completion| {
        let _ = tx.send(TuiEvent::AnalysisFinished(completion));
    }) {
        Ok(generation) => app.begin_analysis(generation),
        Err(e) => app.status_message = e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::execution::ExecutionReport;
    use crate::tui::app::OutputState;
    use std::future::Future;

    struct Echo;

    impl Analyzer for Echo {
        fn analyze(
            &self,
            raw_text: &str,
        ) -> impl Future<Output = Result<ExecutionReport, PipelineError>> + Send {
            let output = raw_text.to_string();
            async move { Ok(ExecutionReport::Success { captured_output: output }) }
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[tokio::test]
    async fn typing_then_f5_runs_the_editor_text() {
        let dispatcher = Dispatcher::new(Echo, Duration::ZERO);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(Editor::new(PLACEHOLDER), String::new());

        for c in "x=1".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c), KeyModifiers::NONE), &dispatcher, &tx);
        }
        handle_key_event(&mut app, press(KeyCode::F(5), KeyModifiers::NONE), &dispatcher, &tx);
        assert!(app.is_busy());

        // Busy: a second trigger is refused by the app before reaching the worker.
        handle_key_event(&mut app, press(KeyCode::Char('r'), KeyModifiers::CONTROL), &dispatcher, &tx);
        assert_eq!(app.status_message, "Analysis already running");

        match rx.recv().await {
            Some(TuiEvent::AnalysisFinished(done)) => {
                assert!(app.apply_completion(done));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(
            app.output,
            OutputState::Report(ExecutionReport::Success { captured_output: "x=1".into() })
        );
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn placeholder_is_what_gets_submitted() {
        let dispatcher = Dispatcher::new(Echo, Duration::ZERO);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(Editor::new(PLACEHOLDER), String::new());

        handle_key_event(&mut app, press(KeyCode::Enter, KeyModifiers::CONTROL), &dispatcher, &tx);
        match rx.recv().await {
            Some(TuiEvent::AnalysisFinished(done)) => {
                let report = done.result.unwrap();
                assert_eq!(report.captured_output(), Some(PLACEHOLDER));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn quit_clear_and_help_keys() {
        let dispatcher = Dispatcher::new(Echo, Duration::ZERO);
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Editor::new(PLACEHOLDER), String::new());

        assert!(!handle_key_event(&mut app, press(KeyCode::Char('l'), KeyModifiers::CONTROL), &dispatcher, &tx));
        assert_eq!(app.output, OutputState::Cleared);
        // Ctrl+L must not type into the editor.
        assert!(app.editor.showing_placeholder());

        handle_key_event(&mut app, press(KeyCode::F(1), KeyModifiers::NONE), &dispatcher, &tx);
        assert!(app.show_help);
        // Any key closes help, including quit keys.
        assert!(!handle_key_event(&mut app, press(KeyCode::Char('q'), KeyModifiers::CONTROL), &dispatcher, &tx));
        assert!(!app.show_help);
        assert!(handle_key_event(&mut app, press(KeyCode::Char('c'), KeyModifiers::CONTROL), &dispatcher, &tx));
    }

    #[test]
    fn escape_restores_placeholder_on_empty_editor() {
        let dispatcher = Dispatcher::new(Echo, Duration::ZERO);
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Editor::new(PLACEHOLDER), String::new());

        handle_key_event(&mut app, press(KeyCode::Char(' '), KeyModifiers::NONE), &dispatcher, &tx);
        assert!(!app.editor.showing_placeholder());
        handle_key_event(&mut app, press(KeyCode::Esc, KeyModifiers::NONE), &dispatcher, &tx);
        assert!(app.editor.showing_placeholder());
        assert_eq!(app.focus, Focus::Output);
    }
}
