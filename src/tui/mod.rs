//! Full-screen terminal UI using Ratatui: code editor, analyze/clear actions
//! and the report panel.

pub mod app;
pub mod events;
pub mod handler;
pub mod ui;

pub use handler::run_tui;
