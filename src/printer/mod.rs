//! Printers: report rendering as text, markdown (termimad) and JSON.

use owo_colors::OwoColorize;
use serde::Serialize;
use termimad::MadSkin;

use crate::execution::{ExecutionReport, FailureInfo, SourceLine, Status};

pub const IDLE_HINT: &str =
    "🔸 Enter Python code above and press F5 (or Ctrl+Enter) to detect errors and explanations.";
pub const INVALID_INPUT_TEXT: &str = "⚠ Please enter valid Python code to analyze.";
pub const SUCCESS_HEADLINE: &str = "✅ Code executed successfully!";

/// Color family a report is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

impl From<Status> for Tone {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => Tone::Success,
            Status::Failure | Status::InvalidInput => Tone::Error,
        }
    }
}

/// The report as one block of text.
pub fn render_report(report: &ExecutionReport) -> String {
    match report {
        ExecutionReport::Success { captured_output } => {
            let mut out = format!("{}\n", SUCCESS_HEADLINE);
            if !captured_output.trim().is_empty() {
                out.push_str("\n📤 Output:\n");
                out.push_str(captured_output);
            }
            out
        }
        ExecutionReport::Failure(info) => render_failure(info),
        ExecutionReport::InvalidInput => format!("{}\n", INVALID_INPUT_TEXT),
    }
}

fn render_failure(info: &FailureInfo) -> String {
    format!(
        "❌ Error: {} on line {}\n📌 Message: {}\n💡 Explanation: {}\n",
        info.category.name(),
        info.source_line,
        info.message,
        info.explanation()
    )
}

/// Markdown flavor of [`render_report`]; the trace is included on request.
pub fn render_markdown(report: &ExecutionReport, with_trace: bool) -> String {
    match report {
        ExecutionReport::Success { captured_output } => {
            let mut md = format!("## {}\n", SUCCESS_HEADLINE);
            if !captured_output.trim().is_empty() {
                md.push_str(&format!("\n**📤 Output:**\n\n```\n{}\n```\n", captured_output.trim_end()));
            }
            md
        }
        ExecutionReport::Failure(info) => {
            let mut md = format!(
                "## ❌ Error: `{}` on line {}\n\n* **📌 Message:** {}\n* **💡 Explanation:** {}\n",
                info.category.name(),
                info.source_line,
                info.message,
                info.explanation()
            );
            if with_trace && !info.trace.is_empty() {
                md.push_str(&format!("\n```\n{}\n```\n", info.trace.trim_end()));
            }
            md
        }
        ExecutionReport::InvalidInput => format!("## {}\n", INVALID_INPUT_TEXT),
    }
}

/// JSON shape printed by `--json`.
#[derive(Debug, Serialize)]
pub struct ReportView<'a> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_output: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FailureView<'a> {
    pub category: &'a str,
    pub known: bool,
    pub message: &'a str,
    pub source_line: SourceLine,
    pub explanation: &'static str,
    #[serde(skip_serializing_if = "is_blank")]
    pub trace: &'a str,
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

impl<'a> From<&'a ExecutionReport> for ReportView<'a> {
    fn from(report: &'a ExecutionReport) -> Self {
        Self {
            status: report.status(),
            captured_output: report.captured_output(),
            failure: report.failure().map(|info| FailureView {
                category: info.category.name(),
                known: info.category.is_known(),
                message: &info.message,
                source_line: info.source_line,
                explanation: info.explanation(),
                trace: &info.trace,
            }),
        }
    }
}

pub fn render_json(report: &ExecutionReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportView::from(report))
}

pub struct TextPrinter {
    pub color: Option<&'static str>,
}

impl TextPrinter {
    pub fn for_tone(tone: Tone) -> Self {
        let color = match tone {
            Tone::Success => "green",
            Tone::Error => "red",
        };
        Self { color: Some(color) }
    }

    pub fn print(&self, text: &str) {
        if let Some(c) = self.color {
            match c {
                "green" => println!("{}", text.green()),
                "red" => println!("{}", text.red()),
                "yellow" => println!("{}", text.yellow()),
                "dimmed" => println!("{}", text.dimmed()),
                _ => println!("{}", text),
            }
        } else {
            println!("{}", text);
        }
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) { self.skin.print_text(text); println!(); }
}
