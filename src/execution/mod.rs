//! Execution engine: the analyze pipeline and its report types.
//!
//! `analyze` guards against empty or placeholder input, runs the text in a
//! fresh interpreter, and turns the outcome into an [`ExecutionReport`].
//! Failures raised by the analyzed text always come back as
//! [`ExecutionReport::Failure`]; `Err` is reserved for the pipeline's own
//! plumbing.

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;
use crate::error::PipelineError;
use crate::explain::FailureCategory;
use crate::process::Interpreter;

pub mod python;
pub mod trace;

pub use trace::SourceLine;

use python::{Envelope, EnvelopeStatus};

/// Hint shown in an empty editor; submitting it counts as no input.
pub const PLACEHOLDER: &str = "# Write your Python code here...\n# Example:\n# print('Hello World')";

/// Category reported when the optional execution time limit is hit.
pub const TIMEOUT_TYPE_NAME: &str = "TimeoutError";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure,
    InvalidInput,
}

/// A classified failure raised by the analyzed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureInfo {
    pub category: FailureCategory,
    /// The failure's own description, unmodified.
    pub message: String,
    pub source_line: SourceLine,
    /// Formatted trace, without the harness frame.
    pub trace: String,
}

impl FailureInfo {
    pub fn explanation(&self) -> &'static str {
        self.category.explanation()
    }
}

/// Result of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionReport {
    Success { captured_output: String },
    Failure(FailureInfo),
    InvalidInput,
}

impl ExecutionReport {
    pub fn status(&self) -> Status {
        match self {
            Self::Success { .. } => Status::Success,
            Self::Failure(_) => Status::Failure,
            Self::InvalidInput => Status::InvalidInput,
        }
    }

    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::Success { captured_output } => Some(captured_output),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureInfo> {
        match self {
            Self::Failure(info) => Some(info),
            _ => None,
        }
    }

    fn from_envelope(env: Envelope) -> Self {
        match env.status {
            EnvelopeStatus::Success => Self::Success {
                captured_output: env.output,
            },
            EnvelopeStatus::Failure => {
                let trace = env.trace.unwrap_or_default();
                let type_name = env.type_name.unwrap_or_else(|| "Exception".to_string());
                Self::Failure(FailureInfo {
                    category: FailureCategory::classify(&type_name),
                    message: env.message.unwrap_or_default(),
                    source_line: trace::locate(&trace, env.lineno),
                    trace,
                })
            }
        }
    }
}

/// True when `raw` carries nothing to run: blank, or the editor placeholder.
pub fn is_blank_or_placeholder(raw: &str, placeholder: &str) -> bool {
    let text = raw.trim();
    text.is_empty() || text == placeholder.trim()
}

/// The execute-classify-report pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    interpreter: Interpreter,
    placeholder: String,
    timeout: Option<Duration>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Interpreter::default())
    }
}

impl Pipeline {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            placeholder: PLACEHOLDER.to_string(),
            timeout: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let timeout = cfg
            .get_u64("BUGFINDER_TIMEOUT")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self::new(Interpreter::from_config(cfg)).with_timeout(timeout)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub async fn analyze(&self, raw_text: &str) -> Result<ExecutionReport, PipelineError> {
        if is_blank_or_placeholder(raw_text, &self.placeholder) {
            tracing::debug!("skipping blank or placeholder input");
            return Ok(ExecutionReport::InvalidInput);
        }

        let started = std::time::Instant::now();
        let run = python::execute_ndjson(&self.interpreter, raw_text);
        let envelope = match self.timeout {
            None => run.await?,
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result?,
                // Dropping the future kills the child.
                Err(_) => {
                    tracing::warn!(limit_secs = limit.as_secs(), "analysis timed out");
                    return Ok(timeout_report(limit));
                }
            },
        };

        let report = ExecutionReport::from_envelope(envelope);
        tracing::info!(
            status = ?report.status(),
            category = report.failure().map(|f| f.category.name()).unwrap_or("-"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis finished"
        );
        Ok(report)
    }
}

fn timeout_report(limit: Duration) -> ExecutionReport {
    ExecutionReport::Failure(FailureInfo {
        category: FailureCategory::classify(TIMEOUT_TYPE_NAME),
        message: format!("execution exceeded {} seconds", limit.as_secs()),
        source_line: SourceLine::Unknown,
        trace: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejects_blank_and_placeholder() {
        assert!(is_blank_or_placeholder("", PLACEHOLDER));
        assert!(is_blank_or_placeholder(" \n\t ", PLACEHOLDER));
        assert!(is_blank_or_placeholder(PLACEHOLDER, PLACEHOLDER));
        assert!(is_blank_or_placeholder(&format!("\n{}\n\n", PLACEHOLDER), PLACEHOLDER));
        assert!(!is_blank_or_placeholder("print('hi')", PLACEHOLDER));
        assert!(!is_blank_or_placeholder("# Write your Python code here...", PLACEHOLDER));
    }

    #[tokio::test]
    async fn invalid_input_never_spawns() {
        // A missing interpreter would error if anything were spawned.
        let pipeline = Pipeline::new(Interpreter::new("bugfinder-no-such-interpreter"));
        assert_eq!(pipeline.analyze("   ").await.unwrap(), ExecutionReport::InvalidInput);
        assert_eq!(pipeline.analyze(PLACEHOLDER).await.unwrap(), ExecutionReport::InvalidInput);
    }

    #[tokio::test]
    async fn missing_interpreter_is_a_pipeline_error() {
        let pipeline = Pipeline::new(Interpreter::new("bugfinder-no-such-interpreter"));
        let err = pipeline.analyze("print(1)").await.unwrap_err();
        assert!(matches!(err, PipelineError::Spawn { .. }));
    }

    #[test]
    fn envelope_failure_is_classified() {
        let env = Envelope {
            status: EnvelopeStatus::Failure,
            output: "partial\n".into(),
            type_name: Some("ZeroDivisionError".into()),
            message: Some("division by zero".into()),
            trace: Some("  File \"<string>\", line 4, in <module>\nZeroDivisionError: division by zero\n".into()),
            lineno: Some(4),
        };
        let report = ExecutionReport::from_envelope(env);
        let info = report.failure().unwrap();
        assert_eq!(report.status(), Status::Failure);
        assert_eq!(info.category.name(), "ZeroDivisionError");
        assert_eq!(info.message, "division by zero");
        assert_eq!(info.source_line, SourceLine::Line(4));
        assert_eq!(report.captured_output(), None);
    }

    #[test]
    fn envelope_success_keeps_output() {
        let env = Envelope {
            status: EnvelopeStatus::Success,
            output: "hi\n".into(),
            type_name: None,
            message: None,
            trace: None,
            lineno: None,
        };
        let report = ExecutionReport::from_envelope(env);
        assert_eq!(report.captured_output(), Some("hi\n"));
        assert!(report.failure().is_none());
    }

    #[test]
    fn timeout_uses_fallback_bucket() {
        let report = timeout_report(Duration::from_secs(3));
        let info = report.failure().unwrap();
        assert!(!info.category.is_known());
        assert_eq!(info.category.name(), TIMEOUT_TYPE_NAME);
        assert_eq!(info.message, "execution exceeded 3 seconds");
        assert_eq!(info.source_line, SourceLine::Unknown);
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let json = serde_json::to_value(ExecutionReport::InvalidInput).unwrap();
        assert_eq!(json["status"], "invalid_input");
        let json = serde_json::to_value(timeout_report(Duration::from_secs(1))).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["category"], "TimeoutError");
        assert!(json["source_line"].is_null());
    }
}
