//! Library-level error types.
//!
//! Failures raised by analyzed code are never errors here: they are part of an
//! [`ExecutionReport`](crate::execution::ExecutionReport). These types cover the
//! scaffolding around the interpreter and the worker slot.

use thiserror::Error;

/// Failure of the pipeline's own plumbing.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to start interpreter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("interpreter I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("interpreter exited ({status}) without a report{}", stderr_suffix(.stderr))]
    NoReport { status: String, stderr: String },

    #[error("malformed report from interpreter: {0}")]
    MalformedReport(#[from] serde_json::Error),

    #[error("analysis task aborted: {0}")]
    TaskAborted(String),
}

fn stderr_suffix(stderr: &str) -> String {
    let last = stderr.trim().lines().last().unwrap_or("");
    if last.is_empty() {
        String::new()
    } else {
        format!(": {}", last)
    }
}

/// Rejection from the single-slot worker.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("an analysis is already running")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_report_mentions_last_stderr_line() {
        let err = PipelineError::NoReport {
            status: "exit status: 3".into(),
            stderr: "warning\nFatal Python error: boom\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "interpreter exited (exit status: 3) without a report: Fatal Python error: boom"
        );
    }

    #[test]
    fn no_report_without_stderr() {
        let err = PipelineError::NoReport {
            status: "signal: 9".into(),
            stderr: "  \n".into(),
        };
        assert_eq!(err.to_string(), "interpreter exited (signal: 9) without a report");
    }
}
