//! Python execution protocol: hand the snippet to the harness and decode its
//! report line.

use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::error::PipelineError;
use crate::process::python::{start_python, REPORT_SENTINEL};
use crate::process::Interpreter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Failure,
}

/// The JSON object the harness writes after the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub output: String,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub trace: Option<String>,
    #[serde(default)]
    pub lineno: Option<u32>,
}

/// Run `code` through the harness and wait for its report.
pub async fn execute_ndjson(interp: &Interpreter, code: &str) -> Result<Envelope, PipelineError> {
    let mut handle = start_python(interp)?;

    // The harness reads all of stdin before running anything.
    handle.stdin.write_all(code.as_bytes()).await?;
    handle.stdin.shutdown().await?;
    drop(handle.stdin);

    let out = handle.child.wait_with_output().await?;
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    if !stderr.trim().is_empty() {
        tracing::debug!(stderr = %stderr.trim_end(), "interpreter stderr");
    }

    match find_envelope(&stdout) {
        Some(line) => Ok(serde_json::from_str(line)?),
        None => Err(PipelineError::NoReport {
            status: out.status.to_string(),
            stderr: stderr.into_owned(),
        }),
    }
}

/// The JSON payload of the last sentinel line in `stdout`.
pub fn find_envelope(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(REPORT_SENTINEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_last_report_line() {
        let stdout = format!(
            "stray\n{s}{{\"status\": \"success\", \"output\": \"a\"}}\n\n{s}{{\"status\": \"success\", \"output\": \"b\"}}\n",
            s = REPORT_SENTINEL
        );
        let env: Envelope = serde_json::from_str(find_envelope(&stdout).unwrap()).unwrap();
        assert_eq!(env.output, "b");
    }

    #[test]
    fn missing_report_is_none() {
        assert_eq!(find_envelope("hello\nworld\n"), None);
        assert_eq!(find_envelope(""), None);
    }

    #[test]
    fn decodes_a_failure() {
        let json = r#"{"status": "failure", "type": "ZeroDivisionError", "message": "division by zero", "trace": "  File \"<string>\", line 1, in <module>\n", "lineno": 1, "output": ""}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.status, EnvelopeStatus::Failure);
        assert_eq!(env.type_name.as_deref(), Some("ZeroDivisionError"));
        assert_eq!(env.lineno, Some(1));
    }

    #[test]
    fn null_lineno_decodes_as_none() {
        let json = r#"{"status": "failure", "type": "SystemExit", "message": "", "trace": "", "lineno": null, "output": ""}"#;
        let env: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.lineno, None);
    }
}
