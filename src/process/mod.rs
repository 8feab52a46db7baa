//! Interpreter process management (startup/IO/probing).

use std::process::Stdio;

use tokio::process::{Child, ChildStdin, Command};

use crate::config::Config;
use crate::error::PipelineError;

pub mod python;

#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

/// An external interpreter program that snippets are handed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

impl Interpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    pub fn from_config(cfg: &Config) -> Self {
        cfg.get("BUGFINDER_PYTHON")
            .filter(|p| !p.trim().is_empty() && p != "auto")
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Runs `<program> --version` and returns the reported version line.
    pub async fn probe_version(&self) -> Option<String> {
        let out = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;
        if !out.status.success() {
            return None;
        }
        // Python 2 printed the version on stderr.
        let text = if out.stdout.is_empty() { out.stderr } else { out.stdout };
        let line = String::from_utf8_lossy(&text).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

/// A spawned interpreter child with its stdin still open.
pub struct ProcessHandle {
    pub child: Child,
    pub stdin: ChildStdin,
}

pub(crate) fn spawn(mut cmd: Command, program: &str) -> Result<ProcessHandle, PipelineError> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| PipelineError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let stdin = child.stdin.take().ok_or_else(|| {
        PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "interpreter stdin unavailable",
        ))
    })?;

    Ok(ProcessHandle { child, stdin })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_has_no_version() {
        let interp = Interpreter::new("bugfinder-no-such-interpreter");
        assert_eq!(interp.probe_version().await, None);
    }

    #[test]
    fn spawn_failure_names_the_program() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = rt.enter();
        let cmd = Command::new("bugfinder-no-such-interpreter");
        match spawn(cmd, "bugfinder-no-such-interpreter") {
            Err(PipelineError::Spawn { program, .. }) => {
                assert_eq!(program, "bugfinder-no-such-interpreter")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("spawn should fail"),
        }
    }
}
