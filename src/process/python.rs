//! Python interpreter bootstrap: the harness that runs one snippet and
//! reports back over stdout.

use tokio::process::Command;

use super::{Interpreter, ProcessHandle};
use crate::error::PipelineError;

/// Filename Python attaches to code compiled from a string.
pub const SOURCE_LABEL: &str = "<string>";

/// Prefix of the report line the harness writes after the snippet finishes.
pub const REPORT_SENTINEL: &str = "\u{1e}bugfinder-report\u{1e}";

/// Reads the snippet from stdin, runs it with stdout swapped for a buffer, and
/// writes a single sentinel-prefixed JSON report to fd 1 once stdout is restored.
///
/// The snippet gets its own globals dict, and the harness frame is cut from
/// the formatted trace so the first `<string>` frame belongs to the snippet.
/// Closing the capture is a no-op, lone surrogates are backslash-escaped, and
/// the report goes straight to fd 1 so a closed `sys.__stdout__` cannot lose it.
const HARNESS: &str = r#"
import io, json, os, sys, traceback
SENTINEL = "\x1ebugfinder-report\x1e"
LABEL = "<string>"

class Capture(io.StringIO):
    def close(self):
        pass

def clean(text):
    return text.encode("utf-8", "backslashreplace").decode("utf-8")

source = sys.stdin.read()
real_stdout = sys.stdout
captured = Capture()
report = {"status": "success"}
try:
    sys.stdout = captured
    try:
        exec(compile(source, LABEL, "exec"), {"__name__": "__main__"})
    finally:
        sys.stdout = real_stdout
except BaseException as exc:
    tb = exc.__traceback__.tb_next if exc.__traceback__ is not None else None
    lineno = None
    for frame in traceback.extract_tb(tb):
        if frame.filename == LABEL:
            lineno = frame.lineno
            break
    if lineno is None and isinstance(exc, SyntaxError) and exc.filename == LABEL:
        lineno = exc.lineno
    try:
        message = str(exc)
    except BaseException:
        message = "<unprintable %s>" % type(exc).__name__
    report = {
        "status": "failure",
        "type": clean(type(exc).__name__),
        "message": clean(message),
        "trace": clean("".join(traceback.format_exception(type(exc), exc, tb))),
        "lineno": lineno,
    }
report["output"] = clean(captured.getvalue())
try:
    real_stdout.flush()
except BaseException:
    pass
data = ("\n" + SENTINEL + json.dumps(report) + "\n").encode("utf-8")
while data:
    data = data[os.write(1, data):]
"#;

/// Start the harness under `interp`; the snippet must be written to the
/// returned stdin and the stdin closed.
pub fn start_python(interp: &Interpreter) -> Result<ProcessHandle, PipelineError> {
    let mut cmd = Command::new(&interp.program);
    cmd.arg("-u") // unbuffered
        .arg("-c")
        .arg(HARNESS)
        .env("PYTHONIOENCODING", "utf-8")
        .env("PYTHONDONTWRITEBYTECODE", "1");

    super::spawn(cmd, &interp.program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_agrees_with_rust_constants() {
        assert!(HARNESS.contains(r#"SENTINEL = "\x1ebugfinder-report\x1e""#));
        assert!(HARNESS.contains(&format!("LABEL = \"{}\"", SOURCE_LABEL)));
        assert_eq!(REPORT_SENTINEL.as_bytes()[0], 0x1e);
    }

    #[test]
    fn harness_restores_stdout_before_reporting() {
        let restore = HARNESS.find("sys.stdout = real_stdout").unwrap();
        let report = HARNESS.find("os.write(1, data)").unwrap();
        assert!(restore < report);
        assert!(HARNESS.contains("except BaseException as exc"));
    }
}
