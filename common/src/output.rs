//! Progress and diagnostic output helpers.
//!
//! Both tools report progress on stderr so stdout stays reserved for
//! machine-readable output. Writes are best-effort: a closed stderr must
//! never abort an otherwise healthy run.

use std::io::Write;
use std::process::Output;

/// Writes a single line to the given stderr writer, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Extracts a trimmed stderr message from a command output.
///
/// Returns `"unknown error"` when the command produced no stderr text, so
/// error variants always carry something readable.
#[must_use]
pub fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "unknown error".to_owned()
    } else {
        trimmed.to_owned()
    }
}
