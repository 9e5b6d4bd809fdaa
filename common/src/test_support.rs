//! Command stubs for test suites.
//!
//! [`QueuedExecutor`] lets tests script the outputs of external commands so
//! fetcher and verifier pipelines can be exercised without spawning real
//! processes. Unix-only: fabricating an [`std::process::ExitStatus`]
//! requires the platform wait-status extension.

use crate::exec::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::Output;

/// A scripted response for one command invocation.
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// Exit code the stubbed command reports.
    pub code: i32,
    /// Bytes written to stdout.
    pub stdout: Vec<u8>,
    /// Bytes written to stderr.
    pub stderr: Vec<u8>,
}

impl StubResponse {
    /// A successful invocation with the given stdout text.
    #[must_use]
    pub fn ok(stdout: &str) -> Self {
        Self {
            code: 0,
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    /// A failing invocation with the given exit code and stderr text.
    #[must_use]
    pub fn err(code: i32, stderr: &str) -> Self {
        Self {
            code,
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }
}

/// A recorded invocation: program, arguments, and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program name as invoked.
    pub program: String,
    /// Arguments as invoked.
    pub args: Vec<String>,
    /// Working directory, when one was requested.
    pub cwd: Option<Utf8PathBuf>,
}

/// A [`CommandExecutor`] that replays queued responses in FIFO order.
///
/// Invocations beyond the queued responses produce a `NotFound` I/O error,
/// mimicking a program that is absent from the host.
#[derive(Debug, Default)]
pub struct QueuedExecutor {
    responses: RefCell<VecDeque<StubResponse>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl QueuedExecutor {
    /// Creates an executor that will replay `responses` in order.
    #[must_use]
    pub fn new(responses: Vec<StubResponse>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Returns the invocations observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl CommandExecutor for QueuedExecutor {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Utf8Path>,
    ) -> std::io::Result<Output> {
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_owned(),
            args: args.iter().map(|&a| a.to_owned()).collect(),
            cwd: cwd.map(Utf8Path::to_owned),
        });

        let response = self.responses.borrow_mut().pop_front().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no stubbed response for {program}"),
            )
        })?;

        Ok(Output {
            status: exit_status(response.code),
            stdout: response.stdout,
            stderr: response.stderr,
        })
    }
}

/// Fabricates an [`std::process::ExitStatus`] for the given exit code.
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}
