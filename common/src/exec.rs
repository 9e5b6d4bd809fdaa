//! Command execution abstraction.
//!
//! Both the fetcher (package-repository fallback) and the verifier (version
//! probes, linkage inspection) shell out to external tools. This module
//! provides the trait they program against, the production implementation,
//! and a timeout-bounded runner for commands that must not hang.

use camino::Utf8Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Abstraction for running external commands.
///
/// Implementations capture stdout, stderr, and the exit status. The
/// production implementation is [`SystemCommandExecutor`]; test suites
/// substitute stubs so no real processes are spawned.
pub trait CommandExecutor {
    /// Runs a command with arguments, optionally in a working directory,
    /// and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the
    /// command (for example, the program not being present on the host).
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Utf8Path>)
    -> std::io::Result<Output>;
}

/// Executes commands on the host system.
///
/// # Examples
///
/// ```no_run
/// use muslbox_common::exec::{CommandExecutor, SystemCommandExecutor};
///
/// let executor = SystemCommandExecutor;
/// let output = executor.run("uname", &["-m"], None)?;
/// assert!(output.status.success());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Utf8Path>,
    ) -> std::io::Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir.as_std_path());
        }
        cmd.output()
    }
}

/// Runs a command with a timeout, killing the child if it expires.
///
/// Returns `Ok(Some(output))` on completion within the timeout,
/// `Ok(None)` if the command timed out (the child is killed and reaped),
/// or an error if the command could not be spawned.
///
/// # Errors
///
/// Returns any I/O errors encountered while spawning the command or
/// collecting its output.
pub fn run_with_timeout(
    program: &str,
    args: &[&str],
    cwd: Option<&Utf8Path>,
    timeout: Duration,
) -> std::io::Result<Option<Output>> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = cwd {
        cmd.current_dir(dir.as_std_path());
    }

    let mut child = cmd.spawn()?;

    match child.wait_timeout(timeout)? {
        Some(status) => {
            let stdout = child
                .stdout
                .take()
                .map(std::io::read_to_string)
                .transpose()?
                .unwrap_or_default();
            let stderr = child
                .stderr
                .take()
                .map(std::io::read_to_string)
                .transpose()?
                .unwrap_or_default();

            Ok(Some(Output {
                status,
                stdout: stdout.into_bytes(),
                stderr: stderr.into_bytes(),
            }))
        }
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Ok(None)
        }
    }
}

/// A [`CommandExecutor`] that bounds every invocation with a timeout.
///
/// A command that outlives the timeout is killed and reported as a
/// `TimedOut` I/O error, so callers treat it exactly like any other
/// invocation failure.
#[derive(Debug, Clone, Copy)]
pub struct TimedExecutor {
    timeout: Duration,
}

impl TimedExecutor {
    /// Creates an executor whose invocations are bounded by `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandExecutor for TimedExecutor {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Utf8Path>,
    ) -> std::io::Result<Output> {
        run_with_timeout(program, args, cwd, self.timeout)?.ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("{program} timed out after {}s", self.timeout.as_secs()),
            )
        })
    }
}

/// Combines a command's stdout and stderr into one lossy string.
///
/// Failure markers can appear on either stream, so callers scanning
/// diagnostic text need both.
#[must_use]
pub fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
