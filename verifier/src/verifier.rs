//! The verification pipeline.
//!
//! Walks the declared tool set in order, locating each binary, probing its
//! identity, and checking static linkage where required. Findings
//! accumulate: one failing binary never stops inspection of the rest, and
//! the report carries every outcome plus any degraded-mode warnings.

use camino::Utf8Path;
use std::io::Write;
use std::time::Duration;

use crate::error::{Result, VerifyError};
use crate::exceptions::{Exceptions, ReasonTag};
use crate::linkage::{LinkageStatus, inspect_linkage};
use crate::locate::SearchPath;
use crate::outcome::{Outcome, VerificationReport};
use crate::probe::probe_identity;
use crate::toolset::{EDITOR_BINARY, EDITOR_SUBTREE, SHELL_BINARY, is_linkage_candidate};
use muslbox_common::exec::{CommandExecutor, TimedExecutor};
use muslbox_common::output::write_stderr_line;

/// Timeout for version probes and linkage inspection commands.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for one verification run.
#[derive(Debug)]
pub struct VerifyConfig<'a> {
    /// Root of the installed toolbox.
    pub install_dir: &'a Utf8Path,
    /// Tools for the generic loop (shell and editor excluded).
    pub tools: &'a [String],
    /// Extra binaries to include in the static-linkage check.
    pub linkage_extras: &'a [String],
    /// Documented exceptions, loaded once before the run.
    pub exceptions: &'a Exceptions,
    /// When true, suppress per-binary progress output.
    pub quiet: bool,
}

/// Verifies an installed toolbox using timeout-bounded real commands.
///
/// # Errors
///
/// Returns [`VerifyError::InstallDirMissing`] when the install directory
/// does not exist. Verification findings are reported in the returned
/// [`VerificationReport`], never as errors.
pub fn verify(config: &VerifyConfig<'_>, stderr: &mut dyn Write) -> Result<VerificationReport> {
    let executor = TimedExecutor::new(PROBE_TIMEOUT);
    verify_with(config, &executor, stderr)
}

/// Testable verification pipeline with an injected executor.
///
/// The production entry point [`verify`] delegates here; tests inject
/// stub executors so no real binaries run.
pub fn verify_with(
    config: &VerifyConfig<'_>,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<VerificationReport> {
    if !config.install_dir.is_dir() {
        return Err(VerifyError::InstallDirMissing {
            path: config.install_dir.to_owned(),
        });
    }

    let primary = SearchPath::new(vec![config.install_dir.join("bin")]);
    let editor_path = SearchPath::new(vec![
        config.install_dir.join("bin"),
        config.install_dir.join(EDITOR_SUBTREE),
    ]);

    let mut report = VerificationReport::default();
    for warning in &config.exceptions.warnings {
        report.warn(warning.clone());
    }

    // The shell is required unconditionally: no exception tag can excuse
    // a toolbox without its login shell.
    check_binary(
        config,
        executor,
        &primary,
        SHELL_BINARY,
        MissingPolicy::Required,
        &mut report,
        stderr,
    );

    check_binary(
        config,
        executor,
        &editor_path,
        EDITOR_BINARY,
        MissingPolicy::Exemptable,
        &mut report,
        stderr,
    );

    for name in config.tools {
        check_binary(
            config,
            executor,
            &primary,
            name,
            MissingPolicy::Exemptable,
            &mut report,
            stderr,
        );
    }

    // Exceptions are echoed even on success so the verdict is auditable.
    for record in config.exceptions.records() {
        if !config.quiet {
            write_stderr_line(
                stderr,
                format!(
                    "exception: {} {} ({})",
                    record.binary_name, record.version, record.reason
                ),
            );
        }
    }

    Ok(report)
}

/// Whether a missing binary can be excused by an exception record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingPolicy {
    /// Missing is always a failure.
    Required,
    /// Missing is excused by an `AllowedMissing` exception.
    Exemptable,
}

/// Runs the full check for one binary and records exactly one outcome.
fn check_binary(
    config: &VerifyConfig<'_>,
    executor: &dyn CommandExecutor,
    search: &SearchPath,
    name: &str,
    policy: MissingPolicy,
    report: &mut VerificationReport,
    stderr: &mut dyn Write,
) {
    let Some(path) = search.locate(name) else {
        record_missing(config, name, policy, report, stderr);
        return;
    };

    let identity = probe_identity(executor, &path, name);

    if !is_linkage_candidate(name, config.linkage_extras) {
        progress(config, stderr, format!("ok {name} ({identity})"));
        report.record(name, Outcome::FoundStatic, identity);
        return;
    }

    if let Some(record) = config.exceptions.get(name) {
        if record.reason == ReasonTag::KnownDynamic {
            progress(
                config,
                stderr,
                format!("ok {name} ({identity}) dynamic, documented"),
            );
            report.record(
                name,
                Outcome::FoundDynamicExempted,
                format!("{identity}; documented {}", record.reason),
            );
            return;
        }
    }

    match inspect_linkage(executor, &path) {
        LinkageStatus::Static => {
            progress(config, stderr, format!("ok {name} ({identity}) static"));
            report.record(name, Outcome::FoundStatic, identity);
        }
        LinkageStatus::Dynamic { detail } => {
            progress(
                config,
                stderr,
                format!("FAIL {name}: dynamically linked ({detail})"),
            );
            report.record(
                name,
                Outcome::FoundDynamicUnexempted,
                format!("{identity}; {detail}"),
            );
        }
        LinkageStatus::Unknown { reason } => {
            // Degraded mode: the check could not run, which must be
            // surfaced rather than passing silently.
            progress(
                config,
                stderr,
                format!("warn {name}: linkage check skipped ({reason})"),
            );
            report.warn(format!("linkage check skipped for {name}: {reason}"));
            report.record(name, Outcome::FoundStatic, identity);
        }
    }
}

/// Records the outcome for a binary that was not found anywhere.
fn record_missing(
    config: &VerifyConfig<'_>,
    name: &str,
    policy: MissingPolicy,
    report: &mut VerificationReport,
    stderr: &mut dyn Write,
) {
    let exempt = policy == MissingPolicy::Exemptable
        && config.exceptions.has_tag(name, ReasonTag::AllowedMissing);

    if exempt {
        progress(config, stderr, format!("skip {name}: missing, documented"));
        report.record(
            name,
            Outcome::MissingExempted,
            format!("documented {}", ReasonTag::AllowedMissing),
        );
    } else {
        progress(config, stderr, format!("FAIL {name}: not found"));
        report.record(name, Outcome::MissingRequired, "not found");
    }
}

fn progress(config: &VerifyConfig<'_>, stderr: &mut dyn Write, message: String) {
    if !config.quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "verifier_tests.rs"]
mod tests;
