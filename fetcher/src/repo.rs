//! Secondary source: the soar package repository.
//!
//! When no release asset matches, the source id is retried as a plain
//! package name against the `soar` package manager, which is assumed to be
//! architecture-correct for the running host (no name filtering applied).
//! soar sometimes exits 0 after failing, so its diagnostic text is scanned
//! for failure markers instead of trusting the exit status alone.

use crate::source::SourceId;
use camino::Utf8Path;
use muslbox_common::exec::{CommandExecutor, combined_output};

/// Diagnostic substrings that mark a failed soar download regardless of
/// exit status.
pub const FAILURE_MARKERS: &[&str] = &["[ERROR]", "Invalid download resource"];

/// The outcome of a fallback fetch attempt.
///
/// Deliberately not a `Result`: an unavailable package is an expected
/// branch of the resolution pipeline, not an error to propagate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// The package repository reported a completed download.
    Fetched,
    /// The package is not available from this repository.
    Unavailable {
        /// Diagnostic text explaining the failed attempt.
        reason: String,
    },
}

/// Trait for the architecture-agnostic fallback package repository.
pub trait PackageRepo {
    /// Attempts to fetch `package` into `dest`.
    fn fetch(&self, package: &SourceId, dest: &Utf8Path) -> RepoOutcome;
}

/// Fallback repository backed by the `soar` CLI.
pub struct SoarRepo<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> SoarRepo<'a> {
    /// Creates a repository that invokes soar through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }
}

impl PackageRepo for SoarRepo<'_> {
    fn fetch(&self, package: &SourceId, dest: &Utf8Path) -> RepoOutcome {
        let result = self
            .executor
            .run("soar", &["dl", package.as_str(), "-y"], Some(dest));

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                return RepoOutcome::Unavailable {
                    reason: format!("failed to run soar: {e}"),
                };
            }
        };

        let text = combined_output(&output);
        log::trace!("soar dl {package}: {text}");

        if !output.status.success() {
            return RepoOutcome::Unavailable {
                reason: format!(
                    "soar exited with {}",
                    output.status.code().unwrap_or(-1)
                ),
            };
        }

        if let Some(marker) = FAILURE_MARKERS.iter().find(|m| text.contains(**m)) {
            // Exit status 0 with an error tag in the output still counts
            // as a failure.
            return RepoOutcome::Unavailable {
                reason: format!("soar reported {marker:?}"),
            };
        }

        RepoOutcome::Fetched
    }
}
