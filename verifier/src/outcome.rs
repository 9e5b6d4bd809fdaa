//! Verification outcomes and the aggregated report.
//!
//! Every expected binary lands in the report exactly once, whatever order
//! the directories were searched in. The overall verdict derives from the
//! outcomes: any missing required binary or unexempted dynamic linkage
//! fails the run; exemptions and degraded-mode warnings do not.

use serde::Serialize;
use std::fmt;

/// The per-binary verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Present, executable, and not known to be dynamically linked.
    FoundStatic,
    /// Present and dynamically linked, covered by a documented exception.
    FoundDynamicExempted,
    /// Present and dynamically linked with no exception: a failure.
    FoundDynamicUnexempted,
    /// Absent with no exception: a failure.
    MissingRequired,
    /// Absent but documented as permitted to be missing.
    MissingExempted,
}

impl Outcome {
    /// Whether this outcome fails the overall verdict.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::FoundDynamicUnexempted | Self::MissingRequired)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FoundStatic => "found-static",
            Self::FoundDynamicExempted => "found-dynamic-exempted",
            Self::FoundDynamicUnexempted => "found-dynamic-unexempted",
            Self::MissingRequired => "missing-required",
            Self::MissingExempted => "missing-exempted",
        };
        write!(f, "{text}")
    }
}

/// One binary's verification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryOutcome {
    /// Basename of the binary.
    pub name: String,
    /// What verification concluded.
    pub outcome: Outcome,
    /// Identity string, exception note, or linkage detail.
    pub detail: String,
}

/// The aggregated verification report.
///
/// Created fresh per run and never persisted by the verifier itself; the
/// CLI renders it to text or JSON.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    /// Per-binary outcomes in inspection order, one entry per binary.
    pub outcomes: Vec<BinaryOutcome>,
    /// Diagnostic warnings (degraded-mode checks, manifest issues).
    pub warnings: Vec<String>,
}

impl VerificationReport {
    /// Records an outcome for a binary.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the binary was already recorded; each
    /// name appears in the report exactly once.
    pub fn record(&mut self, name: &str, outcome: Outcome, detail: impl Into<String>) {
        debug_assert!(
            self.outcomes.iter().all(|o| o.name != name),
            "{name} recorded twice"
        );
        self.outcomes.push(BinaryOutcome {
            name: name.to_owned(),
            outcome,
            detail: detail.into(),
        });
    }

    /// Adds a diagnostic warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// The overall verdict: true when nothing failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.outcomes.iter().any(|o| o.outcome.is_failure())
    }

    /// Returns the outcomes that fail the verdict.
    #[must_use]
    pub fn failures(&self) -> Vec<&BinaryOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_failure())
            .collect()
    }
}
