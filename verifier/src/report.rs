//! Report rendering for the verifier CLI.
//!
//! The report is rendered as line-oriented text for humans and as JSON for
//! scripting. Diagnostics for every non-pass outcome are part of the text
//! even when the overall verdict passes, so the verdict is never a black
//! box.

use crate::error::{Result, VerifyError};
use crate::outcome::VerificationReport;

/// Formats the report as human-readable lines.
#[must_use]
pub fn display_text(report: &VerificationReport) -> String {
    let mut lines = Vec::new();

    for outcome in &report.outcomes {
        lines.push(format!(
            "{:<24} {:<26} {}",
            outcome.name, outcome.outcome, outcome.detail
        ));
    }

    for warning in &report.warnings {
        lines.push(format!("warning: {warning}"));
    }

    lines.push(String::new());
    lines.push(verdict_line(report));
    lines.join("\n")
}

/// Formats the one-line verdict.
#[must_use]
pub fn verdict_line(report: &VerificationReport) -> String {
    if report.passed() {
        "PASS: toolbox verification succeeded".to_owned()
    } else {
        format!(
            "FAIL: {} binary check(s) failed",
            report.failures().len()
        )
    }
}

/// Serializes the report as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`VerifyError::WriteFailed`] when serialization fails.
pub fn to_json(report: &VerificationReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| VerifyError::WriteFailed {
        source: std::io::Error::other(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use rstest::{fixture, rstest};

    #[fixture]
    fn mixed_report() -> VerificationReport {
        let mut report = VerificationReport::default();
        report.record("zsh", Outcome::FoundStatic, "zsh 5.9");
        report.record("vim", Outcome::MissingExempted, "documented MISSING_STATIC");
        report.record("yq", Outcome::MissingRequired, "not found");
        report.warn("linkage check skipped for fzf: ldd is unavailable");
        report
    }

    #[rstest]
    fn text_lists_every_outcome(mixed_report: VerificationReport) {
        let text = display_text(&mixed_report);
        assert!(text.contains("zsh"));
        assert!(text.contains("missing-exempted"));
        assert!(text.contains("missing-required"));
        assert!(text.contains("warning: linkage check skipped"));
    }

    #[rstest]
    fn verdict_counts_failures(mixed_report: VerificationReport) {
        assert_eq!(verdict_line(&mixed_report), "FAIL: 1 binary check(s) failed");
    }

    #[test]
    fn passing_report_says_pass() {
        let mut report = VerificationReport::default();
        report.record("jq", Outcome::FoundStatic, "jq-1.7.1");
        assert!(verdict_line(&report).starts_with("PASS"));
    }

    #[rstest]
    fn json_round_trips_outcome_names(mixed_report: VerificationReport) {
        let json = to_json(&mixed_report).expect("report serializes");
        assert!(json.contains("\"missing-required\""));
        assert!(json.contains("\"warnings\""));
    }
}
