//! Identity probing of installed binaries.
//!
//! Most tools report themselves with a version flag and the first output
//! line is taken as the identity string. busybox is the documented special
//! case: it has no version flag, so its help banner stands in. Presence
//! and executability are the load-bearing checks; a probe that fails or
//! prints nothing falls back to a fixed placeholder instead of failing
//! verification.

use camino::Utf8Path;
use muslbox_common::exec::CommandExecutor;

/// Identity used when a probe fails or produces no output.
pub const IDENTITY_FALLBACK: &str = "OK";

/// Binaries probed with a help flag because they have no version flag.
const HELP_PROBED: &[&str] = &["busybox"];

/// The flag used to probe a binary's identity.
#[must_use]
pub fn identity_flag(binary_name: &str) -> &'static str {
    if HELP_PROBED.contains(&binary_name) {
        "--help"
    } else {
        "--version"
    }
}

/// Probes a binary for its identity string.
///
/// Runs the binary with its probe flag and returns the first non-empty
/// output line (stdout preferred, stderr as a fallback since several tools
/// print their banner there). Invocation failures, timeouts, and empty
/// output all yield [`IDENTITY_FALLBACK`].
#[must_use]
pub fn probe_identity(
    executor: &dyn CommandExecutor,
    binary_path: &Utf8Path,
    binary_name: &str,
) -> String {
    let flag = identity_flag(binary_name);
    let Ok(output) = executor.run(binary_path.as_str(), &[flag], None) else {
        return IDENTITY_FALLBACK.to_owned();
    };

    first_line(&output.stdout)
        .or_else(|| first_line(&output.stderr))
        .unwrap_or_else(|| IDENTITY_FALLBACK.to_owned())
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use muslbox_common::test_support::{QueuedExecutor, StubResponse};
    use rstest::rstest;

    fn probe_with(response: Option<StubResponse>, name: &str) -> (String, Vec<String>) {
        let executor = QueuedExecutor::new(response.into_iter().collect());
        let path = Utf8PathBuf::from("/opt/toolbox/bin").join(name);
        let identity = probe_identity(&executor, &path, name);
        let flags = executor
            .calls()
            .into_iter()
            .flat_map(|call| call.args)
            .collect();
        (identity, flags)
    }

    #[test]
    fn takes_the_first_stdout_line() {
        let (identity, flags) = probe_with(
            Some(StubResponse::ok("jq-1.7.1\nextra detail\n")),
            "jq",
        );
        assert_eq!(identity, "jq-1.7.1");
        assert_eq!(flags, vec!["--version"]);
    }

    #[test]
    fn busybox_is_probed_with_help() {
        let (identity, flags) = probe_with(
            Some(StubResponse::ok(
                "BusyBox v1.36.1 (2024-06-10) multi-call binary.\nUsage: busybox [function]\n",
            )),
            "busybox",
        );
        assert!(identity.starts_with("BusyBox v1.36.1"));
        assert_eq!(flags, vec!["--help"]);
    }

    #[test]
    fn stderr_banner_is_accepted_when_stdout_is_empty() {
        let (identity, _) = probe_with(Some(StubResponse::err(0, "tool 2.3\n")), "tool");
        assert_eq!(identity, "tool 2.3");
    }

    #[rstest]
    #[case::empty_output(Some(StubResponse::ok("")))]
    #[case::whitespace_only(Some(StubResponse::ok("  \n\n")))]
    #[case::spawn_failure(None)]
    fn fallback_identity_when_probe_yields_nothing(#[case] response: Option<StubResponse>) {
        let (identity, _) = probe_with(response, "jq");
        assert_eq!(identity, IDENTITY_FALLBACK);
    }

    #[rstest]
    #[case::regular("jq", "--version")]
    #[case::special_case("busybox", "--help")]
    fn flag_selection(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(identity_flag(name), expected);
    }
}
