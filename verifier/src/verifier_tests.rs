//! Unit tests for the verification pipeline.
#![cfg(unix)]

use super::*;
use crate::exceptions::parse_exceptions;
use camino::Utf8PathBuf;
use muslbox_common::test_support::{QueuedExecutor, StubResponse};
use rstest::rstest;

const STATIC_FILE_OUTPUT: &str = "ELF 64-bit LSB executable, statically linked, stripped\n";

fn install_tree(bin_names: &[&str], editor_subtree_names: &[&str]) -> (tempfile::TempDir, Utf8PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");

    for (dir, names) in [("bin", bin_names), (EDITOR_SUBTREE, editor_subtree_names)] {
        let dir_path = root.join(dir);
        std::fs::create_dir_all(dir_path.as_std_path()).expect("create dir");
        for name in names {
            let path = dir_path.join(name);
            std::fs::write(path.as_std_path(), &[0x7f, b'E', b'L', b'F']).expect("write binary");
            let mut permissions = std::fs::metadata(path.as_std_path())
                .expect("metadata")
                .permissions();
            permissions.set_mode(0o755);
            std::fs::set_permissions(path.as_std_path(), permissions).expect("set permissions");
        }
    }

    (temp, root)
}

fn run_verify(
    install_dir: &Utf8Path,
    tools: &[&str],
    exceptions_content: &str,
    responses: Vec<StubResponse>,
) -> Result<VerificationReport> {
    let tools: Vec<String> = tools.iter().map(|&t| t.to_owned()).collect();
    let exceptions = parse_exceptions(exceptions_content);
    let config = VerifyConfig {
        install_dir,
        tools: &tools,
        linkage_extras: &[],
        exceptions: &exceptions,
        quiet: true,
    };
    let executor = QueuedExecutor::new(responses);
    let mut stderr = Vec::new();
    verify_with(&config, &executor, &mut stderr)
}

fn outcome_of<'a>(report: &'a VerificationReport, name: &str) -> &'a crate::outcome::BinaryOutcome {
    report
        .outcomes
        .iter()
        .find(|o| o.name == name)
        .unwrap_or_else(|| panic!("no outcome recorded for {name}"))
}

#[test]
fn all_present_and_static_passes() {
    let (_temp, root) = install_tree(&["zsh", "vim", "jq"], &[]);
    let responses = vec![
        // zsh: probe, then linkage via file.
        StubResponse::ok("zsh 5.9 (x86_64-unknown-linux-musl)\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        // vim: probe, then linkage via file.
        StubResponse::ok("VIM - Vi IMproved 9.0\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        // jq: probe only, not a linkage candidate.
        StubResponse::ok("jq-1.7.1\n"),
    ];

    let report = run_verify(&root, &["jq"], "", responses).expect("verification runs");

    assert!(report.passed());
    assert_eq!(report.outcomes.len(), 3);
    for name in ["zsh", "vim", "jq"] {
        assert_eq!(outcome_of(&report, name).outcome, Outcome::FoundStatic);
    }
    assert_eq!(outcome_of(&report, "jq").detail, "jq-1.7.1");
}

#[test]
fn missing_tool_without_exception_fails() {
    let (_temp, root) = install_tree(&["zsh", "vim"], &[]);
    let responses = vec![
        StubResponse::ok("zsh 5.9\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        StubResponse::ok("VIM - Vi IMproved 9.0\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        // yq is absent: no probe happens.
    ];

    let report = run_verify(&root, &["yq"], "", responses).expect("verification runs");

    assert!(!report.passed());
    let yq = outcome_of(&report, "yq");
    assert_eq!(yq.outcome, Outcome::MissingRequired);
}

#[test]
fn missing_editor_with_exception_is_exempted() {
    let (_temp, root) = install_tree(&["zsh", "jq"], &[]);
    let responses = vec![
        StubResponse::ok("zsh 5.9\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        // vim is absent in both locations: no probe.
        StubResponse::ok("jq-1.7.1\n"),
    ];

    let report = run_verify(&root, &["jq"], "vim:9.0:MISSING_STATIC\n", responses)
        .expect("verification runs");

    assert!(report.passed());
    assert_eq!(outcome_of(&report, "vim").outcome, Outcome::MissingExempted);
}

#[test]
fn missing_shell_fails_even_with_an_exception() {
    let (_temp, root) = install_tree(&["vim"], &[]);
    let responses = vec![
        // zsh absent: no probe. vim: probe + file.
        StubResponse::ok("VIM - Vi IMproved 9.0\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
    ];

    let report = run_verify(&root, &[], "zsh:5.9:MISSING_STATIC\n", responses)
        .expect("verification runs");

    assert!(!report.passed());
    assert_eq!(outcome_of(&report, "zsh").outcome, Outcome::MissingRequired);
    // The rest of the toolbox was still inspected.
    assert_eq!(outcome_of(&report, "vim").outcome, Outcome::FoundStatic);
}

#[test]
fn editor_is_found_in_its_own_subtree() {
    let (_temp, root) = install_tree(&["zsh"], &["vim"]);
    let responses = vec![
        StubResponse::ok("zsh 5.9\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        StubResponse::ok("VIM - Vi IMproved 9.0\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
    ];

    let report = run_verify(&root, &[], "", responses).expect("verification runs");

    assert!(report.passed());
    assert_eq!(outcome_of(&report, "vim").outcome, Outcome::FoundStatic);
}

#[test]
fn unexempted_dynamic_linkage_fails() {
    let (_temp, root) = install_tree(&["zsh", "vim", "tmux"], &[]);
    let responses = vec![
        StubResponse::ok("zsh 5.9\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        StubResponse::ok("VIM - Vi IMproved 9.0\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        // tmux: probe, inconclusive file, ldd with resolved deps.
        StubResponse::ok("tmux 3.4\n"),
        StubResponse::ok("ELF 64-bit LSB executable, dynamically linked\n"),
        StubResponse::ok("\tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f00)\n"),
    ];

    let report = run_verify(&root, &["tmux"], "", responses).expect("verification runs");

    assert!(!report.passed());
    let tmux = outcome_of(&report, "tmux");
    assert_eq!(tmux.outcome, Outcome::FoundDynamicUnexempted);
    assert!(tmux.detail.contains("libc.so.6"));
}

#[test]
fn documented_dynamic_linkage_is_exempted_without_inspection() {
    let (_temp, root) = install_tree(&["zsh", "vim", "tmux"], &[]);
    let responses = vec![
        StubResponse::ok("zsh 5.9\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        StubResponse::ok("VIM - Vi IMproved 9.0\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        // tmux: probe only; the exception short-circuits inspection.
        StubResponse::ok("tmux 3.4\n"),
    ];

    let report = run_verify(&root, &["tmux"], "tmux:3.4:NOT_STATIC\n", responses)
        .expect("verification runs");

    assert!(report.passed());
    assert_eq!(
        outcome_of(&report, "tmux").outcome,
        Outcome::FoundDynamicExempted
    );
}

#[test]
fn unavailable_inspection_tools_degrade_to_a_warned_pass() {
    let (_temp, root) = install_tree(&["zsh", "vim"], &[]);
    let responses = vec![
        StubResponse::ok("zsh 5.9\n"),
        // file and ldd are exhausted: both spawn errors.
    ];

    let report = run_verify(&root, &[], "vim:9.0:MISSING_STATIC\n", responses)
        .expect("verification runs");

    // vim's probe also hit the exhausted queue: fallback identity.
    assert_eq!(outcome_of(&report, "vim").detail, "OK");
    assert_eq!(outcome_of(&report, "zsh").outcome, Outcome::FoundStatic);
    assert!(report.passed());
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("linkage check skipped for zsh"))
    );
}

#[test]
fn missing_install_dir_is_an_error() {
    let config_dir = Utf8PathBuf::from("/nonexistent/toolbox");
    let result = run_verify(&config_dir, &[], "", Vec::new());
    assert!(matches!(result, Err(VerifyError::InstallDirMissing { .. })));
}

#[test]
fn manifest_warnings_surface_in_the_report() {
    let (_temp, root) = install_tree(&["zsh", "vim"], &[]);
    let responses = vec![
        StubResponse::ok("zsh 5.9\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
        StubResponse::ok("VIM - Vi IMproved 9.0\n"),
        StubResponse::ok(STATIC_FILE_OUTPUT),
    ];

    let report = run_verify(&root, &[], "garbled line\n", responses).expect("verification runs");

    assert!(report.passed());
    assert!(report.warnings.iter().any(|w| w.contains("malformed")));
}

#[rstest]
#[case::default_tools(&[][..])]
#[case::explicit(&["jq", "yq"][..])]
fn every_binary_appears_exactly_once(#[case] tools: &[&str]) {
    let (_temp, root) = install_tree(&[], &[]);
    // Everything is missing; no probes run, so no responses needed.
    let report = run_verify(&root, tools, "", Vec::new()).expect("verification runs");

    let mut names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total, "duplicate outcome recorded");
}
