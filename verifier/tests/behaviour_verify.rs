//! BDD tests for the toolbox verification workflow.
#![cfg(unix)]

use camino::{Utf8Path, Utf8PathBuf};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::process::Output;

use muslbox_common::exec::CommandExecutor;
use muslbox_common::test_support::exit_status;
use muslbox_verifier::exceptions::{Exceptions, parse_exceptions};
use muslbox_verifier::outcome::VerificationReport;
use muslbox_verifier::verifier::{VerifyConfig, verify_with};

/// An executor that answers by command shape instead of call order:
/// identity probes get a version banner, `file` reports a static binary,
/// `ldd` reports no dynamic section.
struct WellBehavedToolbox;

impl CommandExecutor for WellBehavedToolbox {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        _cwd: Option<&Utf8Path>,
    ) -> std::io::Result<Output> {
        let stdout: &[u8] = match program {
            "file" => b"ELF 64-bit LSB executable, statically linked, stripped\n",
            "ldd" => b"\tnot a dynamic executable\n",
            _ if args.contains(&"--version") || args.contains(&"--help") => {
                b"tool 1.0 (x86_64-unknown-linux-musl)\n"
            }
            _ => b"",
        };
        Ok(Output {
            status: exit_status(0),
            stdout: stdout.to_vec(),
            stderr: Vec::new(),
        })
    }
}

fn install_binary(root: &Utf8Path, name: &str) {
    use std::os::unix::fs::PermissionsExt;

    let bin = root.join("bin");
    std::fs::create_dir_all(bin.as_std_path()).expect("create bin");
    let path = bin.join(name);
    std::fs::write(path.as_std_path(), &[0x7f, b'E', b'L', b'F']).expect("write binary");
    let mut permissions = std::fs::metadata(path.as_std_path())
        .expect("metadata")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(path.as_std_path(), permissions).expect("set permissions");
}

#[derive(Default)]
struct VerifyWorld {
    _temp_dir: Option<tempfile::TempDir>,
    install_dir: Option<Utf8PathBuf>,
    exceptions: Option<Exceptions>,
    report: Option<VerificationReport>,
}

#[fixture]
fn world() -> VerifyWorld {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let install_dir =
        Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).expect("UTF-8 path");
    VerifyWorld {
        _temp_dir: Some(temp_dir),
        install_dir: Some(install_dir),
        ..Default::default()
    }
}

#[given("a toolbox with \"{first}\", \"{second}\", and \"{third}\" installed")]
fn given_toolbox_three(world: &mut VerifyWorld, first: String, second: String, third: String) {
    let root = world.install_dir.clone().expect("install dir set");
    for name in [&first, &second, &third] {
        install_binary(&root, name);
    }
}

#[given("a toolbox with \"{first}\" and \"{second}\" installed")]
fn given_toolbox_two(world: &mut VerifyWorld, first: String, second: String) {
    let root = world.install_dir.clone().expect("install dir set");
    for name in [&first, &second] {
        install_binary(&root, name);
    }
}

#[given("no exceptions manifest")]
fn given_no_exceptions(world: &mut VerifyWorld) {
    world.exceptions = Some(Exceptions::default());
}

#[given("an exceptions manifest containing \"{line}\"")]
fn given_exceptions_line(world: &mut VerifyWorld, line: String) {
    world.exceptions = Some(parse_exceptions(&line));
}

#[when("verification runs for tool \"{tool}\"")]
fn when_verification_runs(world: &mut VerifyWorld, tool: String) {
    let install_dir = world.install_dir.clone().expect("install dir set");
    let exceptions = world.exceptions.clone().unwrap_or_default();
    let tools = vec![tool];
    let config = VerifyConfig {
        install_dir: &install_dir,
        tools: &tools,
        linkage_extras: &[],
        exceptions: &exceptions,
        quiet: true,
    };

    let mut stderr = Vec::new();
    let report =
        verify_with(&config, &WellBehavedToolbox, &mut stderr).expect("verification runs");
    world.report = Some(report);
}

#[then("the verdict is pass")]
fn then_verdict_pass(world: &mut VerifyWorld) {
    let report = world.report.as_ref().expect("verification ran");
    assert!(report.passed(), "expected pass, got {report:?}");
}

#[then("the verdict is fail")]
fn then_verdict_fail(world: &mut VerifyWorld) {
    let report = world.report.as_ref().expect("verification ran");
    assert!(!report.passed(), "expected fail, got {report:?}");
}

#[then("every outcome is \"{outcome}\"")]
fn then_every_outcome_is(world: &mut VerifyWorld, outcome: String) {
    let report = world.report.as_ref().expect("verification ran");
    assert!(!report.outcomes.is_empty());
    for recorded in &report.outcomes {
        assert_eq!(
            recorded.outcome.to_string(),
            outcome,
            "unexpected outcome for {}",
            recorded.name
        );
    }
}

#[then("the outcome for \"{name}\" is \"{outcome}\"")]
fn then_outcome_for(world: &mut VerifyWorld, name: String, outcome: String) {
    let report = world.report.as_ref().expect("verification ran");
    let recorded = report
        .outcomes
        .iter()
        .find(|o| o.name == name)
        .unwrap_or_else(|| panic!("no outcome recorded for {name}"));
    assert_eq!(recorded.outcome.to_string(), outcome);
}

#[scenario(path = "tests/features/verify.feature", index = 0)]
fn scenario_complete_static_toolbox_passes(world: VerifyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/verify.feature", index = 1)]
fn scenario_missing_tool_fails(world: VerifyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/verify.feature", index = 2)]
fn scenario_documented_missing_editor(world: VerifyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/verify.feature", index = 3)]
fn scenario_documented_dynamic_binary(world: VerifyWorld) {
    let _ = world;
}
