//! muslbox verifier CLI entrypoint.
//!
//! This binary inspects an installed toolbox and reports whether every
//! declared binary is present, executable, and statically linked unless a
//! documented exception applies. Exit code 0 means a full pass (degraded
//! warnings included); any missing required binary or unexempted dynamic
//! linkage exits non-zero.

use clap::Parser;
use std::io::Write;

use muslbox_common::output::write_stderr_line;
use muslbox_verifier::cli::{Cli, EXCEPTIONS_MANIFEST, default_install_dir};
use muslbox_verifier::error::{Result, VerifyError};
use muslbox_verifier::exceptions::load_exceptions;
use muslbox_verifier::report::{display_text, to_json};
use muslbox_verifier::toolset::resolve_tools;
use muslbox_verifier::verifier::{VerifyConfig, verify};

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let mut stdout = std::io::stdout();
    let exit_code = match run(&cli, &mut stdout, &mut stderr) {
        Ok(passed) => i32::from(!passed),
        Err(err) => {
            write_stderr_line(&mut stderr, err);
            2
        }
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Runs the verification and renders the report.
///
/// Returns the overall verdict; environment failures are errors.
fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<bool> {
    let install_dir = cli
        .install_dir
        .clone()
        .or_else(default_install_dir)
        .ok_or_else(|| VerifyError::InstallDirMissing {
            path: camino::Utf8PathBuf::from("~"),
        })?;

    let manifest_path = cli
        .exceptions
        .clone()
        .unwrap_or_else(|| install_dir.join(EXCEPTIONS_MANIFEST));
    let exceptions = load_exceptions(&manifest_path)?;

    let tools = resolve_tools(&cli.tool);
    let config = VerifyConfig {
        install_dir: &install_dir,
        tools: &tools,
        linkage_extras: &cli.linkage_extras,
        exceptions: &exceptions,
        quiet: cli.quiet,
    };

    let report = verify(&config, stderr)?;

    let rendered = if cli.json {
        to_json(&report)?
    } else {
        display_text(&report)
    };
    writeln!(stdout, "{rendered}").map_err(|source| VerifyError::WriteFailed { source })?;

    Ok(report.passed())
}
