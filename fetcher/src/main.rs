//! muslbox fetcher CLI entrypoint.
//!
//! This binary resolves and downloads statically linked release archives
//! into a destination directory, either one package at a time or as a
//! batch for an image build.

use clap::Parser;
use std::io::Write;

use muslbox_common::output::write_stderr_line;
use muslbox_fetcher::batch::{BatchConfig, parse_package_list, run_batch};
use muslbox_fetcher::cli::{Cli, Command, FetchArgs, default_destination};
use muslbox_fetcher::error::{FetchError, Result};
use muslbox_fetcher::resolver::{ResolveConfig, resolve};
use muslbox_fetcher::source::PackageSpec;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Some(Command::Batch(args)) => run_batch_command(args, stderr),
        Some(Command::Fetch(_)) | None => run_fetch(cli.fetch_args(), stderr),
    }
}

/// Fetches a single package into the destination directory.
fn run_fetch(args: &FetchArgs, stderr: &mut dyn Write) -> Result<()> {
    let source = args.source.as_deref().ok_or(FetchError::InvalidSourceId {
        value: String::new(),
    })?;
    let spec = PackageSpec::new(source, args.arch.as_deref())?;

    let destination = args
        .dest
        .clone()
        .or_else(default_destination)
        .ok_or_else(|| FetchError::DestinationCreate {
            path: camino::Utf8PathBuf::from("~"),
            reason: "could not determine default destination directory".to_owned(),
        })?;

    let config = ResolveConfig {
        spec: &spec,
        destination: &destination,
        quiet: args.quiet,
    };
    let result = resolve(&config, stderr)?;

    if !args.quiet {
        write_stderr_line(
            stderr,
            format!(
                "Install complete: {} file(s) ({} executable) in {destination}",
                result.files.len(),
                result.executables().len()
            ),
        );
    }
    Ok(())
}

/// Fetches a package list; per-package failures are reported but never
/// fail the run.
fn run_batch_command(
    args: &muslbox_fetcher::cli::BatchArgs,
    stderr: &mut dyn Write,
) -> Result<()> {
    let packages = parse_package_list(&args.packages)?;
    if packages.is_empty() {
        return Err(FetchError::InvalidPackageList {
            path: camino::Utf8PathBuf::from(args.packages.clone()),
            reason: "no packages specified".to_owned(),
        });
    }

    let config = BatchConfig {
        packages: &packages,
        architecture: muslbox_fetcher::arch::Architecture::from_target_arch(&args.target_arch),
        output_dir: &args.output_dir,
        quiet: args.quiet,
    };

    let summary = run_batch(&config, stderr)?;
    if !summary.all_fetched() {
        write_stderr_line(
            stderr,
            format!("FAILED_FETCHES: {}", summary.failures.join(",")),
        );
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
