//! Batch fetching for the toolbox image build.
//!
//! Fetches a whole package list, organizes the downloaded binaries and
//! scripts into an output `bin/` directory, and records failures without
//! failing the build: a missing optional tool costs a log line, not the
//! image.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

use crate::arch::Architecture;
use crate::archive::{ArchiveExtractor, FileKind, TarExtractor, classify, force_executable};
use crate::error::{FetchError, Result};
use crate::release::{GithubReleaseSource, ReleaseSource};
use crate::repo::{PackageRepo, SoarRepo};
use crate::resolver::{ResolveConfig, resolve_with};
use crate::source::{PackageSpec, SourceId};
use muslbox_common::exec::TimedExecutor;
use muslbox_common::output::write_stderr_line;

/// Name of the failure log written next to the output bin directory.
pub const FAILED_FETCHES_FILE: &str = "FAILED_FETCHES.txt";

/// Configuration for a batch fetch run.
#[derive(Debug)]
pub struct BatchConfig<'a> {
    /// Package identifiers to fetch, in input order.
    pub packages: &'a [String],
    /// Architecture every package is fetched for.
    pub architecture: Architecture,
    /// Output directory; binaries land in `<output>/bin`.
    pub output_dir: &'a Utf8Path,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// What a batch run accomplished.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Basenames copied into the output bin directory.
    pub installed: Vec<String>,
    /// Package identifiers that could not be fetched.
    pub failures: Vec<String>,
}

impl BatchSummary {
    /// Returns true when every package was fetched.
    #[must_use]
    pub fn all_fetched(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parses a package list argument.
///
/// The argument is either an inline whitespace-separated list, a path to a
/// text file with one package per line, or a path to a JSON file holding
/// `{"packages": [...]}` or a bare array.
///
/// # Errors
///
/// Returns [`FetchError::InvalidPackageList`] when a JSON file cannot be
/// parsed into either accepted shape.
pub fn parse_package_list(argument: &str) -> Result<Vec<String>> {
    let path = Utf8Path::new(argument);
    if !path.is_file() {
        return Ok(argument.split_whitespace().map(str::to_owned).collect());
    }

    let content = std::fs::read_to_string(path.as_std_path())?;
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return parse_json_packages(path, &content);
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// JSON package-list shapes: an object with a `packages` array, or a bare
/// array of names.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PackageListDocument {
    Wrapped {
        packages: Vec<String>,
    },
    Bare(Vec<String>),
}

fn parse_json_packages(path: &Utf8Path, content: &str) -> Result<Vec<String>> {
    let document: PackageListDocument =
        serde_json::from_str(content).map_err(|e| FetchError::InvalidPackageList {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    let packages = match document {
        PackageListDocument::Wrapped { packages } | PackageListDocument::Bare(packages) => packages,
    };
    Ok(packages
        .into_iter()
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
        .collect())
}

/// Runs a batch fetch with the production source implementations.
///
/// # Errors
///
/// Returns an error only for environment failures (output directory
/// creation, scratch space). Per-package failures are collected in the
/// summary instead.
pub fn run_batch(config: &BatchConfig<'_>, stderr: &mut dyn Write) -> Result<BatchSummary> {
    let executor = TimedExecutor::new(std::time::Duration::from_secs(300));
    let repo = SoarRepo::new(&executor);
    run_batch_with(config, &GithubReleaseSource, &TarExtractor, &repo, stderr)
}

/// Testable batch runner with injected source implementations.
pub fn run_batch_with(
    config: &BatchConfig<'_>,
    source: &dyn ReleaseSource,
    extractor: &dyn ArchiveExtractor,
    repo: &dyn PackageRepo,
    stderr: &mut dyn Write,
) -> Result<BatchSummary> {
    let bin_dir = config.output_dir.join("bin");
    std::fs::create_dir_all(bin_dir.as_std_path()).map_err(|e| FetchError::DestinationCreate {
        path: bin_dir.clone(),
        reason: e.to_string(),
    })?;

    if !config.quiet {
        write_stderr_line(
            stderr,
            format!(
                "Fetching {} package(s) for {}...",
                config.packages.len(),
                config.architecture
            ),
        );
    }

    let scratch = tempfile::tempdir()?;
    let scratch_root = Utf8PathBuf::from_path_buf(scratch.path().to_path_buf())
        .map_err(|p| FetchError::DestinationCreate {
            path: bin_dir.clone(),
            reason: format!("scratch path is not UTF-8: {}", p.display()),
        })?;

    let mut summary = BatchSummary::default();

    for package in config.packages {
        let fetch_dir = scratch_root.join(format!("fetch_{}", package.replace('/', "_")));
        if fetch_package(config, source, extractor, repo, package, &fetch_dir, stderr).is_err() {
            if !config.quiet {
                write_stderr_line(stderr, format!("Fetch failed for {package}."));
            }
            summary.failures.push(package.clone());
        }
    }

    summary.installed = organize(&scratch_root, &bin_dir, config.quiet, stderr)?;

    if !summary.failures.is_empty() {
        let log_path = config.output_dir.join(FAILED_FETCHES_FILE);
        std::fs::write(
            log_path.as_std_path(),
            format!("FAILED_FETCHES:{}\n", summary.failures.join(",")),
        )?;
        if !config.quiet {
            write_stderr_line(
                stderr,
                format!(
                    "{} package(s) failed to download, continuing anyway.",
                    summary.failures.len()
                ),
            );
        }
    }

    if !config.quiet {
        write_stderr_line(stderr, bin_listing(&bin_dir)?);
    }

    Ok(summary)
}

/// Fetches one package into its scratch directory.
fn fetch_package(
    config: &BatchConfig<'_>,
    source: &dyn ReleaseSource,
    extractor: &dyn ArchiveExtractor,
    repo: &dyn PackageRepo,
    package: &str,
    fetch_dir: &Utf8Path,
    stderr: &mut dyn Write,
) -> Result<()> {
    let spec = PackageSpec {
        source_id: SourceId::try_from(package)?,
        architecture: config.architecture,
    };
    let resolve_config = ResolveConfig {
        spec: &spec,
        destination: fetch_dir,
        quiet: config.quiet,
    };
    resolve_with(&resolve_config, source, extractor, repo, stderr)?;
    Ok(())
}

/// Copies downloaded binaries and shebang scripts into the bin directory,
/// skipping names that already exist, and forces executable permission on
/// everything copied.
fn organize(
    scratch_root: &Utf8Path,
    bin_dir: &Utf8Path,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<Vec<String>> {
    let mut installed = Vec::new();
    let mut pending = vec![scratch_root.to_owned()];

    while let Some(dir) = pending.pop() {
        for entry in dir.read_dir_utf8().map_err(FetchError::Io)? {
            let entry = entry.map_err(FetchError::Io)?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path.to_owned());
                continue;
            }
            if !path.is_file() {
                continue;
            }

            let Some(base_name) = path.file_name() else {
                continue;
            };
            let dest_path = bin_dir.join(base_name);
            if dest_path.exists() {
                if !quiet {
                    write_stderr_line(stderr, format!("Skipping existing {base_name}."));
                }
                continue;
            }

            match classify(path)? {
                FileKind::ElfBinary | FileKind::ShebangScript => {
                    std::fs::copy(path.as_std_path(), dest_path.as_std_path())?;
                    force_executable(&dest_path)?;
                    installed.push(base_name.to_owned());
                }
                FileKind::Other => {
                    log::trace!("ignored {path}");
                }
            }
        }
    }

    installed.sort();
    Ok(installed)
}

/// Renders the output bin directory contents (mode, size, name).
fn bin_listing(bin_dir: &Utf8Path) -> Result<String> {
    let mut lines = vec![format!("Contents of {bin_dir}:")];
    let mut entries: Vec<Utf8PathBuf> = bin_dir
        .read_dir_utf8()
        .map_err(FetchError::Io)?
        .filter_map(|entry| entry.ok().map(|e| e.path().to_owned()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    for path in entries {
        let metadata = std::fs::metadata(path.as_std_path())?;
        let name = path.file_name().unwrap_or(path.as_str());
        lines.push(format!(
            "  {} {:>10}  {}",
            format_mode(&metadata),
            metadata.len(),
            name
        ));
    }
    Ok(lines.join("\n"))
}

/// Formats the permission bits of a file, `---` where unavailable.
fn format_mode(metadata: &std::fs::Metadata) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        return format!("{:03o}", metadata.mode() & 0o777);
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        "---".to_owned()
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
