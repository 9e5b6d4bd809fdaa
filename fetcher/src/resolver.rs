//! Artifact resolution pipeline.
//!
//! Orders the sources: musl-tagged release assets first, the soar package
//! repository second, and a generic linux-tagged release asset as the last
//! resort. The first source that lands files in the destination wins; when
//! every source is exhausted the destination has gained nothing and the
//! resolution fails.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::io::Write;

use crate::archive::{
    ArchiveExtractor, ExtractedFile, ExtractionResult, FileKind, TarExtractor, classify,
    force_executable,
};
use crate::error::{FetchError, Result};
use crate::matcher::{AssetMatcher, MatchTier};
use crate::release::{AssetCandidate, GithubReleaseSource, ReleaseAsset, ReleaseSource};
use crate::repo::{PackageRepo, RepoOutcome, SoarRepo};
use crate::source::PackageSpec;
use muslbox_common::exec::TimedExecutor;
use muslbox_common::output::write_stderr_line;

/// Timeout for one fallback-repository invocation.
const REPO_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Configuration for one resolution attempt.
#[derive(Debug)]
pub struct ResolveConfig<'a> {
    /// What to fetch.
    pub spec: &'a PackageSpec,
    /// Where extracted files land. Created if absent; the caller owns it.
    pub destination: &'a Utf8Path,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// Resolves an artifact using the production source implementations.
///
/// # Errors
///
/// Returns [`FetchError::ResolutionFailed`] when every source is
/// exhausted, or an earlier pipeline error (destination creation,
/// extraction) verbatim. Network and source errors are not retried here;
/// retry policy belongs to the caller.
pub fn resolve(config: &ResolveConfig<'_>, stderr: &mut dyn Write) -> Result<ExtractionResult> {
    let executor = TimedExecutor::new(REPO_TIMEOUT);
    let repo = SoarRepo::new(&executor);
    resolve_with(config, &GithubReleaseSource, &TarExtractor, &repo, stderr)
}

/// Testable inner pipeline with injected source implementations.
///
/// The production entry point [`resolve`] delegates here with real
/// implementations; tests inject stubs.
pub fn resolve_with(
    config: &ResolveConfig<'_>,
    source: &dyn ReleaseSource,
    extractor: &dyn ArchiveExtractor,
    repo: &dyn PackageRepo,
    stderr: &mut dyn Write,
) -> Result<ExtractionResult> {
    let spec = config.spec;

    std::fs::create_dir_all(config.destination.as_std_path()).map_err(|e| {
        FetchError::DestinationCreate {
            path: config.destination.to_owned(),
            reason: e.to_string(),
        }
    })?;

    // Pass 1: musl-tagged release asset.
    let listing = fetch_listing(config, source, stderr);
    let musl_matcher = AssetMatcher::new(spec.architecture, MatchTier::Musl);
    if let Some(assets) = listing.as_deref() {
        if !config.quiet {
            write_stderr_line(
                stderr,
                format!(
                    "Trying release assets for {} (arch: {}, musl)...",
                    spec.source_id, spec.architecture
                ),
            );
        }
        if let Some(candidate) = select_candidate(&musl_matcher, assets) {
            return download_and_extract(config, source, extractor, &candidate, stderr);
        }
        if !config.quiet {
            write_stderr_line(stderr, "No musl asset matched.");
        }
    }

    // Pass 2: the package repository, no name filtering.
    if !config.quiet {
        write_stderr_line(
            stderr,
            format!("Trying package repository for {}...", spec.source_id),
        );
    }
    let before = list_files(config.destination)?;
    match repo.fetch(&spec.source_id, config.destination) {
        RepoOutcome::Fetched => {
            let result = collect_new_files(config.destination, &before)?;
            if !result.is_empty() {
                return Ok(result);
            }
            if !config.quiet {
                write_stderr_line(stderr, "Package repository extracted no files.");
            }
        }
        RepoOutcome::Unavailable { reason } => {
            if !config.quiet {
                write_stderr_line(stderr, format!("Package repository: {reason}"));
            }
        }
    }

    // Pass 3: generic linux-tagged release asset, musl no longer required.
    let generic_matcher = AssetMatcher::new(spec.architecture, MatchTier::GenericLinux);
    if let Some(assets) = listing.as_deref() {
        if !config.quiet {
            write_stderr_line(
                stderr,
                format!(
                    "Trying release assets for {} (arch: {}, any linux)...",
                    spec.source_id, spec.architecture
                ),
            );
        }
        if let Some(candidate) = select_candidate(&generic_matcher, assets) {
            return download_and_extract(config, source, extractor, &candidate, stderr);
        }
    }

    Err(FetchError::ResolutionFailed {
        source_id: spec.source_id.to_string(),
    })
}

/// Queries the release listing, demoting failures to a missing listing so
/// the pipeline can continue with the fallback repository.
fn fetch_listing(
    config: &ResolveConfig<'_>,
    source: &dyn ReleaseSource,
    stderr: &mut dyn Write,
) -> Option<Vec<ReleaseAsset>> {
    match source.list_assets(&config.spec.source_id) {
        Ok(assets) => Some(assets),
        Err(e) => {
            if !config.quiet {
                write_stderr_line(stderr, format!("Release listing unavailable: {e}"));
            }
            None
        }
    }
}

/// Applies the matcher to a listing and promotes the winner to a
/// candidate.
fn select_candidate(matcher: &AssetMatcher, assets: &[ReleaseAsset]) -> Option<AssetCandidate> {
    let best = matcher.best_match(assets.iter().map(|a| a.name.as_str()))?;
    assets
        .iter()
        .find(|a| a.name == best)
        .and_then(AssetCandidate::from_asset)
}

/// Downloads a candidate to scratch space and extracts it into the
/// destination.
fn download_and_extract(
    config: &ResolveConfig<'_>,
    source: &dyn ReleaseSource,
    extractor: &dyn ArchiveExtractor,
    candidate: &AssetCandidate,
    stderr: &mut dyn Write,
) -> Result<ExtractionResult> {
    if !config.quiet {
        write_stderr_line(stderr, format!("Downloading {}...", candidate.asset.name));
    }

    let scratch = tempfile::tempdir()?;
    let archive_path = scratch.path().join(&candidate.asset.name);
    source.download(&candidate.asset, &archive_path)?;

    if !config.quiet {
        write_stderr_line(stderr, format!("Extracting into {}...", config.destination));
    }
    let result = extractor.extract(&archive_path, candidate.kind, config.destination)?;

    if !config.quiet {
        write_stderr_line(
            stderr,
            format!("Extracted {} file(s).", result.files.len()),
        );
    }
    Ok(result)
}

/// Recursively lists the files under a directory.
fn list_files(dir: &Utf8Path) -> Result<BTreeSet<Utf8PathBuf>> {
    let mut files = BTreeSet::new();
    if !dir.exists() {
        return Ok(files);
    }
    collect_files(dir, &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Utf8Path, files: &mut BTreeSet<Utf8PathBuf>) -> Result<()> {
    for entry in dir.read_dir_utf8().map_err(FetchError::Io)? {
        let entry = entry.map_err(FetchError::Io)?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(path, files)?;
        } else if path.is_file() {
            files.insert(path.to_owned());
        }
    }
    Ok(())
}

/// Builds an extraction result from the files the fallback repository
/// added, forcing executable permission on binaries and scripts.
fn collect_new_files(
    dest: &Utf8Path,
    before: &BTreeSet<Utf8PathBuf>,
) -> Result<ExtractionResult> {
    let after = list_files(dest)?;
    let mut files = Vec::new();
    for path in after.difference(before) {
        let kind = classify(path)?;
        let is_executable = matches!(kind, FileKind::ElfBinary | FileKind::ShebangScript);
        if is_executable {
            force_executable(path)?;
        }
        files.push(ExtractedFile {
            path: path.clone(),
            is_executable,
        });
    }
    Ok(ExtractionResult { files })
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
