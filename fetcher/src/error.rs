//! Error types for the fetcher.
//!
//! Each variant names the stage that failed and carries enough context for
//! the CLI to print an actionable message without further lookups.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving and fetching an artifact.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source identifier is not in `owner/repo` form.
    #[error("invalid source id {value:?}: expected owner/repo")]
    InvalidSourceId {
        /// The offending identifier.
        value: String,
    },

    /// The supplied architecture is not one the toolbox ships for.
    #[error("unsupported architecture {value:?}: use x86_64 or arm64")]
    UnsupportedArchitecture {
        /// The offending architecture value.
        value: String,
    },

    /// The host machine type could not be mapped to a supported
    /// architecture. Detection never guesses; pass `--arch` explicitly.
    #[error("unable to detect architecture from host machine type {machine:?}; pass --arch <x86_64|arm64>")]
    ArchitectureUndetectable {
        /// The machine type the host reported.
        machine: String,
    },

    /// The destination directory could not be created.
    #[error("failed to create destination directory {path}: {reason}")]
    DestinationCreate {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Querying or downloading from the primary release source failed.
    #[error(transparent)]
    Release(#[from] crate::release::ReleaseError),

    /// Extracting a downloaded archive failed.
    #[error(transparent)]
    Extraction(#[from] crate::archive::ExtractionError),

    /// Every source was exhausted without any file landing in the
    /// destination.
    #[error("no artifact for {source_id} could be resolved from any source")]
    ResolutionFailed {
        /// The identifier that could not be resolved.
        source_id: String,
    },

    /// A batch package list could not be read or parsed.
    #[error("invalid package list {path}: {reason}")]
    InvalidPackageList {
        /// The list file or argument that failed to parse.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn architecture_undetectable_suggests_arch_flag() {
        let err = FetchError::ArchitectureUndetectable {
            machine: "riscv64".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("riscv64"));
        assert!(msg.contains("--arch"));
    }

    #[test]
    fn resolution_failed_names_the_source() {
        let err = FetchError::ResolutionFailed {
            source_id: "owner/repo".to_owned(),
        };
        assert!(err.to_string().contains("owner/repo"));
    }
}
