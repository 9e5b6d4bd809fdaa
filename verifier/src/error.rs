//! Error types for the verifier.
//!
//! Environment failures (unreadable manifest, missing install directory)
//! are errors; verification findings are not. A failed check lands in the
//! report as an outcome, never as an `Err`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while setting up or running a verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The installation directory does not exist.
    #[error("install directory {path} does not exist")]
    InstallDirMissing {
        /// The directory that was expected to exist.
        path: Utf8PathBuf,
    },

    /// The exceptions manifest could not be read.
    #[error("failed to read exceptions manifest {path}: {reason}")]
    ManifestRead {
        /// Path of the unreadable manifest.
        path: Utf8PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Failed to write the report.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`VerifyError`].
pub type Result<T> = std::result::Result<T, VerifyError>;
