//! Binary location with an explicit, ordered search path.
//!
//! The verifier never consults `PATH`. The candidate directories are a
//! visible parameter, searched in order: the first entry holding an
//! existing executable file wins and short-circuits the rest.

use camino::{Utf8Path, Utf8PathBuf};

/// An ordered list of directories to search for binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    directories: Vec<Utf8PathBuf>,
}

impl SearchPath {
    /// Builds a search path from candidate directories, in priority order.
    #[must_use]
    pub fn new(directories: Vec<Utf8PathBuf>) -> Self {
        Self { directories }
    }

    /// Returns the candidate directories in search order.
    #[must_use]
    pub fn directories(&self) -> &[Utf8PathBuf] {
        &self.directories
    }

    /// Locates a binary by basename: first existing executable wins.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<Utf8PathBuf> {
        self.directories
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable_file(candidate))
    }
}

/// Reports whether a path is an existing, executable regular file.
#[must_use]
pub fn is_executable_file(path: &Utf8Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path.as_std_path()) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    has_execute_bit(&metadata)
}

#[cfg(unix)]
fn has_execute_bit(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_bit(_metadata: &std::fs::Metadata) -> bool {
    true
}
