//! Archive extraction for downloaded release assets.
//!
//! Accepts exactly two archive kinds (tar+gzip and tar+xz), extracts with
//! path traversal protection, and forces the executable bit on every
//! extracted file whose content is an ELF binary or a shebang script.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::Read;
use std::path::{Component, Path};

/// The archive kinds the resolver accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// A gzip-compressed tar archive (`.tar.gz`).
    TarGz,
    /// An xz-compressed tar archive (`.tar.xz`).
    TarXz,
}

impl ArchiveKind {
    /// Infers the archive kind from an asset name, case-insensitively.
    ///
    /// Returns `None` for every other suffix, `.zip` included: such assets
    /// are never eligible no matter what else their name matches.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        if lowered.ends_with(".tar.gz") {
            Some(Self::TarGz)
        } else if lowered.ends_with(".tar.xz") {
            Some(Self::TarXz)
        } else {
            None
        }
    }
}

/// Content classification of an extracted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// An ELF executable or shared object.
    ElfBinary,
    /// A script starting with `#!`.
    ShebangScript,
    /// Anything else (documentation, completions, data files).
    Other,
}

/// One file written to the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// Full path of the extracted file.
    pub path: Utf8PathBuf,
    /// Whether the executable bit was forced on (ELF binaries and shebang
    /// scripts).
    pub is_executable: bool,
}

/// The files a resolution attempt wrote into the destination.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Extracted files in archive order.
    pub files: Vec<ExtractedFile>,
}

impl ExtractionResult {
    /// Returns true when nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the extracted files that carry the executable bit.
    #[must_use]
    pub fn executables(&self) -> Vec<&ExtractedFile> {
        self.files.iter().filter(|f| f.is_executable).collect()
    }
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// An archive entry path is not valid UTF-8.
    #[error("archive entry path is not UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// The archive contains no files.
    #[error("archive contains no files")]
    EmptyArchive,
}

/// Trait for extracting downloaded archives, enabling test substitution.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extracts the archive at `archive_path` into `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::EmptyArchive`]
    /// if no files are found, and [`ExtractionError::Io`] on I/O failures.
    fn extract(
        &self,
        archive_path: &Path,
        kind: ArchiveKind,
        dest_dir: &Utf8Path,
    ) -> Result<ExtractionResult, ExtractionError>;
}

/// Default extractor using the `tar`, `flate2`, and `liblzma` crates.
///
/// Validates each entry path before extraction to guard against path
/// traversal (zip-slip), then classifies the unpacked content and forces
/// executable permission on binaries and scripts.
pub struct TarExtractor;

impl ArchiveExtractor for TarExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        kind: ArchiveKind,
        dest_dir: &Utf8Path,
    ) -> Result<ExtractionResult, ExtractionError> {
        let file = std::fs::File::open(archive_path)?;
        let reader: Box<dyn Read> = match kind {
            ArchiveKind::TarGz => Box::new(flate2::read::GzDecoder::new(file)),
            ArchiveKind::TarXz => Box::new(liblzma::read::XzDecoder::new(file)),
        };
        let mut archive = tar::Archive::new(reader);
        let mut files = Vec::new();

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            let entry_path = entry.path()?.into_owned();

            validate_entry_path(&entry_path)?;

            let relative = Utf8PathBuf::from_path_buf(entry_path).map_err(|p| {
                ExtractionError::NonUtf8Path {
                    path: p.display().to_string(),
                }
            })?;
            let dest_path = dest_dir.join(&relative);
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            entry.unpack(dest_path.as_std_path())?;

            if !dest_path.is_file() {
                continue;
            }

            let kind = classify(&dest_path)?;
            let is_executable = matches!(kind, FileKind::ElfBinary | FileKind::ShebangScript);
            if is_executable {
                force_executable(&dest_path)?;
            }

            files.push(ExtractedFile {
                path: dest_path,
                is_executable,
            });
        }

        if files.is_empty() {
            return Err(ExtractionError::EmptyArchive);
        }

        Ok(ExtractionResult { files })
    }
}

/// Classifies a file by its leading magic bytes.
///
/// # Errors
///
/// Returns any I/O error encountered while opening or reading the file.
pub fn classify(path: &Utf8Path) -> std::io::Result<FileKind> {
    let mut file = std::fs::File::open(path.as_std_path())?;
    let mut magic = [0u8; 4];
    let read = read_up_to(&mut file, &mut magic)?;

    if read >= 4 && magic == [0x7f, b'E', b'L', b'F'] {
        Ok(FileKind::ElfBinary)
    } else if read >= 2 && &magic[..2] == b"#!" {
        Ok(FileKind::ShebangScript)
    } else {
        Ok(FileKind::Other)
    }
}

/// Adds `a+x` to a file's permissions.
///
/// # Errors
///
/// Returns any I/O error encountered while reading or updating the file
/// metadata.
pub fn force_executable(path: &Utf8Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path.as_std_path())?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(permissions.mode() | 0o111);
        std::fs::set_permissions(path.as_std_path(), permissions)?;
    }
    Ok(())
}

/// Reads up to `buf.len()` bytes, tolerating short files.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Validates that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    if path.is_absolute() {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(ExtractionError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}
