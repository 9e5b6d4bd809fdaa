//! Documented exceptions to the static-linking and presence invariants.
//!
//! The exceptions manifest is a line-oriented flat file shipped alongside
//! the toolbox. Each line has the shape `<binary>:<version>:<tag>`, where
//! the tag records why a deviation is acceptable on this platform. The
//! manifest is loaded once at verification start and read-only afterwards.

use crate::error::{Result, VerifyError};
use camino::Utf8Path;
use std::collections::BTreeMap;
use std::fmt;

/// Why a binary is allowed to deviate from the toolbox invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonTag {
    /// The binary is known to be dynamically linked on this platform.
    KnownDynamic,
    /// The binary is permitted to be entirely absent on this platform.
    AllowedMissing,
}

impl ReasonTag {
    /// The manifest literal for this tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KnownDynamic => "NOT_STATIC",
            Self::AllowedMissing => "MISSING_STATIC",
        }
    }

    /// Parses a manifest tag literal.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "NOT_STATIC" => Some(Self::KnownDynamic),
            "MISSING_STATIC" => Some(Self::AllowedMissing),
            _ => None,
        }
    }
}

impl fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One documented exception, keyed by binary basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRecord {
    /// Basename of the binary the exception applies to.
    pub binary_name: String,
    /// Version the exception was recorded against (informational).
    pub version: String,
    /// Why the deviation is acceptable.
    pub reason: ReasonTag,
}

/// The exceptions manifest: records keyed by exact basename, plus any
/// warnings produced while parsing.
#[derive(Debug, Clone, Default)]
pub struct Exceptions {
    records: BTreeMap<String, ExceptionRecord>,
    /// Warnings for skipped lines, in input order.
    pub warnings: Vec<String>,
}

impl Exceptions {
    /// Looks up the exception for a binary basename.
    #[must_use]
    pub fn get(&self, binary_name: &str) -> Option<&ExceptionRecord> {
        self.records.get(binary_name)
    }

    /// Reports whether a binary carries the given tag.
    #[must_use]
    pub fn has_tag(&self, binary_name: &str, tag: ReasonTag) -> bool {
        self.get(binary_name).is_some_and(|r| r.reason == tag)
    }

    /// Returns the records in basename order, for audit output.
    #[must_use]
    pub fn records(&self) -> impl Iterator<Item = &ExceptionRecord> {
        self.records.values()
    }

    /// Returns true when no exceptions are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses manifest content.
///
/// Blank and malformed lines are skipped with a warning rather than
/// failing the load. The manifest is expected to list each binary at most
/// once; when it does not, the first entry wins and later duplicates are
/// skipped with a warning.
#[must_use]
pub fn parse_exceptions(content: &str) -> Exceptions {
    let mut exceptions = Exceptions::default();

    for (line_number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(record) = parse_line(trimmed) else {
            exceptions.warnings.push(format!(
                "skipping malformed exceptions line {}: {trimmed:?}",
                line_number + 1
            ));
            continue;
        };

        if exceptions.records.contains_key(&record.binary_name) {
            exceptions.warnings.push(format!(
                "skipping duplicate exception for {:?} on line {}",
                record.binary_name,
                line_number + 1
            ));
            continue;
        }

        exceptions.records.insert(record.binary_name.clone(), record);
    }

    exceptions
}

/// Loads and parses an exceptions manifest file.
///
/// A missing file yields an empty set: shipping no exceptions is the
/// common case.
///
/// # Errors
///
/// Returns [`VerifyError::ManifestRead`] when the file exists but cannot
/// be read.
pub fn load_exceptions(path: &Utf8Path) -> Result<Exceptions> {
    if !path.exists() {
        return Ok(Exceptions::default());
    }
    let content =
        std::fs::read_to_string(path.as_std_path()).map_err(|e| VerifyError::ManifestRead {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    Ok(parse_exceptions(&content))
}

fn parse_line(line: &str) -> Option<ExceptionRecord> {
    let mut parts = line.splitn(3, ':');
    let binary_name = parts.next()?.trim();
    let version = parts.next()?.trim();
    let tag = parts.next()?.trim();

    if binary_name.is_empty() {
        return None;
    }

    Some(ExceptionRecord {
        binary_name: binary_name.to_owned(),
        version: version.to_owned(),
        reason: ReasonTag::parse(tag)?,
    })
}
