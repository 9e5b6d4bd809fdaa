//! Package source identification.
//!
//! A [`SourceId`] names where an artifact comes from (`owner/repo` on the
//! primary source, a plain package name on the fallback repository). A
//! [`PackageSpec`] pairs it with the architecture to fetch for.

use crate::arch::Architecture;
use crate::error::{FetchError, Result};
use std::fmt;

/// A validated `owner/repo` source identifier.
///
/// Construction rejects identifiers without a namespace separator or with
/// an empty owner or name half.
///
/// # Examples
///
/// ```
/// use muslbox_fetcher::source::SourceId;
///
/// let id: SourceId = "Gaurav-Gosain/tuios".try_into().expect("valid id");
/// assert_eq!(id.owner(), "Gaurav-Gosain");
/// assert_eq!(id.name(), "tuios");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(String);

impl SourceId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the namespace half of the identifier.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or("", |(owner, _)| owner)
    }

    /// Returns the package-name half of the identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl TryFrom<&str> for SourceId {
    type Error = FetchError;

    fn try_from(value: &str) -> Result<Self> {
        match value.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self(value.to_owned()))
            }
            _ => Err(FetchError::InvalidSourceId {
                value: value.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for SourceId {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to fetch: a source identifier plus the target architecture.
///
/// Immutable once constructed; the architecture has already been validated
/// or host-detected by the time a spec exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Where the artifact comes from.
    pub source_id: SourceId,
    /// Which architecture to fetch for.
    pub architecture: Architecture,
}

impl PackageSpec {
    /// Builds a spec from caller input, validating the source id and
    /// normalizing or detecting the architecture.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidSourceId`] for a malformed identifier,
    /// [`FetchError::UnsupportedArchitecture`] for an unrecognized
    /// architecture value, or [`FetchError::ArchitectureUndetectable`] when
    /// no architecture was supplied and the host machine type is not
    /// supported.
    pub fn new(source_id: &str, architecture: Option<&str>) -> Result<Self> {
        let source_id = SourceId::try_from(source_id)?;
        let architecture = match architecture {
            Some(value) => Architecture::try_from(value)?,
            None => Architecture::detect_host()?,
        };
        Ok(Self {
            source_id,
            architecture,
        })
    }
}
