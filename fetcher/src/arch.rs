//! Target architecture handling.
//!
//! Only the two architectures the toolbox ships for are accepted. Common
//! synonyms (`amd64`, `aarch64`) normalize to the canonical names, and the
//! host machine type can be detected when the caller does not supply one.

use crate::error::{FetchError, Result};
use serde::Serialize;
use std::fmt;

/// A supported target architecture.
///
/// Construction via [`TryFrom`] rejects anything outside the supported set.
///
/// # Examples
///
/// ```
/// use muslbox_fetcher::arch::Architecture;
///
/// let arch: Architecture = "amd64".try_into().expect("synonym accepted");
/// assert_eq!(arch.as_str(), "x86_64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// 64-bit x86 (`x86_64`, synonym `amd64`).
    X86_64,
    /// 64-bit ARM (`arm64`, synonym `aarch64`).
    Arm64,
}

impl Architecture {
    /// Returns the canonical name of this architecture.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
        }
    }

    /// Returns the asset-name tokens that identify this architecture.
    ///
    /// Token order runs from most to least specific; the matcher anchors
    /// each one so a bare `64` never matches.
    #[must_use]
    pub const fn tokens(self) -> &'static [&'static str] {
        match self {
            Self::X86_64 => &["x86_64", "x86-64", "amd64"],
            Self::Arm64 => &["aarch64", "arm64"],
        }
    }

    /// Detects the architecture of the host machine.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ArchitectureUndetectable`] when the host
    /// machine type is not one this toolbox ships for. Detection never
    /// guesses: an unrecognized machine type is a hard error before any
    /// network activity.
    pub fn detect_host() -> Result<Self> {
        let machine = std::env::consts::ARCH;
        Self::try_from(machine).map_err(|_| FetchError::ArchitectureUndetectable {
            machine: machine.to_owned(),
        })
    }

    /// Maps a Docker-style `TARGETARCH` value to an architecture.
    ///
    /// Buildx only distinguishes `arm64`; everything else builds the
    /// x86_64 toolbox, matching the image build's behaviour.
    #[must_use]
    pub fn from_target_arch(target_arch: &str) -> Self {
        if target_arch.eq_ignore_ascii_case("arm64") {
            Self::Arm64
        } else {
            Self::X86_64
        }
    }
}

impl TryFrom<&str> for Architecture {
    type Error = FetchError;

    fn try_from(value: &str) -> Result<Self> {
        let lowered = value.to_ascii_lowercase();
        match lowered.as_str() {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            _ => Err(FetchError::UnsupportedArchitecture {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
