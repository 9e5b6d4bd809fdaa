//! Release asset matching.
//!
//! Builds the filter that selects a downloadable asset for an architecture.
//! Architecture tokens are anchored at non-alphanumeric boundaries so that
//! `arm64` never matches an asset that merely contains `64`, and only tar
//! archives are ever eligible, whatever else the name contains.

use crate::arch::Architecture;
use crate::archive::ArchiveKind;
use regex::Regex;

/// Which libc marker the matcher insists on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Require a musl marker: the strict first pass.
    Musl,
    /// Require a linux marker but no musl: the last-resort pass after the
    /// fallback repository has also come up empty.
    GenericLinux,
}

impl MatchTier {
    /// The marker token this tier requires in the asset name.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Musl => "musl",
            Self::GenericLinux => "linux",
        }
    }
}

/// An asset-name filter for one architecture and tier.
///
/// # Examples
///
/// ```
/// use muslbox_fetcher::arch::Architecture;
/// use muslbox_fetcher::matcher::{AssetMatcher, MatchTier};
///
/// let matcher = AssetMatcher::new(Architecture::X86_64, MatchTier::Musl);
/// assert!(matcher.matches("tool-x86_64-unknown-linux-musl.tar.gz"));
/// assert!(!matcher.matches("tool-x86_64-unknown-linux-musl.zip"));
/// ```
#[derive(Debug, Clone)]
pub struct AssetMatcher {
    arch_token: Regex,
    tier: MatchTier,
}

impl AssetMatcher {
    /// Builds the matcher for an architecture and tier.
    #[must_use]
    pub fn new(architecture: Architecture, tier: MatchTier) -> Self {
        let alternatives = architecture
            .tokens()
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!("(?i)(^|[^a-z0-9])(?:{alternatives})([^a-z0-9]|$)");
        let arch_token = Regex::new(&pattern)
            .unwrap_or_else(|_| unreachable!("escaped token alternation is a valid pattern"));
        Self { arch_token, tier }
    }

    /// Reports whether an asset name satisfies this matcher.
    ///
    /// All three conditions must hold, case-insensitively: an anchored
    /// architecture token, the tier's libc marker, and a recognized tar
    /// suffix. A `.zip` or suffix-less asset never matches.
    #[must_use]
    pub fn matches(&self, asset_name: &str) -> bool {
        if ArchiveKind::from_name(asset_name).is_none() {
            return false;
        }
        let lowered = asset_name.to_ascii_lowercase();
        if !lowered.contains(self.tier.marker()) {
            return false;
        }
        self.arch_token.is_match(asset_name)
    }

    /// Selects the best match from a listing.
    ///
    /// When several assets qualify the lexicographically smallest name
    /// wins, so resolution is deterministic whatever order the source
    /// returned the listing in.
    #[must_use]
    pub fn best_match<'a, I>(&self, asset_names: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        asset_names
            .into_iter()
            .filter(|name| self.matches(name))
            .min()
    }
}
