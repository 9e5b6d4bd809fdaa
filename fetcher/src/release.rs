//! Primary source: release-asset listings.
//!
//! Provides a trait-based abstraction over the release listing and asset
//! download so the resolver can be tested without network access, plus the
//! production implementation backed by the GitHub releases API.

use crate::archive::ArchiveKind;
use crate::source::SourceId;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// API root for release listings.
const API_ROOT: &str = "https://api.github.com";

/// Network timeout for listing queries and asset downloads.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// One downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    /// The asset filename as listed.
    pub name: String,
    /// Direct download URL for the asset.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// The slice of the release payload the resolver needs.
#[derive(Debug, Deserialize)]
struct Release {
    assets: Vec<ReleaseAsset>,
}

/// A resolved, downloadable artifact: an asset plus its inferred archive
/// kind. Exists only for the duration of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCandidate {
    /// The underlying release asset.
    pub asset: ReleaseAsset,
    /// The archive kind inferred from the asset name.
    pub kind: ArchiveKind,
}

impl AssetCandidate {
    /// Promotes an asset to a candidate when its suffix is a recognized
    /// archive kind.
    #[must_use]
    pub fn from_asset(asset: &ReleaseAsset) -> Option<Self> {
        ArchiveKind::from_name(&asset.name).map(|kind| Self {
            asset: asset.clone(),
            kind,
        })
    }
}

/// Errors arising from the primary release source.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// HTTP request failed.
    #[error("release query failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The repository or release was not found (HTTP 404).
    #[error("no release found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The listing payload could not be parsed.
    #[error("invalid release listing from {url}: {reason}")]
    InvalidListing {
        /// The URL whose payload failed to parse.
        url: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// I/O error writing a downloaded asset.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for querying a release listing and downloading its assets.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseSource {
    /// Lists the assets attached to the latest release of `source_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::NotFound`] when the repository has no
    /// release, and [`ReleaseError::Http`] or
    /// [`ReleaseError::InvalidListing`] on transport or payload failures.
    fn list_assets(&self, source_id: &SourceId) -> Result<Vec<ReleaseAsset>, ReleaseError>;

    /// Downloads `asset` to the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or the file write fails.
    fn download(&self, asset: &ReleaseAsset, dest: &Path) -> Result<(), ReleaseError>;
}

/// HTTP-based release source using `ureq` against the GitHub API.
pub struct GithubReleaseSource;

impl GithubReleaseSource {
    /// Constructs the latest-release listing URL for a source id.
    ///
    /// # Examples
    ///
    /// ```
    /// use muslbox_fetcher::release::GithubReleaseSource;
    /// use muslbox_fetcher::source::SourceId;
    ///
    /// let id: SourceId = "owner/repo".try_into().expect("valid id");
    /// let url = GithubReleaseSource::listing_url(&id);
    /// assert!(url.ends_with("/repos/owner/repo/releases/latest"));
    /// ```
    #[must_use]
    pub fn listing_url(source_id: &SourceId) -> String {
        format!("{API_ROOT}/repos/{source_id}/releases/latest")
    }
}

impl ReleaseSource for GithubReleaseSource {
    fn list_assets(&self, source_id: &SourceId) -> Result<Vec<ReleaseAsset>, ReleaseError> {
        let url = Self::listing_url(source_id);
        let body = download_text(&url)?;
        let release: Release =
            serde_json::from_str(&body).map_err(|e| ReleaseError::InvalidListing {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(release.assets)
    }

    fn download(&self, asset: &ReleaseAsset, dest: &Path) -> Result<(), ReleaseError> {
        download_to_file(&asset.download_url, dest)
    }
}

/// Downloads a URL and returns the body as a string.
fn download_text(url: &str) -> Result<String, ReleaseError> {
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    response
        .into_body()
        .read_to_string()
        .map_err(|e| ReleaseError::Http {
            url: url.to_owned(),
            reason: e.to_string(),
        })
}

/// Downloads a URL and writes the body to a file.
fn download_to_file(url: &str, dest: &Path) -> Result<(), ReleaseError> {
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    let mut file = std::fs::File::create(dest)?;
    std::io::copy(&mut response.into_body().as_reader(), &mut file).map_err(ReleaseError::Io)?;
    Ok(())
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Maps a ureq error to a [`ReleaseError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> ReleaseError {
    match err {
        ureq::Error::StatusCode(404) => ReleaseError::NotFound {
            url: url.to_owned(),
        },
        other => ReleaseError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
