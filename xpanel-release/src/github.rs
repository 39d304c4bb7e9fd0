//! GitHub releases client.
//!
//! Lists published releases of the engine and geo-data repositories and
//! resolves the downloadable asset for a given tag.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use xpanel_core::config::PanelConfig;
use xpanel_core::constants::{GEOIP_ASSET_NAME, GEOSITE_ASSET_NAME, RELEASES_PER_PAGE};
use xpanel_core::error::{PanelError, Result};
use xpanel_core::traits::VersionFetcher;
use xpanel_core::types::{AssetKind, VersionList};

use crate::platform::default_engine_asset;

const USER_AGENT: &str = concat!("xpanel/", env!("CARGO_PKG_VERSION"));

/// Release client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// GitHub REST API base URL
    pub api_base: String,
    /// `owner/name` of the engine repository
    pub engine_repo: String,
    /// `owner/name` of the geo-data repository
    pub geo_repo: String,
    /// Engine asset name looked up in each release
    pub engine_asset: String,
    /// Releases requested per listing
    pub per_page: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl ReleaseConfig {
    /// Builds the release settings out of the panel configuration.
    pub fn from_panel(config: &PanelConfig) -> Self {
        Self {
            api_base: config.github_api.clone(),
            engine_repo: config.engine_repo.clone(),
            geo_repo: config.geo_repo.clone(),
            engine_asset: config.engine_asset.clone().unwrap_or_else(default_engine_asset),
            per_page: RELEASES_PER_PAGE,
            timeout_seconds: config.http_timeout_secs,
        }
    }

    /// Points the client at another API base, e.g. a mirror or a test server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Repository publishing `kind`.
    pub fn repo_for(&self, kind: AssetKind) -> &str {
        if kind.is_geo_data() {
            &self.geo_repo
        } else {
            &self.engine_repo
        }
    }

    /// Asset name carrying `kind` inside a release.
    pub fn asset_name(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Engine => &self.engine_asset,
            AssetKind::GeoIp => GEOIP_ASSET_NAME,
            AssetKind::GeoSite => GEOSITE_ASSET_NAME,
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self::from_panel(&PanelConfig::default())
    }
}

/// A published release as returned by the GitHub API.
#[derive(Clone, Debug, Deserialize)]
pub struct Release {
    /// Git tag the release was cut from
    pub tag_name: String,
    /// Unpublished drafts are never offered
    #[serde(default)]
    pub draft: bool,
    /// Pre-release flag
    #[serde(default)]
    pub prerelease: bool,
    /// Downloadable files
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Returns the asset named `name`, if this release carries one.
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// A downloadable file attached to a release.
#[derive(Clone, Debug, Deserialize)]
pub struct ReleaseAsset {
    /// File name
    pub name: String,
    /// Direct download URL
    pub browser_download_url: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

/// GitHub releases client.
pub struct ReleaseClient {
    config: ReleaseConfig,
    http_client: reqwest::Client,
}

impl ReleaseClient {
    /// Creates a new client with the given config.
    pub fn with_config(config: ReleaseConfig) -> Result<Self> {
        url::Url::parse(&config.api_base)
            .map_err(|e| PanelError::ConfigError(format!("invalid GitHub API URL '{}': {e}", config.api_base)))?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PanelError::ConfigError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, http_client })
    }

    /// Client configuration.
    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Lists the most recent releases of the repository publishing `kind`.
    #[instrument(skip(self))]
    pub async fn list_releases(&self, kind: AssetKind) -> Result<Vec<Release>> {
        let url = self.api_url(&format!("repos/{}/releases", self.config.repo_for(kind)));

        let response = self
            .http_client
            .get(&url)
            .query(&[("per_page", self.config.per_page)])
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| PanelError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PanelError::VersionFetchFailed {
                kind,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let releases: Vec<Release> = response.json().await.map_err(|e| PanelError::VersionFetchFailed {
            kind,
            reason: e.to_string(),
        })?;

        debug!(count = releases.len(), "fetched releases");
        Ok(releases)
    }

    /// Resolves the asset carrying `kind` in the release tagged `version`.
    #[instrument(skip(self))]
    pub async fn find_asset(&self, kind: AssetKind, version: &str) -> Result<ReleaseAsset> {
        let url = self.api_url(&format!(
            "repos/{}/releases/tags/{}",
            self.config.repo_for(kind),
            version
        ));

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| PanelError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PanelError::InstallFailed {
                kind,
                version: version.to_string(),
                reason: format!("release lookup returned HTTP {}", response.status()),
            });
        }

        let release: Release = response.json().await.map_err(|e| PanelError::InstallFailed {
            kind,
            version: version.to_string(),
            reason: e.to_string(),
        })?;

        let name = self.config.asset_name(kind);
        release.asset(name).cloned().ok_or_else(|| PanelError::AssetNotFound {
            kind,
            version: version.to_string(),
            asset: name.to_string(),
        })
    }

    /// Downloads an asset body.
    #[instrument(skip(self, asset), fields(asset = %asset.name))]
    pub async fn download(&self, asset: &ReleaseAsset) -> Result<Bytes> {
        let response = self
            .http_client
            .get(&asset.browser_download_url)
            .send()
            .await
            .map_err(|e| PanelError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PanelError::HttpError(format!(
                "download of {} returned HTTP {}",
                asset.name,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PanelError::HttpError(e.to_string()))?;

        debug!(bytes = body.len(), "downloaded asset");
        Ok(body)
    }
}

#[async_trait]
impl VersionFetcher for ReleaseClient {
    /// Tags of published releases that carry an installable asset, newest first.
    async fn fetch_versions(&self, kind: AssetKind) -> Result<VersionList> {
        let asset = self.config.asset_name(kind);
        let versions = self
            .list_releases(kind)
            .await?
            .into_iter()
            .filter(|r| !r.draft && r.asset(asset).is_some())
            .map(|r| r.tag_name)
            .collect();
        Ok(versions)
    }
}
