//! Panel configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{PanelError, Result};
use crate::types::AssetKind;

/// Configuration for the management core and its collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Background status refresh interval in seconds
    pub status_tick_secs: u64,
    /// Idle cutoff for background refresh in seconds
    pub idle_cutoff_secs: u64,
    /// Version listing TTL in seconds
    pub version_ttl_secs: u64,
    /// Path of the engine binary
    pub engine_binary: PathBuf,
    /// Path of the engine JSON config, also served by config export
    pub engine_config: PathBuf,
    /// Path of the engine log file
    pub engine_log: PathBuf,
    /// Path of the geoip data file
    pub geoip_path: PathBuf,
    /// Path of the geosite data file
    pub geosite_path: PathBuf,
    /// Path of the panel database file
    pub database_path: PathBuf,
    /// GitHub REST API base URL
    pub github_api: String,
    /// Repository publishing engine releases
    pub engine_repo: String,
    /// Repository publishing geo-data releases
    pub geo_repo: String,
    /// Engine release asset name; derived from the build platform when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_asset: Option<String>,
    /// HTTP timeout for release requests in seconds
    pub http_timeout_secs: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let bin = PathBuf::from("bin");
        Self {
            status_tick_secs: DEFAULT_STATUS_TICK_SECS,
            idle_cutoff_secs: DEFAULT_IDLE_CUTOFF_SECS,
            version_ttl_secs: DEFAULT_VERSION_TTL_SECS,
            engine_binary: bin.join("xray"),
            engine_config: bin.join("config.json"),
            engine_log: PathBuf::from("log").join("xray.log"),
            geoip_path: bin.join(GEOIP_ASSET_NAME),
            geosite_path: bin.join(GEOSITE_ASSET_NAME),
            database_path: PathBuf::from("db").join(DATABASE_EXPORT_FILENAME),
            github_api: DEFAULT_GITHUB_API.into(),
            engine_repo: DEFAULT_ENGINE_REPO.into(),
            geo_repo: DEFAULT_GEO_REPO.into(),
            engine_asset: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl PanelConfig {
    /// Loads configuration from the environment (and a `.env` file if present),
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Ok(Self {
            status_tick_secs: env_secs("XPANEL_STATUS_TICK_SECS", defaults.status_tick_secs)?,
            idle_cutoff_secs: env_secs("XPANEL_IDLE_CUTOFF_SECS", defaults.idle_cutoff_secs)?,
            version_ttl_secs: env_secs("XPANEL_VERSION_TTL_SECS", defaults.version_ttl_secs)?,
            engine_binary: env_path("XPANEL_ENGINE_BIN", defaults.engine_binary),
            engine_config: env_path("XPANEL_ENGINE_CONFIG", defaults.engine_config),
            engine_log: env_path("XPANEL_ENGINE_LOG", defaults.engine_log),
            geoip_path: env_path("XPANEL_GEOIP_PATH", defaults.geoip_path),
            geosite_path: env_path("XPANEL_GEOSITE_PATH", defaults.geosite_path),
            database_path: env_path("XPANEL_DB_PATH", defaults.database_path),
            github_api: std::env::var("XPANEL_GITHUB_API").unwrap_or(defaults.github_api),
            engine_repo: std::env::var("XPANEL_ENGINE_REPO").unwrap_or(defaults.engine_repo),
            geo_repo: std::env::var("XPANEL_GEO_REPO").unwrap_or(defaults.geo_repo),
            engine_asset: std::env::var("XPANEL_ENGINE_ASSET").ok().filter(|s| !s.trim().is_empty()),
            http_timeout_secs: env_secs("XPANEL_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
        })
    }

    /// Background status refresh interval.
    pub fn status_tick(&self) -> Duration {
        Duration::from_secs(self.status_tick_secs)
    }

    /// Idle cutoff for background refresh.
    pub fn idle_cutoff(&self) -> Duration {
        Duration::from_secs(self.idle_cutoff_secs)
    }

    /// Version listing TTL.
    pub fn version_ttl(&self) -> Duration {
        Duration::from_secs(self.version_ttl_secs)
    }

    /// On-disk location an installed `kind` is written to.
    pub fn install_path(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Engine => &self.engine_binary,
            AssetKind::GeoIp => &self.geoip_path,
            AssetKind::GeoSite => &self.geosite_path,
        }
    }

    /// Checks the values that would make the panel misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.status_tick_secs == 0 {
            return Err(PanelError::ConfigError("status tick must be at least one second".into()));
        }
        if self.github_api.trim().is_empty() {
            return Err(PanelError::ConfigError("GitHub API URL cannot be empty".into()));
        }
        for repo in [&self.engine_repo, &self.geo_repo] {
            if repo.split('/').filter(|p| !p.is_empty()).count() != 2 {
                return Err(PanelError::ConfigError(format!(
                    "repository must be 'owner/name', got '{repo}'"
                )));
            }
        }
        Ok(())
    }
}

fn env_secs(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| PanelError::ConfigError(format!("{key} must be a number of seconds, got '{v}'"))),
        Err(_) => Ok(default),
    }
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(key).map(PathBuf::from).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.status_tick(), Duration::from_secs(2));
        assert_eq!(config.idle_cutoff(), Duration::from_secs(180));
        assert_eq!(config.version_ttl(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_install_paths_are_distinct() {
        let config = PanelConfig::default();
        let paths: Vec<_> = AssetKind::ALL.iter().map(|k| config.install_path(*k)).collect();
        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[1], paths[2]);
    }

    #[test]
    fn test_validate_rejects_bad_repo() {
        let config = PanelConfig {
            engine_repo: "Xray-core".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PanelError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = PanelConfig {
            status_tick_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = PanelConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PanelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
