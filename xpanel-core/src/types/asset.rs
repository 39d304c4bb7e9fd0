//! Installable asset kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PanelError;

/// Ordered release identifiers, most recent first.
pub type VersionList = Vec<String>;

/// One of the three items the panel can list versions for and install.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// The proxy engine binary.
    Engine,
    /// The geoip data file.
    GeoIp,
    /// The geosite data file.
    GeoSite,
}

impl AssetKind {
    /// Every asset kind, in slot order.
    pub const ALL: [AssetKind; 3] = [AssetKind::Engine, AssetKind::GeoIp, AssetKind::GeoSite];

    /// Stable lowercase name used in routes and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Engine => "engine",
            AssetKind::GeoIp => "geoip",
            AssetKind::GeoSite => "geosite",
        }
    }

    /// Position of this kind in [`AssetKind::ALL`].
    pub fn index(&self) -> usize {
        match self {
            AssetKind::Engine => 0,
            AssetKind::GeoIp => 1,
            AssetKind::GeoSite => 2,
        }
    }

    /// Whether the running engine must be stopped before this asset is replaced.
    ///
    /// Only the engine binary itself is locked by the running process; geo-data
    /// files are picked up on the next explicit restart.
    pub fn requires_stop(&self) -> bool {
        matches!(self, AssetKind::Engine)
    }

    /// Returns true for the geo-data kinds.
    pub fn is_geo_data(&self) -> bool {
        !self.requires_stop()
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engine" | "xray" => Ok(AssetKind::Engine),
            "geoip" => Ok(AssetKind::GeoIp),
            "geosite" => Ok(AssetKind::GeoSite),
            other => Err(PanelError::UnknownAssetKind(other.to_string())),
        }
    }
}
