//! Response bodies that are not panel outcomes.

use serde::Serialize;
use xpanel_cache::CacheStats;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Whether background status refresh is running
    pub status_refresh: bool,
    /// Version cache occupancy
    pub version_cache: CacheStats,
}
