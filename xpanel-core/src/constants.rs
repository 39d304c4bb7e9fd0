//! Panel constants for xpanel.
//!
//! Defaults for the background status refresh, the version cache, and the
//! release sources of the engine and its geo-data assets.

// ═══════════════════════════════════════════════════════════════════════════════
// STATUS REFRESH
// ═══════════════════════════════════════════════════════════════════════════════

/// Interval between background status refresh ticks, in seconds.
/// While the panel is watched, the cached snapshot is at most one tick old.
pub const DEFAULT_STATUS_TICK_SECS: u64 = 2;

/// Time since the last status read after which background refresh is suspended.
pub const DEFAULT_IDLE_CUTOFF_SECS: u64 = 180;

// ═══════════════════════════════════════════════════════════════════════════════
// VERSION CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum age of a cached version listing, in seconds.
pub const DEFAULT_VERSION_TTL_SECS: u64 = 60;

// ═══════════════════════════════════════════════════════════════════════════════
// EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

/// File name attached to database downloads.
pub const DATABASE_EXPORT_FILENAME: &str = "x-ui.db";

/// Upper bound for a single log tail request.
pub const MAX_LOG_LINES: usize = 10_000;

// ═══════════════════════════════════════════════════════════════════════════════
// RELEASE SOURCES
// ═══════════════════════════════════════════════════════════════════════════════

/// Base URL of the GitHub REST API.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Repository publishing engine releases.
pub const DEFAULT_ENGINE_REPO: &str = "XTLS/Xray-core";

/// Repository publishing the geoip and geosite data files.
pub const DEFAULT_GEO_REPO: &str = "Loyalsoldier/v2ray-rules-dat";

/// Release asset name of the geoip data file.
pub const GEOIP_ASSET_NAME: &str = "geoip.dat";

/// Release asset name of the geosite data file.
pub const GEOSITE_ASSET_NAME: &str = "geosite.dat";

/// Number of releases requested per listing.
pub const RELEASES_PER_PAGE: u32 = 20;

/// HTTP timeout for release listings and downloads, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
