//! Collaborator traits for xpanel.
//!
//! The management core never talks to processes, the network, or the disk
//! directly. These traits are the seams it calls through; the supervisor,
//! release, and store crates provide the production implementations and
//! tests provide scripted ones.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::{AssetKind, VersionList};

// ═══════════════════════════════════════════════════════════════════════════════
// STATUS COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Takes one measurement of the supervised engine.
#[async_trait]
pub trait StatusCollector: Send + Sync {
    /// Snapshot type produced by this collector.
    type Snapshot: Send + Sync + 'static;

    /// Collects a new snapshot.
    ///
    /// `previous` is the last stored snapshot, if any, so rates and counters
    /// can be derived. A collector should prefer returning a degraded snapshot
    /// over an error; on error the previous snapshot stays in place.
    async fn collect(&self, previous: Option<&Self::Snapshot>) -> Result<Self::Snapshot>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROCESS SUPERVISION
// ═══════════════════════════════════════════════════════════════════════════════

/// Controls the engine process.
#[async_trait]
pub trait ProcessSupervisor: Send + Sync {
    /// Stops the engine. Stopping an already stopped engine succeeds.
    async fn stop(&self) -> Result<()>;

    /// Restarts the engine, starting it if it is not running.
    async fn restart(&self) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// RELEASES
// ═══════════════════════════════════════════════════════════════════════════════

/// Lists the versions available for an asset kind.
#[async_trait]
pub trait VersionFetcher: Send + Sync {
    /// Fetches the available versions, most recent first.
    async fn fetch_versions(&self, kind: AssetKind) -> Result<VersionList>;
}

/// Downloads an asset version and places it at its expected location.
#[async_trait]
pub trait AssetInstaller: Send + Sync {
    /// Installs `version` of `kind`.
    ///
    /// What remains on disk after a failure is up to the implementation.
    async fn install(&self, kind: AssetKind, version: &str) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORAGE
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads recent engine log lines.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Returns up to `count` of the most recent lines, oldest first.
    async fn read_logs(&self, count: usize) -> Result<Vec<String>>;
}

/// Reads the raw panel database file.
#[async_trait]
pub trait DatabaseStore: Send + Sync {
    /// Returns the database file contents.
    async fn read_database(&self) -> Result<Bytes>;
}

/// Reads the engine's JSON configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the parsed configuration document.
    async fn read_config(&self) -> Result<serde_json::Value>;
}
