//! Version listings cached per asset kind.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use xpanel_core::error::Result;
use xpanel_core::traits::VersionFetcher;
use xpanel_core::types::{AssetKind, VersionList};

use crate::ttl::TtlCache;

/// One TTL slot per [`AssetKind`], all judged against the same TTL.
///
/// Slots are locked independently; a slow fetch for one kind never blocks
/// reads of another, and no lock is held while the fetcher runs.
pub struct VersionCacheSet {
    slots: [TtlCache<VersionList>; 3],
    ttl: Duration,
}

impl VersionCacheSet {
    /// Creates an empty set with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: [TtlCache::new(), TtlCache::new(), TtlCache::new()],
            ttl,
        }
    }

    /// The freshness window applied to every slot.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn slot(&self, kind: AssetKind) -> &TtlCache<VersionList> {
        &self.slots[kind.index()]
    }

    /// Returns the versions for `kind`, fetching them if the slot is stale.
    ///
    /// A failed fetch leaves the stale slot untouched and returns the error;
    /// the next call retries. Concurrent callers on a stale slot may each
    /// fetch, and the last store wins.
    pub async fn get_versions<F>(&self, kind: AssetKind, now: Instant, fetcher: &F) -> Result<VersionList>
    where
        F: VersionFetcher + ?Sized,
    {
        if let Some(versions) = self.slot(kind).get_fresh(self.ttl, now) {
            debug!(%kind, count = versions.len(), "version cache hit");
            return Ok(versions);
        }

        debug!(%kind, "version cache miss, fetching");
        let versions = fetcher.fetch_versions(kind).await?;
        self.slot(kind).store(versions.clone(), now);
        Ok(versions)
    }

    /// Returns the cached versions for `kind` regardless of age.
    pub fn peek(&self, kind: AssetKind) -> Option<VersionList> {
        self.slot(kind).peek()
    }

    /// Empties the slot for `kind` so the next read fetches.
    pub fn invalidate(&self, kind: AssetKind) {
        self.slot(kind).invalidate();
    }

    /// Returns slot statistics as of `now`.
    pub fn stats(&self, now: Instant) -> CacheStats {
        let mut stats = CacheStats::default();
        for kind in AssetKind::ALL {
            let slot = self.slot(kind);
            if slot.refreshed_at().is_none() {
                stats.empty_slots += 1;
            } else if slot.is_fresh(self.ttl, now) {
                stats.fresh_slots += 1;
            } else {
                stats.stale_slots += 1;
            }
        }
        stats
    }
}

/// Version cache statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub fresh_slots: usize,
    pub stale_slots: usize,
    pub empty_slots: usize,
}
