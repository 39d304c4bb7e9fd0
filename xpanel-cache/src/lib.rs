//! TTL caches for xpanel.
//!
//! A generic single-slot cache with caller-supplied freshness windows, and the
//! per-asset-kind set that keeps version listings.

mod ttl;
mod versions;

pub use ttl::{CacheEntry, TtlCache};
pub use versions::{CacheStats, VersionCacheSet};
