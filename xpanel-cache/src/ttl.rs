//! Single-slot TTL cache.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A cached value and the instant it was last refreshed.
///
/// A value without a refresh timestamp is never handed out.
#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    value: Option<T>,
    refreshed_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    /// An entry that has never been filled.
    pub const fn empty() -> Self {
        Self {
            value: None,
            refreshed_at: None,
        }
    }

    /// Returns true if the entry was refreshed no longer than `ttl` before `now`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        match self.refreshed_at {
            Some(at) => now.saturating_duration_since(at) <= ttl,
            None => false,
        }
    }

    /// The stored value, if the entry was ever filled.
    pub fn value(&self) -> Option<&T> {
        self.refreshed_at.and(self.value.as_ref())
    }

    /// When the entry was last refreshed.
    pub fn refreshed_at(&self) -> Option<Instant> {
        self.refreshed_at
    }
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Thread-safe single-slot cache.
///
/// The value and its timestamp live under one lock and are always replaced
/// together. Callers supply both the TTL and the current instant, so the
/// same slot can be judged against different windows.
pub struct TtlCache<T> {
    entry: Mutex<CacheEntry<T>>,
}

impl<T> TtlCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entry: Mutex::new(CacheEntry::empty()),
        }
    }

    /// Returns true if the slot holds a value refreshed within `ttl` of `now`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        self.entry.lock().is_fresh(ttl, now)
    }

    /// Replaces the value and stamps it with `now`.
    pub fn store(&self, value: T, now: Instant) {
        let mut entry = self.entry.lock();
        entry.value = Some(value);
        entry.refreshed_at = Some(now);
    }

    /// When the slot was last refreshed.
    pub fn refreshed_at(&self) -> Option<Instant> {
        self.entry.lock().refreshed_at
    }

    /// Empties the slot.
    pub fn invalidate(&self) {
        *self.entry.lock() = CacheEntry::empty();
    }
}

impl<T: Clone> TtlCache<T> {
    /// Returns a copy of the value if it is still fresh.
    pub fn get_fresh(&self, ttl: Duration, now: Instant) -> Option<T> {
        let entry = self.entry.lock();
        if entry.is_fresh(ttl, now) {
            entry.value().cloned()
        } else {
            None
        }
    }

    /// Returns a copy of the stored value regardless of its age.
    pub fn peek(&self) -> Option<T> {
        self.entry.lock().value().cloned()
    }
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
