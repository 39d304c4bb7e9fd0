//! Staleness-gated status poller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use xpanel_core::traits::StatusCollector;

/// Something that wants to know the panel is being used.
pub trait ActivityTracker: Send + Sync {
    /// Records activity at `now`, postponing idle suppression.
    fn mark_active(&self, now: Instant);
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nobody read the status within the idle cutoff.
    Skipped,
    /// A new snapshot was stored.
    Refreshed,
    /// The collector failed; the previous snapshot was kept.
    Failed,
}

struct PollerState<S> {
    snapshot: Option<Arc<S>>,
    last_requested: Instant,
}

/// Holds the latest status snapshot and refreshes it only while it is watched.
///
/// Reads never measure: they return whatever the last successful tick
/// stored. Ticks do nothing once no read has happened for longer than the
/// idle cutoff. Snapshot and idle marker share one lock, which is never held
/// while the collector runs.
pub struct StatusPoller<S> {
    state: Mutex<PollerState<S>>,
    idle_cutoff: Duration,
}

impl<S: Send + Sync + 'static> StatusPoller<S> {
    /// Creates an empty poller whose idle marker starts at `now`.
    pub fn new(idle_cutoff: Duration, now: Instant) -> Self {
        Self {
            state: Mutex::new(PollerState {
                snapshot: None,
                last_requested: now,
            }),
            idle_cutoff,
        }
    }

    /// The idle cutoff this poller was created with.
    pub fn idle_cutoff(&self) -> Duration {
        self.idle_cutoff
    }

    /// Records a status read at `now` and returns the stored snapshot.
    ///
    /// Returns `None` until the first successful tick.
    pub fn on_status_requested(&self, now: Instant) -> Option<Arc<S>> {
        let mut state = self.state.lock();
        state.last_requested = now;
        state.snapshot.clone()
    }

    /// Returns the stored snapshot without counting as a read.
    pub fn current(&self) -> Option<Arc<S>> {
        self.state.lock().snapshot.clone()
    }

    /// Time of the last status read or recorded activity.
    pub fn last_requested(&self) -> Instant {
        self.state.lock().last_requested
    }

    /// Returns true if background refresh would be skipped at `now`.
    pub fn is_idle(&self, now: Instant) -> bool {
        let last = self.state.lock().last_requested;
        now.saturating_duration_since(last) > self.idle_cutoff
    }

    /// Runs one refresh tick at `now`.
    ///
    /// When active, the collector receives the previous snapshot and its
    /// result replaces it unconditionally. A collector error keeps the
    /// previous snapshot.
    pub async fn on_tick<C>(&self, now: Instant, collector: &C) -> TickOutcome
    where
        C: StatusCollector<Snapshot = S> + ?Sized,
    {
        let previous = {
            let state = self.state.lock();
            if now.saturating_duration_since(state.last_requested) > self.idle_cutoff {
                return TickOutcome::Skipped;
            }
            state.snapshot.clone()
        };

        match collector.collect(previous.as_deref()).await {
            Ok(snapshot) => {
                self.state.lock().snapshot = Some(Arc::new(snapshot));
                TickOutcome::Refreshed
            }
            Err(err) => {
                warn!(
                    error = %err,
                    recoverable = err.is_recoverable(),
                    "status refresh failed, keeping previous snapshot"
                );
                TickOutcome::Failed
            }
        }
    }
}

impl<S: Send + Sync + 'static> ActivityTracker for StatusPoller<S> {
    fn mark_active(&self, now: Instant) {
        let mut state = self.state.lock();
        if now > state.last_requested {
            state.last_requested = now;
            debug!("panel activity recorded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingCollector;

    const CUTOFF: Duration = Duration::from_secs(180);

    fn secs(t0: Instant, s: u64) -> Instant {
        t0 + Duration::from_secs(s)
    }

    #[tokio::test]
    async fn test_read_before_first_tick_is_empty() {
        let t0 = Instant::now();
        let poller: StatusPoller<u64> = StatusPoller::new(CUTOFF, t0);
        assert!(poller.on_status_requested(t0).is_none());
    }

    #[tokio::test]
    async fn test_idle_scenario() {
        let t0 = Instant::now();
        let poller = StatusPoller::new(CUTOFF, t0);
        let collector = CountingCollector::new();

        assert_eq!(poller.on_tick(t0, &collector).await, TickOutcome::Refreshed);
        let first = poller.current().unwrap();

        assert_eq!(poller.on_tick(secs(t0, 200), &collector).await, TickOutcome::Skipped);
        assert_eq!(collector.calls(), 1);

        let read = poller.on_status_requested(secs(t0, 205)).unwrap();
        assert!(Arc::ptr_eq(&read, &first));
        assert_eq!(poller.last_requested(), secs(t0, 205));

        assert_eq!(poller.on_tick(secs(t0, 206), &collector).await, TickOutcome::Refreshed);
        assert_eq!(collector.calls(), 2);
    }

    #[tokio::test]
    async fn test_tick_exactly_at_cutoff_refreshes() {
        let t0 = Instant::now();
        let poller = StatusPoller::new(CUTOFF, t0);
        let collector = CountingCollector::new();

        assert_eq!(poller.on_tick(secs(t0, 180), &collector).await, TickOutcome::Refreshed);
        assert_eq!(poller.on_tick(secs(t0, 181), &collector).await, TickOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_repeated_reads_return_identical_snapshot() {
        let t0 = Instant::now();
        let poller = StatusPoller::new(CUTOFF, t0);
        poller.on_tick(t0, &CountingCollector::new()).await;

        let a = poller.on_status_requested(secs(t0, 1)).unwrap();
        let b = poller.on_status_requested(secs(t0, 2)).unwrap();
        let c = poller.on_status_requested(secs(t0, 3)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn test_previous_snapshot_is_passed_to_next_tick() {
        let t0 = Instant::now();
        let poller = StatusPoller::new(CUTOFF, t0);
        let collector = CountingCollector::new();

        poller.on_tick(t0, &collector).await;
        let stored = *poller.current().unwrap();
        poller.on_tick(secs(t0, 2), &collector).await;

        assert_eq!(collector.previous_seen(), vec![None, Some(stored)]);
        assert_eq!(*poller.current().unwrap(), stored + 1);
    }

    #[tokio::test]
    async fn test_failed_tick_keeps_previous_snapshot() {
        let t0 = Instant::now();
        let poller = StatusPoller::new(CUTOFF, t0);
        let collector = CountingCollector::new();

        poller.on_tick(t0, &collector).await;
        let before = poller.current().unwrap();

        collector.fail_next();
        assert_eq!(poller.on_tick(secs(t0, 2), &collector).await, TickOutcome::Failed);

        let after = poller.current().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_idle_tick_leaves_snapshot_untouched() {
        let t0 = Instant::now();
        let poller = StatusPoller::new(CUTOFF, t0);
        let collector = CountingCollector::new();
        poller.on_tick(t0, &collector).await;
        let before = poller.current().unwrap();

        poller.on_tick(secs(t0, 500), &collector).await;

        assert!(Arc::ptr_eq(&before, &poller.current().unwrap()));
        assert!(poller.is_idle(secs(t0, 500)));
    }

    #[tokio::test]
    async fn test_mark_active_postpones_idle() {
        let t0 = Instant::now();
        let poller: StatusPoller<u64> = StatusPoller::new(CUTOFF, t0);

        poller.mark_active(secs(t0, 100));
        assert!(!poller.is_idle(secs(t0, 250)));

        // Never moves the marker backwards.
        poller.mark_active(secs(t0, 50));
        assert_eq!(poller.last_requested(), secs(t0, 100));
    }

    #[tokio::test]
    async fn test_concurrent_reads_during_ticks() {
        let t0 = Instant::now();
        let poller = Arc::new(StatusPoller::new(CUTOFF, t0));
        let collector = Arc::new(CountingCollector::new());

        let readers: Vec<_> = (0..16)
            .map(|i| {
                let poller = poller.clone();
                tokio::spawn(async move {
                    for j in 0..50u64 {
                        poller.on_status_requested(secs(t0, i + j));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for s in 0..20 {
            poller.on_tick(secs(t0, s), collector.as_ref()).await;
        }
        for r in readers {
            r.await.unwrap();
        }

        assert_eq!(*poller.current().unwrap(), 20);
    }
}
