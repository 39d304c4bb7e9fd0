//! Background status refresh task.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use xpanel_core::error::{PanelError, Result};
use xpanel_core::traits::StatusCollector;

use crate::poller::{StatusPoller, TickOutcome};

struct Running {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the periodic task that ticks a [`StatusPoller`].
///
/// Nothing runs until [`StatusRefresher::start`] is called, and
/// [`StatusRefresher::stop`] waits for the task to exit. Ticks run one after
/// another; a slow collection delays the next tick instead of overlapping it.
pub struct StatusRefresher {
    every: Duration,
    running: Mutex<Option<Running>>,
}

impl StatusRefresher {
    /// Creates a stopped refresher that will tick every `every` once started.
    pub fn new(every: Duration) -> Self {
        Self {
            every,
            running: Mutex::new(None),
        }
    }

    /// Tick interval.
    pub fn every(&self) -> Duration {
        self.every
    }

    /// Returns true while the background task is alive.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .map(|r| !r.handle.is_finished())
            .unwrap_or(false)
    }

    /// Spawns the refresh task on the current Tokio runtime.
    ///
    /// Returns `Ok(false)` without spawning if a task is already running.
    ///
    /// # Errors
    ///
    /// [`PanelError::StatusUnavailable`] when called outside a Tokio runtime.
    pub fn start<S, C>(&self, poller: Arc<StatusPoller<S>>, collector: Arc<C>) -> Result<bool>
    where
        S: Send + Sync + 'static,
        C: StatusCollector<Snapshot = S> + ?Sized + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| PanelError::StatusUnavailable(format!("status refresh needs a Tokio runtime: {e}")))?;

        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Ok(false);
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let every = self.every;

        let handle = runtime.spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(interval_secs = every.as_secs(), "starting status refresher");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = tokio::time::Instant::now().into_std();
                        if poller.on_tick(now, collector.as_ref()).await == TickOutcome::Skipped {
                            debug!("panel idle, status refresh skipped");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("status refresher stopped");
        });

        *running = Some(Running { shutdown_tx, handle });
        Ok(true)
    }

    /// Signals the task to exit and waits for it. Stopping a stopped refresher is a no-op.
    pub async fn stop(&self) {
        let running = self.running.lock().take();
        if let Some(Running { shutdown_tx, handle }) = running {
            let _ = shutdown_tx.send(true);
            let _ = handle.await;
        }
    }
}

impl Drop for StatusRefresher {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.handle.abort();
        }
    }
}
