//! # xpanel Service
//!
//! The management core of the panel:
//!
//! - [`StatusPoller`]: holds the latest engine snapshot, refreshed only while watched
//! - [`StatusRefresher`]: explicit start/stop lifecycle for the periodic refresh
//! - [`InstallOrchestrator`]: stop, install and restart with single outcomes
//! - [`Exporter`]: log, database and config pass-through with input checks
//! - [`ServerPanel`]: the facade combining all of the above with the version cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use xpanel_service::{PanelServices, ServerPanel};
//!
//! let panel = ServerPanel::new(&config, services);
//! panel.start_background_refresh()?;
//!
//! let status = panel.get_status();
//! let versions = panel.get_versions(AssetKind::Engine).await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod export;
mod orchestrator;
mod panel;
mod poller;
mod refresher;
pub mod validate;

#[cfg(test)]
mod testing;

pub use export::Exporter;
pub use orchestrator::{install_unsupervised, InstallOrchestrator};
pub use panel::{DynStatusCollector, PanelServices, ServerPanel};
pub use poller::{ActivityTracker, StatusPoller, TickOutcome};
pub use refresher::StatusRefresher;

/// Current instant on the Tokio clock, so paused-time tests drive the poller too.
pub(crate) fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}
