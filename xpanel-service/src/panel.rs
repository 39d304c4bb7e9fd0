//! The panel facade exposed to the HTTP surface and the CLI.

use std::sync::Arc;

use tracing::info;

use xpanel_cache::{CacheStats, VersionCacheSet};
use xpanel_core::config::PanelConfig;
use xpanel_core::error::Result;
use xpanel_core::traits::*;
use xpanel_core::types::{AssetKind, DatabaseExport, Outcome, ServerStatus, VersionList};

use crate::export::Exporter;
use crate::orchestrator::InstallOrchestrator;
use crate::poller::StatusPoller;
use crate::refresher::StatusRefresher;

/// Status collector producing [`ServerStatus`] snapshots.
pub type DynStatusCollector = dyn StatusCollector<Snapshot = ServerStatus>;

/// The collaborators a [`ServerPanel`] calls through.
#[derive(Clone)]
pub struct PanelServices {
    /// Measures the engine
    pub collector: Arc<DynStatusCollector>,
    /// Stops and restarts the engine
    pub supervisor: Arc<dyn ProcessSupervisor>,
    /// Lists available versions
    pub fetcher: Arc<dyn VersionFetcher>,
    /// Downloads and places assets
    pub installer: Arc<dyn AssetInstaller>,
    /// Engine log lines
    pub logs: Arc<dyn LogStore>,
    /// Panel database file
    pub database: Arc<dyn DatabaseStore>,
    /// Engine configuration document
    pub config: Arc<dyn ConfigStore>,
}

/// Management core of the panel.
///
/// Every operation returns an [`Outcome`]; failures are values, never panics.
pub struct ServerPanel {
    poller: Arc<StatusPoller<ServerStatus>>,
    refresher: StatusRefresher,
    versions: VersionCacheSet,
    orchestrator: InstallOrchestrator,
    exporter: Exporter,
    services: PanelServices,
}

impl ServerPanel {
    /// Creates a panel. Background refresh stays off until
    /// [`ServerPanel::start_background_refresh`] is called.
    pub fn new(config: &PanelConfig, services: PanelServices) -> Self {
        let poller = Arc::new(StatusPoller::new(config.idle_cutoff(), crate::now()));
        let orchestrator = InstallOrchestrator::new(
            services.supervisor.clone(),
            services.installer.clone(),
            poller.clone(),
        );
        let exporter = Exporter::new(
            services.logs.clone(),
            services.database.clone(),
            services.config.clone(),
        );

        Self {
            poller,
            refresher: StatusRefresher::new(config.status_tick()),
            versions: VersionCacheSet::new(config.version_ttl()),
            orchestrator,
            exporter,
            services,
        }
    }

    /// The status poller backing [`ServerPanel::get_status`].
    pub fn poller(&self) -> &Arc<StatusPoller<ServerStatus>> {
        &self.poller
    }

    /// Starts periodic status refresh on the current Tokio runtime.
    /// Returns `Ok(false)` if it was already running.
    ///
    /// # Errors
    ///
    /// Fails with [`xpanel_core::PanelError::StatusUnavailable`] outside a Tokio runtime.
    pub fn start_background_refresh(&self) -> Result<bool> {
        let started = self
            .refresher
            .start(self.poller.clone(), self.services.collector.clone())?;
        if started {
            info!(every_secs = self.refresher.every().as_secs(), "background status refresh started");
        }
        Ok(started)
    }

    /// Stops periodic status refresh and waits for the task to exit.
    pub async fn stop_background_refresh(&self) {
        self.refresher.stop().await;
    }

    /// Returns true while periodic status refresh is running.
    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_running()
    }

    /// Returns the last collected status and marks the panel as watched.
    pub fn get_status(&self) -> Outcome<ServerStatus> {
        match self.poller.on_status_requested(crate::now()) {
            Some(status) => Outcome::ok(status.as_ref().clone()),
            None => Outcome::empty("status not collected yet"),
        }
    }

    /// Returns the available versions of `kind`, cached for the version TTL.
    pub async fn get_versions(&self, kind: AssetKind) -> Outcome<VersionList> {
        let result = self
            .versions
            .get_versions(kind, crate::now(), self.services.fetcher.as_ref())
            .await;
        Outcome::from_result(format!("get {kind} versions"), result)
    }

    /// Installs `version` of `kind`. The engine is stopped first but not restarted.
    pub async fn install_asset(&self, kind: AssetKind, version: &str) -> Outcome<()> {
        self.orchestrator.install_asset(kind, version).await
    }

    /// Stops the engine.
    pub async fn stop_service(&self) -> Outcome<()> {
        self.orchestrator.stop_service().await
    }

    /// Restarts the engine.
    pub async fn restart_service(&self) -> Outcome<()> {
        self.orchestrator.restart_service().await
    }

    /// Returns up to `count` recent engine log lines.
    pub async fn tail_logs(&self, count: usize) -> Outcome<Vec<String>> {
        Outcome::from_result("get logs", self.exporter.tail_logs(count).await)
    }

    /// Returns the database file under its download name.
    pub async fn export_database(&self) -> Outcome<DatabaseExport> {
        Outcome::from_result("export database", self.exporter.export_database().await)
    }

    /// Returns the engine configuration document.
    pub async fn export_config(&self) -> Outcome<serde_json::Value> {
        Outcome::from_result("export config", self.exporter.export_config().await)
    }

    /// Version cache statistics as of now.
    pub fn version_cache_stats(&self) -> CacheStats {
        self.versions.stats(crate::now())
    }
}
