//! Install, stop and restart orchestration.

use std::sync::Arc;

use tracing::{info, instrument};

use xpanel_core::error::Result;
use xpanel_core::traits::{AssetInstaller, ProcessSupervisor};
use xpanel_core::types::{AssetKind, Outcome};

use crate::poller::ActivityTracker;
use crate::validate::validate_version;

/// Drives stop, install and restart against the supervisor and installer.
///
/// Each entry point returns a single outcome. Nothing is retried or rolled
/// back, and a successful install never restarts the engine by itself.
pub struct InstallOrchestrator {
    supervisor: Arc<dyn ProcessSupervisor>,
    installer: Arc<dyn AssetInstaller>,
    activity: Arc<dyn ActivityTracker>,
}

impl InstallOrchestrator {
    /// Creates an orchestrator reporting activity to `activity`.
    pub fn new(
        supervisor: Arc<dyn ProcessSupervisor>,
        installer: Arc<dyn AssetInstaller>,
        activity: Arc<dyn ActivityTracker>,
    ) -> Self {
        Self {
            supervisor,
            installer,
            activity,
        }
    }

    /// Installs `version` of `kind`.
    ///
    /// The engine is stopped first; a failed stop aborts the install. Geo-data
    /// installs leave the engine running.
    #[instrument(skip(self))]
    pub async fn install_asset(&self, kind: AssetKind, version: &str) -> Outcome<()> {
        let action = format!("install {kind} {version}");
        if let Err(err) = validate_version(version) {
            return Outcome::failure(action, err);
        }

        self.activity.mark_active(crate::now());

        if kind.requires_stop() {
            if let Err(err) = self.supervisor.stop().await {
                return Outcome::failure(action, err);
            }
        }

        let result = self.installer.install(kind, version).await;
        if result.is_ok() {
            info!(%kind, version, "asset installed");
        }
        Outcome::from_unit(action, result)
    }

    /// Stops the engine.
    #[instrument(skip(self))]
    pub async fn stop_service(&self) -> Outcome<()> {
        self.activity.mark_active(crate::now());
        Outcome::from_unit("stop engine", self.supervisor.stop().await)
    }

    /// Restarts the engine.
    #[instrument(skip(self))]
    pub async fn restart_service(&self) -> Outcome<()> {
        Outcome::from_unit("restart engine", self.supervisor.restart().await)
    }
}

/// Installs without a supervised engine, e.g. from the command line.
///
/// The version goes through the same check as [`InstallOrchestrator::install_asset`].
/// Nothing is stopped: the caller must make sure the engine is not running
/// before replacing its binary.
#[instrument(skip(installer))]
pub async fn install_unsupervised(installer: &dyn AssetInstaller, kind: AssetKind, version: &str) -> Result<()> {
    validate_version(version)?;
    installer.install(kind, version).await?;
    info!(%kind, version, "asset installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    use xpanel_core::types::ServerStatus;

    use crate::poller::StatusPoller;
    use crate::testing::{CallLog, FakeInstaller, FakeSupervisor};

    struct Fixture {
        log: Arc<CallLog>,
        supervisor: Arc<FakeSupervisor>,
        installer: Arc<FakeInstaller>,
        poller: Arc<StatusPoller<ServerStatus>>,
        orchestrator: InstallOrchestrator,
    }

    fn fixture(created: Instant) -> Fixture {
        let log = Arc::new(CallLog::default());
        let supervisor = Arc::new(FakeSupervisor::new(log.clone()));
        let installer = Arc::new(FakeInstaller::new(log.clone()));
        let poller = Arc::new(StatusPoller::new(Duration::from_secs(180), created));
        let orchestrator = InstallOrchestrator::new(supervisor.clone(), installer.clone(), poller.clone());
        Fixture {
            log,
            supervisor,
            installer,
            poller,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_engine_install_stops_first() {
        let f = fixture(Instant::now());
        let outcome = f.orchestrator.install_asset(AssetKind::Engine, "v1.8.0").await;

        assert!(outcome.success, "{}", outcome.msg);
        assert_eq!(f.log.calls(), vec!["stop", "install engine v1.8.0"]);
    }

    #[tokio::test]
    async fn test_geo_install_does_not_touch_engine() {
        let f = fixture(Instant::now());
        let outcome = f.orchestrator.install_asset(AssetKind::GeoSite, "202406010000").await;

        assert!(outcome.success);
        assert_eq!(f.log.calls(), vec!["install geosite 202406010000"]);
    }

    #[tokio::test]
    async fn test_install_never_restarts() {
        let f = fixture(Instant::now());
        f.orchestrator.install_asset(AssetKind::Engine, "v1.8.0").await;
        assert!(!f.log.calls().iter().any(|c| c == "restart"));
    }

    #[tokio::test]
    async fn test_installer_failure_is_surfaced() {
        let f = fixture(Instant::now());
        f.installer.fail.store(true, Ordering::SeqCst);

        let outcome = f.orchestrator.install_asset(AssetKind::GeoIp, "202406010000").await;

        assert!(!outcome.success);
        assert!(outcome.msg.contains("HTTP 404"), "{}", outcome.msg);
    }

    #[tokio::test]
    async fn test_stop_failure_aborts_install() {
        let f = fixture(Instant::now());
        f.supervisor.fail_stop.store(true, Ordering::SeqCst);

        let outcome = f.orchestrator.install_asset(AssetKind::Engine, "v1.8.0").await;

        assert!(!outcome.success);
        assert_eq!(f.log.calls(), vec!["stop"]);
    }

    #[tokio::test]
    async fn test_invalid_version_rejected_before_collaborators() {
        let f = fixture(Instant::now());
        let outcome = f.orchestrator.install_asset(AssetKind::Engine, "../v1").await;

        assert!(!outcome.success);
        assert!(f.log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_install_marks_panel_active() {
        let created = crate::now();
        let f = fixture(created);
        std::thread::sleep(Duration::from_millis(5));

        f.orchestrator.install_asset(AssetKind::GeoIp, "202406010000").await;

        assert!(f.poller.last_requested() > created);
    }

    #[tokio::test]
    async fn test_stop_and_restart_delegate() {
        let f = fixture(Instant::now());

        assert!(f.orchestrator.stop_service().await.success);
        assert!(f.orchestrator.restart_service().await.success);
        assert_eq!(f.log.calls(), vec!["stop", "restart"]);
    }

    #[tokio::test]
    async fn test_unsupervised_install_checks_version() {
        let f = fixture(Instant::now());

        let err = install_unsupervised(f.installer.as_ref(), AssetKind::Engine, "v1/../../x")
            .await
            .unwrap_err();

        assert!(err.is_validation_error());
        assert!(f.log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unsupervised_install_calls_installer_only() {
        let f = fixture(Instant::now());

        install_unsupervised(f.installer.as_ref(), AssetKind::Engine, "v1.8.1")
            .await
            .unwrap();

        assert_eq!(f.log.calls(), vec!["install engine v1.8.1"]);
    }

    #[tokio::test]
    async fn test_restart_failure_is_surfaced() {
        let f = fixture(Instant::now());
        f.supervisor.fail_restart.store(true, Ordering::SeqCst);

        let outcome = f.orchestrator.restart_service().await;
        assert!(!outcome.success);
        assert!(outcome.msg.starts_with("restart engine failed"));
    }
}
