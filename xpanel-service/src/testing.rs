//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use xpanel_core::error::{PanelError, Result};
use xpanel_core::traits::*;
use xpanel_core::types::{AssetKind, EngineState, EngineStatus, HostSample, ServerStatus, Traffic, VersionList};

/// Counts up from 1, remembering which previous value each call saw.
pub struct CountingCollector {
    calls: AtomicUsize,
    fail_next: AtomicBool,
    previous: Mutex<Vec<Option<u64>>>,
}

impl CountingCollector {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            previous: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn previous_seen(&self) -> Vec<Option<u64>> {
        self.previous.lock().clone()
    }
}

#[async_trait]
impl StatusCollector for CountingCollector {
    type Snapshot = u64;

    async fn collect(&self, previous: Option<&u64>) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.previous.lock().push(previous.copied());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PanelError::StatusUnavailable("collector unavailable".into()));
        }
        Ok(previous.map(|p| p + 1).unwrap_or(1))
    }
}

/// Reports a running engine on every call; sent bytes grow by 1000 per call.
pub struct RunningEngineCollector;

#[async_trait]
impl StatusCollector for RunningEngineCollector {
    type Snapshot = ServerStatus;

    async fn collect(&self, previous: Option<&ServerStatus>) -> Result<ServerStatus> {
        let engine = EngineStatus {
            state: EngineState::Running,
            version: Some("1.8.0".into()),
            ..Default::default()
        };
        let sent = previous.map(|p| p.host.net_traffic.sent).unwrap_or(0) + 1000;
        let host = HostSample {
            cpu_cores: 2,
            net_traffic: Traffic { sent, recv: 0 },
            ..Default::default()
        };
        Ok(ServerStatus::next(previous, host, engine))
    }
}

/// Records every call in order so tests can assert on sequencing.
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

/// Supervisor whose stop and restart results are scripted.
pub struct FakeSupervisor {
    pub log: std::sync::Arc<CallLog>,
    pub fail_stop: AtomicBool,
    pub fail_restart: AtomicBool,
}

impl FakeSupervisor {
    pub fn new(log: std::sync::Arc<CallLog>) -> Self {
        Self {
            log,
            fail_stop: AtomicBool::new(false),
            fail_restart: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ProcessSupervisor for FakeSupervisor {
    async fn stop(&self) -> Result<()> {
        self.log.push("stop");
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(PanelError::EngineStopFailed("permission denied".into()));
        }
        Ok(())
    }

    async fn restart(&self) -> Result<()> {
        self.log.push("restart");
        if self.fail_restart.load(Ordering::SeqCst) {
            return Err(PanelError::EngineStartFailed("exit status 23".into()));
        }
        Ok(())
    }
}

/// Installer whose result is scripted.
pub struct FakeInstaller {
    pub log: std::sync::Arc<CallLog>,
    pub fail: AtomicBool,
}

impl FakeInstaller {
    pub fn new(log: std::sync::Arc<CallLog>) -> Self {
        Self {
            log,
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AssetInstaller for FakeInstaller {
    async fn install(&self, kind: AssetKind, version: &str) -> Result<()> {
        self.log.push(format!("install {kind} {version}"));
        if self.fail.load(Ordering::SeqCst) {
            return Err(PanelError::InstallFailed {
                kind,
                version: version.to_string(),
                reason: "HTTP 404".into(),
            });
        }
        Ok(())
    }
}

/// Fetcher returning scripted listings in order.
pub struct FakeFetcher {
    responses: Mutex<VecDeque<Result<VersionList>>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new(responses: Vec<Result<VersionList>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionFetcher for FakeFetcher {
    async fn fetch_versions(&self, kind: AssetKind) -> Result<VersionList> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(PanelError::VersionFetchFailed {
                kind,
                reason: "no scripted response".into(),
            })
        })
    }
}

/// Release collaborators that park engine listings and every install until
/// the gate is opened.
pub struct GatedReleases {
    gate: Semaphore,
    entered: Semaphore,
}

impl GatedReleases {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            entered: Semaphore::new(0),
        }
    }

    /// Waits until `calls` collaborator calls are parked at the gate.
    pub async fn wait_parked(&self, calls: u32) {
        self.entered.acquire_many(calls).await.unwrap().forget();
    }

    /// Lets `calls` parked calls through.
    pub fn open(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    async fn park(&self) {
        self.entered.add_permits(1);
        self.gate.acquire().await.unwrap().forget();
    }
}

#[async_trait]
impl VersionFetcher for GatedReleases {
    async fn fetch_versions(&self, kind: AssetKind) -> Result<VersionList> {
        if kind == AssetKind::Engine {
            self.park().await;
        }
        Ok(vec![format!("{kind}-1")])
    }
}

#[async_trait]
impl AssetInstaller for GatedReleases {
    async fn install(&self, _kind: AssetKind, _version: &str) -> Result<()> {
        self.park().await;
        Ok(())
    }
}

/// In-memory log, database, and config stores that count reads.
pub struct FakeStores {
    pub lines: Vec<String>,
    pub database: Bytes,
    pub config: serde_json::Value,
    pub reads: AtomicUsize,
}

impl FakeStores {
    pub fn new() -> Self {
        Self {
            lines: (1..=5).map(|i| format!("line {i}")).collect(),
            database: Bytes::from_static(b"SQLite format 3\0"),
            config: serde_json::json!({ "log": { "loglevel": "warning" } }),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogStore for FakeStores {
    async fn read_logs(&self, count: usize) -> Result<Vec<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let skip = self.lines.len().saturating_sub(count);
        Ok(self.lines[skip..].to_vec())
    }
}

#[async_trait]
impl DatabaseStore for FakeStores {
    async fn read_database(&self) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.database.clone())
    }
}

#[async_trait]
impl ConfigStore for FakeStores {
    async fn read_config(&self) -> Result<serde_json::Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.config.clone())
    }
}
