//! Engine child process supervision.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use xpanel_core::config::PanelConfig;
use xpanel_core::error::{PanelError, Result};
use xpanel_core::traits::{ProcessSupervisor, StatusCollector};
use xpanel_core::types::{EngineState, EngineStatus, ServerStatus};

use crate::host::HostSampler;

const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);
const VERSION_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Program and arguments used to launch the engine.
#[derive(Clone, Debug)]
pub struct EngineCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl EngineCommand {
    /// Launches `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `<engine_binary> run -c <engine_config>`.
    pub fn for_panel(config: &PanelConfig) -> Self {
        Self::new(&config.engine_binary)
            .arg("run")
            .arg("-c")
            .arg(&config.engine_config)
    }

    /// Program path.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[derive(Default)]
struct EngineProcess {
    child: Option<Child>,
    started_at: Option<Instant>,
    last_error: Option<String>,
    version: Option<String>,
    version_queried: bool,
    /// Bumped on every spawn so a late version query cannot label a newer process.
    generation: u64,
}

impl EngineProcess {
    /// Notices an engine that exited on its own.
    fn reap(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        match child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                warn!(%status, "engine exited");
                self.last_error = Some(format!("engine exited with {status}"));
                self.child = None;
                self.started_at = None;
            }
            Err(e) => {
                self.last_error = Some(format!("failed to poll engine: {e}"));
            }
        }
    }

    fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

/// Supervises the engine as a child process.
///
/// The child is killed when the supervisor is dropped.
pub struct EngineSupervisor {
    command: EngineCommand,
    process: Mutex<EngineProcess>,
    host: Arc<HostSampler>,
    stop_timeout: Duration,
}

impl EngineSupervisor {
    /// Creates a supervisor; nothing is spawned until [`EngineSupervisor::start`].
    pub fn new(command: EngineCommand) -> Self {
        Self {
            command,
            process: Mutex::new(EngineProcess::default()),
            host: Arc::new(HostSampler::new()),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Sets how long [`ProcessSupervisor::stop`] waits for the engine to exit.
    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    /// Starts the engine. Starting a running engine is a no-op.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let mut process = self.process.lock().await;
        self.start_locked(&mut process)
    }

    /// Returns true while the engine process is alive.
    pub async fn is_running(&self) -> bool {
        let mut process = self.process.lock().await;
        process.reap();
        process.is_running()
    }

    /// OS process id of the running engine.
    pub async fn pid(&self) -> Result<u32> {
        let mut process = self.process.lock().await;
        process.reap();
        process
            .child
            .as_ref()
            .and_then(Child::id)
            .ok_or(PanelError::EngineNotRunning)
    }

    /// Current engine state, uptime and version.
    ///
    /// The first call after a spawn runs `<engine> version`; the process lock
    /// is released while that query runs.
    pub async fn engine_status(&self) -> EngineStatus {
        let pending_query = {
            let mut process = self.process.lock().await;
            process.reap();
            if process.is_running() && !process.version_queried {
                process.version_queried = true;
                Some(process.generation)
            } else {
                None
            }
        };

        let queried = match pending_query {
            Some(generation) => Some((generation, query_version(&self.command).await)),
            None => None,
        };

        let mut process = self.process.lock().await;
        if let Some((generation, version)) = queried {
            if process.generation == generation {
                process.version = version;
            }
        }
        process.reap();

        let state = if process.is_running() {
            EngineState::Running
        } else if process.last_error.is_some() {
            EngineState::Error
        } else {
            EngineState::Stop
        };

        EngineStatus {
            state,
            version: process.version.clone(),
            uptime_secs: process.started_at.map(|t| t.elapsed().as_secs()).unwrap_or(0),
            error_msg: process.last_error.clone(),
        }
    }

    fn start_locked(&self, process: &mut EngineProcess) -> Result<()> {
        process.reap();
        if process.is_running() {
            return Ok(());
        }

        match self.command.build().spawn() {
            Ok(child) => {
                info!(pid = child.id(), program = %self.command.program.display(), "engine started");
                process.child = Some(child);
                process.started_at = Some(Instant::now());
                process.last_error = None;
                process.version = None;
                process.version_queried = false;
                process.generation += 1;
                Ok(())
            }
            Err(e) => {
                let msg = format!("{}: {e}", self.command.program.display());
                process.last_error = Some(msg.clone());
                Err(PanelError::EngineStartFailed(msg))
            }
        }
    }

    async fn stop_locked(&self, process: &mut EngineProcess) -> Result<()> {
        process.reap();
        let Some(child) = process.child.as_mut() else {
            return Ok(());
        };

        child
            .start_kill()
            .map_err(|e| PanelError::EngineStopFailed(e.to_string()))?;

        match timeout(self.stop_timeout, child.wait()).await {
            Ok(Ok(status)) => debug!(%status, "engine stopped"),
            Ok(Err(e)) => return Err(PanelError::EngineStopFailed(e.to_string())),
            Err(_) => {
                return Err(PanelError::EngineStopFailed(format!(
                    "engine did not exit within {}s",
                    self.stop_timeout.as_secs()
                )))
            }
        }

        process.child = None;
        process.started_at = None;
        process.last_error = None;
        info!("engine stopped");
        Ok(())
    }
}

#[async_trait]
impl ProcessSupervisor for EngineSupervisor {
    #[instrument(skip(self))]
    async fn stop(&self) -> Result<()> {
        let mut process = self.process.lock().await;
        self.stop_locked(&mut process).await
    }

    #[instrument(skip(self))]
    async fn restart(&self) -> Result<()> {
        let mut process = self.process.lock().await;
        self.stop_locked(&mut process).await?;
        self.start_locked(&mut process)
    }
}

#[async_trait]
impl StatusCollector for EngineSupervisor {
    type Snapshot = ServerStatus;

    async fn collect(&self, previous: Option<&ServerStatus>) -> Result<ServerStatus> {
        let host = self.host.clone();
        let host = tokio::task::spawn_blocking(move || host.sample())
            .await
            .map_err(|e| PanelError::StatusUnavailable(format!("host sampling failed: {e}")))?;

        Ok(ServerStatus::next(previous, host, self.engine_status().await))
    }
}

/// Runs `<program> version` and parses the reported version.
async fn query_version(command: &EngineCommand) -> Option<String> {
    let output = Command::new(&command.program)
        .arg("version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    match timeout(VERSION_QUERY_TIMEOUT, output).await {
        Ok(Ok(out)) if out.status.success() => parse_version(&String::from_utf8_lossy(&out.stdout)),
        Ok(Ok(_)) | Ok(Err(_)) | Err(_) => {
            debug!("engine version query failed");
            None
        }
    }
}

/// Extracts the version from the first line of `version` output,
/// e.g. `Xray 1.8.4 (Xray, Penetrates Everything.) ...`.
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .filter(|v| v.starts_with(|c: char| c.is_ascii_digit()))
        .map(str::to_string)
}
