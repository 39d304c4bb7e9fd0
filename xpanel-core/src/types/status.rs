//! Status snapshots of the host and the supervised engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the engine process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// The process is alive.
    Running,
    /// The process is not running and no error was recorded.
    #[default]
    Stop,
    /// The process exited or failed to start with an error.
    Error,
}

/// Engine section of a status snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Current lifecycle state
    pub state: EngineState,
    /// Version reported by the engine binary, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Seconds since the current process was spawned
    pub uptime_secs: u64,
    /// Last recorded start/exit error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

/// Used and total amount of a resource, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Amount in use
    pub current: u64,
    /// Capacity
    pub total: u64,
}

/// Byte counters or rates split by direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traffic {
    /// Outbound
    pub sent: u64,
    /// Inbound
    pub recv: u64,
}

/// One raw reading of host metrics, before any delta is derived.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSample {
    /// Global CPU usage, 0-100
    pub cpu_percent: f32,
    /// Logical CPU count
    pub cpu_cores: usize,
    /// Physical memory
    pub mem: Usage,
    /// Swap space
    pub swap: Usage,
    /// 1, 5 and 15 minute load averages
    pub load: [f64; 3],
    /// Host uptime in seconds
    pub uptime_secs: u64,
    /// Open TCP sockets
    pub tcp_count: usize,
    /// Open UDP sockets
    pub udp_count: usize,
    /// Bytes moved over all interfaces since boot
    pub net_traffic: Traffic,
}

/// A point-in-time measurement of the host and the engine.
///
/// Each refresh produces a new value that wholly replaces the previous one.
/// Network rates are derived from the previous snapshot's counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// When this snapshot was taken
    pub collected_at: DateTime<Utc>,
    /// Host metrics
    #[serde(flatten)]
    pub host: HostSample,
    /// Bytes per second over all interfaces since the previous snapshot
    pub net_io: Traffic,
    /// Engine process state
    pub engine: EngineStatus,
}

impl ServerStatus {
    /// Builds the next snapshot from fresh readings and the previous snapshot.
    pub fn next(previous: Option<&ServerStatus>, host: HostSample, engine: EngineStatus) -> Self {
        Self::at(Utc::now(), previous, host, engine)
    }

    /// Same as [`ServerStatus::next`] with an explicit collection time.
    pub fn at(
        collected_at: DateTime<Utc>,
        previous: Option<&ServerStatus>,
        host: HostSample,
        engine: EngineStatus,
    ) -> Self {
        let net_io = previous
            .map(|p| rate(p, collected_at, host.net_traffic))
            .unwrap_or_default();

        Self {
            collected_at,
            host,
            net_io,
            engine,
        }
    }
}

/// Per-second delta of the traffic counters. Counter resets read as zero.
fn rate(previous: &ServerStatus, now: DateTime<Utc>, traffic: Traffic) -> Traffic {
    let elapsed_ms = (now - previous.collected_at).num_milliseconds();
    if elapsed_ms <= 0 {
        return Traffic::default();
    }
    let elapsed_ms = elapsed_ms as u64;
    let per_sec = |now: u64, before: u64| now.saturating_sub(before).saturating_mul(1000) / elapsed_ms;

    Traffic {
        sent: per_sec(traffic.sent, previous.host.net_traffic.sent),
        recv: per_sec(traffic.recv, previous.host.net_traffic.recv),
    }
}
