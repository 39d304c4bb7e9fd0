//! Engine process supervision for xpanel.
//!
//! [`EngineSupervisor`] spawns the engine with `tokio::process`, stops and
//! restarts it, and doubles as the panel's status collector. [`HostSampler`]
//! adds CPU, memory, load, socket and network readings to each snapshot.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod engine;
mod host;

pub use engine::{parse_version, EngineCommand, EngineSupervisor};
pub use host::HostSampler;
