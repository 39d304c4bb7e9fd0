//! # xpanel Core
//!
//! Core types, errors, and collaborator traits for the xpanel management core.
//!
//! This crate provides the foundational building blocks used by all other xpanel crates:
//!
//! - **Types**: asset kinds, version lists, status snapshots, and operation outcomes
//! - **Errors**: one error enum for every collaborator and validation failure
//! - **Constants**: default intervals, TTLs, file names, and release sources
//! - **Traits**: the seams to the process supervisor, release fetcher, installer and stores
//! - **Config**: panel configuration loaded from defaults or the environment
//!
//! ## Example
//!
//! ```rust
//! use xpanel_core::{AssetKind, Outcome};
//!
//! let kind: AssetKind = "geoip".parse().unwrap();
//! assert!(!kind.requires_stop());
//!
//! let outcome: Outcome<()> = Outcome::failure("install geoip", "connection reset");
//! assert!(!outcome.success);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod config;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use config::PanelConfig;
pub use constants::*;
pub use error::{PanelError, Result};
pub use traits::*;
pub use types::*;
