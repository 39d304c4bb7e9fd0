//! File-backed storage for xpanel.
//!
//! - [`FileLogStore`]: tail of the engine log
//! - [`FileDatabaseStore`]: raw panel database bytes for download
//! - [`FileConfigStore`]: engine JSON config

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod files;
mod logs;

pub use files::{FileConfigStore, FileDatabaseStore};
pub use logs::FileLogStore;
