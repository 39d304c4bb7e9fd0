//! Release sources for xpanel.
//!
//! Lists engine and geo-data versions from GitHub releases and installs
//! the matching assets onto disk. Engine releases ship as zip archives; the
//! executable is unpacked before it replaces the installed binary.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod github;
mod installer;
mod platform;

pub use github::{Release, ReleaseAsset, ReleaseClient, ReleaseConfig};
pub use installer::{write_atomically, InstallTargets, ReleaseInstaller};
pub use platform::{current_platform_tag, default_engine_asset, engine_archive_entry, is_zip_asset, platform_tag};
