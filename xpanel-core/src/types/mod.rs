//! Domain types for xpanel.
//!
//! - [`AssetKind`]: the engine binary or one of the two geo-data files
//! - [`VersionList`]: release identifiers, most recent first
//! - [`ServerStatus`]: one point-in-time measurement of the engine
//! - [`Outcome`]: the success/failure envelope returned by panel operations
//! - [`DatabaseExport`]: database bytes plus their download file name

mod asset;
mod outcome;
mod status;

pub use asset::*;
pub use outcome::*;
pub use status::*;
