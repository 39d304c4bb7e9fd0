//! Error types for xpanel.
//!
//! This module provides the error hierarchy using `thiserror`.
//! Every collaborator failure maps onto one of these variants so the panel
//! surface can turn it into a labeled failure outcome.

use thiserror::Error;

use crate::types::AssetKind;

/// Result type alias using `PanelError`.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Main error type for all xpanel operations.
#[derive(Debug, Error)]
pub enum PanelError {
    // ═══════════════════════════════════════════════════════════════════════════
    // PROCESS CONTROL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The engine process could not be started.
    #[error("Failed to start engine: {0}")]
    EngineStartFailed(String),

    /// The engine process could not be stopped.
    #[error("Failed to stop engine: {0}")]
    EngineStopFailed(String),

    /// The engine is not running.
    #[error("Engine is not running")]
    EngineNotRunning,

    /// Status collection failed.
    #[error("Status collection failed: {0}")]
    StatusUnavailable(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RELEASE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Listing available versions failed.
    #[error("Failed to fetch {kind} versions: {reason}")]
    VersionFetchFailed {
        /// Asset kind whose listing failed
        kind: AssetKind,
        /// Underlying cause
        reason: String,
    },

    /// The requested release exists but has no usable asset.
    #[error("No {kind} asset named '{asset}' in release {version}")]
    AssetNotFound {
        /// Asset kind being installed
        kind: AssetKind,
        /// Requested version
        version: String,
        /// Expected asset name
        asset: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // INSTALL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Download or placement of an asset failed.
    #[error("Failed to install {kind} {version}: {reason}")]
    InstallFailed {
        /// Asset kind being installed
        kind: AssetKind,
        /// Requested version
        version: String,
        /// Underlying cause
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reading logs, the database, or the config file failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Download file name contains disallowed characters.
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Unknown asset kind name.
    #[error("Unknown asset kind: {0}")]
    UnknownAssetKind(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PanelError {
    /// Returns true if retrying the same operation later may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PanelError::HttpError(_)
                | PanelError::VersionFetchFailed { .. }
                | PanelError::InstallFailed { .. }
                | PanelError::StatusUnavailable(_)
                | PanelError::EngineStartFailed(_)
                | PanelError::EngineStopFailed(_)
                | PanelError::StorageError(_)
                | PanelError::IoError(_)
        )
    }

    /// Returns true if the request was rejected before any collaborator ran.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            PanelError::ValidationError(_)
                | PanelError::InvalidFilename(_)
                | PanelError::UnknownAssetKind(_)
        )
    }
}
