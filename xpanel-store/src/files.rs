//! Whole-file stores for the panel database and the engine config.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, instrument};

use xpanel_core::error::{PanelError, Result};
use xpanel_core::traits::{ConfigStore, DatabaseStore};

async fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            PanelError::StorageError(format!("{what} not found at {}", path.display()))
        }
        _ => PanelError::StorageError(format!("failed to read {what} {}: {e}", path.display())),
    })
}

/// Serves the panel database file as raw bytes.
pub struct FileDatabaseStore {
    path: PathBuf,
}

impl FileDatabaseStore {
    /// Creates a store reading `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DatabaseStore for FileDatabaseStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read_database(&self) -> Result<Bytes> {
        let bytes = read_file(&self.path, "database").await?;
        debug!(bytes = bytes.len(), "read database");
        Ok(Bytes::from(bytes))
    }
}

/// Serves the engine JSON config file.
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Creates a store reading `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read_config(&self) -> Result<serde_json::Value> {
        let raw = read_file(&self.path, "engine config").await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x-ui.db");
        std::fs::write(&path, b"SQLite format 3\0rest").unwrap();

        let store = FileDatabaseStore::new(&path);
        let bytes = store.read_database().await.unwrap();

        assert_eq!(&bytes[..], b"SQLite format 3\0rest");
    }

    #[tokio::test]
    async fn test_missing_database() {
        let dir = TempDir::new().unwrap();
        let store = FileDatabaseStore::new(dir.path().join("x-ui.db"));

        let err = store.read_database().await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_config_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log":{"loglevel":"warning"},"inbounds":[]}"#).unwrap();

        let store = FileConfigStore::new(&path);
        let config = store.read_config().await.unwrap();

        assert_eq!(config["log"]["loglevel"], "warning");
        assert!(config["inbounds"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileConfigStore::new(&path);
        assert!(matches!(store.read_config().await, Err(PanelError::JsonError(_))));
    }
}
