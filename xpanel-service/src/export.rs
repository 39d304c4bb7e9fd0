//! Log, database and config exports.

use std::sync::Arc;

use tracing::instrument;

use xpanel_core::constants::DATABASE_EXPORT_FILENAME;
use xpanel_core::error::Result;
use xpanel_core::traits::{ConfigStore, DatabaseStore, LogStore};
use xpanel_core::types::DatabaseExport;

use crate::validate::{validate_filename, validate_log_count};

/// Thin pass-through to the storage collaborators.
pub struct Exporter {
    logs: Arc<dyn LogStore>,
    database: Arc<dyn DatabaseStore>,
    config: Arc<dyn ConfigStore>,
}

impl Exporter {
    /// Creates an exporter over the given stores.
    pub fn new(logs: Arc<dyn LogStore>, database: Arc<dyn DatabaseStore>, config: Arc<dyn ConfigStore>) -> Self {
        Self { logs, database, config }
    }

    /// Returns up to `count` recent engine log lines.
    #[instrument(skip(self))]
    pub async fn tail_logs(&self, count: usize) -> Result<Vec<String>> {
        validate_log_count(count)?;
        self.logs.read_logs(count).await
    }

    /// Returns the database bytes under the default download name.
    pub async fn export_database(&self) -> Result<DatabaseExport> {
        self.export_database_as(DATABASE_EXPORT_FILENAME).await
    }

    /// Returns the database bytes under `filename`.
    ///
    /// The name is validated before the store is touched.
    #[instrument(skip(self))]
    pub async fn export_database_as(&self, filename: &str) -> Result<DatabaseExport> {
        validate_filename(filename)?;
        let bytes = self.database.read_database().await?;
        Ok(DatabaseExport {
            filename: filename.to_string(),
            bytes,
        })
    }

    /// Returns the engine configuration document.
    pub async fn export_config(&self) -> Result<serde_json::Value> {
        self.config.read_config().await
    }
}
