use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::backup::{BackupRow, InsertedBackup};

/// Append-only storage for snapshot rows.
///
/// Carried in `AppState` as `Arc<dyn BackupStore>`. Production uses
/// [`crate::db::PgBackupStore`]; handler tests swap in an in-memory store.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Appends one row and returns its generated id and creation instant.
    async fn insert(&self, backup_data: &Value, backup_type: &str)
        -> Result<InsertedBackup, AppError>;

    /// The most recently created row, if any.
    async fn latest(&self) -> Result<Option<BackupRow>, AppError>;
}
