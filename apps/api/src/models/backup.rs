use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Type tag written alongside every snapshot the backup endpoint stores.
pub const AUTOMATIC_BACKUP: &str = "automatic";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BackupRow {
    pub id: i64,
    pub backup_data: Value,
    pub backup_type: String,
    pub created_at: DateTime<Utc>,
}

/// Server-assigned metadata returned by an insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InsertedBackup {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordCounts {
    pub users: usize,
    pub attendance: usize,
    pub income: usize,
}

/// The opaque value persisted in `backup_data`. Entity arrays are kept as raw
/// JSON so a restore hands back exactly what the client uploaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub users: Vec<Value>,
    pub attendance: Vec<Value>,
    pub income: Vec<Value>,
    pub last_backup: String,
    pub backup_timestamp: String,
    pub total_records: RecordCounts,
}
