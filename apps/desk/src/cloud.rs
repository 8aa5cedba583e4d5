//! Client for the backup API: pushes the full snapshot, pulls the newest one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::DeskError;
use crate::models::{AttendanceRecord, IncomePayment, User};

/// Body of `POST /backup`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequest<'a> {
    pub users: &'a [User],
    pub attendance: &'a [AttendanceRecord],
    pub income: &'a [IncomePayment],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordCounts {
    pub users: usize,
    pub attendance: usize,
    pub income: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupReceipt {
    pub message: String,
    pub backup_id: i64,
    pub created_at: DateTime<Utc>,
    pub records: RecordCounts,
}

/// The stored envelope as the restore endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    pub users: Vec<User>,
    pub attendance: Vec<AttendanceRecord>,
    pub income: Vec<IncomePayment>,
    #[serde(default)]
    pub last_backup: Option<String>,
    #[serde(default)]
    pub backup_timestamp: Option<String>,
    #[serde(default)]
    pub total_records: Option<RecordCounts>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoredBackup {
    pub message: String,
    pub data: SnapshotData,
    pub backup_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

/// The cloud side of backup/restore, carried by reference into the
/// controller's `backup` and `restore` commands.
#[async_trait]
pub trait BackupRemote: Send + Sync {
    async fn push(&self, request: &BackupRequest<'_>) -> Result<BackupReceipt, DeskError>;

    /// `None` when the server holds no backups yet.
    async fn fetch_latest(&self) -> Result<Option<RestoredBackup>, DeskError>;
}

/// `BackupRemote` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn remote_error(resp: reqwest::Response) -> DeskError {
    let status = resp.status();
    let body: ErrorBody = resp.json().await.unwrap_or_default();
    let message = match (body.error, body.details) {
        (Some(error), Some(details)) => format!("{error}: {details}"),
        (Some(error), None) => error,
        (None, Some(details)) => details,
        (None, None) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    DeskError::Remote {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl BackupRemote for HttpRemote {
    async fn push(&self, request: &BackupRequest<'_>) -> Result<BackupReceipt, DeskError> {
        let resp = self.http.post(self.url("backup")).json(request).send().await?;
        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn fetch_latest(&self) -> Result<Option<RestoredBackup>, DeskError> {
        let resp = self.http.get(self.url("restore")).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(remote_error(resp).await);
        }
        Ok(Some(resp.json().await?))
    }
}
