//! Snapshot intake: validates an uploaded body and wraps it in the envelope
//! that gets persisted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::backup::{BackupEnvelope, RecordCounts};

pub const INCOMPLETE_DATA: &str = "Incomplete data: users, attendance and income are required";

/// The three collections pulled out of an upload, plus the client's
/// `lastBackup` if it sent a usable one.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotUpload {
    pub users: Vec<Value>,
    pub attendance: Vec<Value>,
    pub income: Vec<Value>,
    pub last_backup: Option<String>,
}

/// Parses a raw request body. Malformed JSON is a parse error (500);
/// a well-formed body missing any non-empty collection is a validation error (400).
pub fn parse_upload(body: &[u8]) -> Result<SnapshotUpload, AppError> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(mut fields) = value else {
        return Err(AppError::Validation(INCOMPLETE_DATA.to_string()));
    };

    let users = take_list(&mut fields, "users");
    let attendance = take_list(&mut fields, "attendance");
    let income = take_list(&mut fields, "income");

    let (Some(users), Some(attendance), Some(income)) = (users, attendance, income) else {
        return Err(AppError::Validation(INCOMPLETE_DATA.to_string()));
    };

    let last_backup = match fields.remove("lastBackup") {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    };

    Ok(SnapshotUpload {
        users,
        attendance,
        income,
        last_backup,
    })
}

fn take_list(fields: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match fields.remove(key) {
        Some(Value::Array(items)) if !items.is_empty() => Some(items),
        _ => None,
    }
}

/// Wraps an upload with server metadata. `now` stamps `backupTimestamp`
/// and stands in for a missing `lastBackup`.
pub fn build_envelope(upload: SnapshotUpload, now: DateTime<Utc>) -> BackupEnvelope {
    let stamp = iso_millis(now);
    let total_records = RecordCounts {
        users: upload.users.len(),
        attendance: upload.attendance.len(),
        income: upload.income.len(),
    };

    BackupEnvelope {
        users: upload.users,
        attendance: upload.attendance,
        income: upload.income,
        last_backup: upload.last_backup.unwrap_or_else(|| stamp.clone()),
        backup_timestamp: stamp,
        total_records,
    }
}

/// `2024-05-01T12:30:00.000Z`, the format browsers emit for instants.
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
