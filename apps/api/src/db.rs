use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};
use tracing::{info, warn};

use crate::backup::store::BackupStore;
use crate::errors::AppError;
use crate::models::backup::{BackupRow, InsertedBackup};

/// Parses the connection string and forces an encrypted connection.
/// `Require` encrypts without verifying the server certificate.
pub fn connect_options(database_url: &str) -> Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(database_url)
        .context("DATABASE_URL is not a valid Postgres connection string")?
        .ssl_mode(PgSslMode::Require);
    Ok(options)
}

/// Postgres-backed snapshot store.
///
/// Holds only connection options: every call opens its own connection and
/// closes it before returning, so nothing is shared between requests.
#[derive(Clone)]
pub struct PgBackupStore {
    options: PgConnectOptions,
}

impl PgBackupStore {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }

    async fn connect(&self) -> Result<PgConnection, AppError> {
        Ok(PgConnection::connect_with(&self.options).await?)
    }
}

async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection cleanly: {e}");
    }
}

#[async_trait]
impl BackupStore for PgBackupStore {
    async fn insert(
        &self,
        backup_data: &Value,
        backup_type: &str,
    ) -> Result<InsertedBackup, AppError> {
        let mut conn = self.connect().await?;

        let inserted = sqlx::query_as::<_, InsertedBackup>(
            r#"
            INSERT INTO antologia_backups (backup_data, backup_type)
            VALUES ($1, $2)
            RETURNING id, created_at
            "#,
        )
        .bind(backup_data)
        .bind(backup_type)
        .fetch_one(&mut conn)
        .await;

        release(conn).await;
        let inserted = inserted?;

        info!("Stored backup {} ({backup_type})", inserted.id);
        Ok(inserted)
    }

    async fn latest(&self) -> Result<Option<BackupRow>, AppError> {
        let mut conn = self.connect().await?;

        let row = sqlx::query_as::<_, BackupRow>(
            r#"
            SELECT id, backup_data, backup_type, created_at
            FROM antologia_backups
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut conn)
        .await;

        release(conn).await;
        Ok(row?)
    }
}
