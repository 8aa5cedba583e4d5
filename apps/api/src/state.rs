use std::sync::Arc;

use crate::backup::store::BackupStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Snapshot storage. Default: `PgBackupStore`, one connection per call.
    pub store: Arc<dyn BackupStore>,
}
