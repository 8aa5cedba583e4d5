use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("A user with document {0} already exists")]
    DuplicateDocument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Backup server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Backup server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}
