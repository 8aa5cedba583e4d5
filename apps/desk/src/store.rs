//! # Local persistence
//!
//! The three collections are stored independently, each as a JSON array under
//! a fixed key:
//!
//! | Key | Contents |
//! |-----|----------|
//! | `antologia_users` | `[User]` |
//! | `antologia_attendance` | `[AttendanceRecord]` |
//! | `antologia_income` | `[IncomePayment]` |
//!
//! [`FileStore`] keeps one `<key>.json` file per key under a data directory.
//! [`MemoryStore`] keeps them in a shared map for tests.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::state::AppState;

pub const USERS_KEY: &str = "antologia_users";
pub const ATTENDANCE_KEY: &str = "antologia_attendance";
pub const INCOME_KEY: &str = "antologia_income";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Stored value under '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage, the shape of a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Filesystem-backed store: `<base>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.base).map_err(io_err)?;
        std::fs::write(self.path(key), value).map_err(io_err)
    }
}

/// In-memory store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Mirrors [`AppState`] collections into a [`KeyValueStore`].
#[derive(Clone, Debug)]
pub struct LocalStore<S> {
    kv: S,
}

impl<S: KeyValueStore> LocalStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Writes all three collections and stamps `last_backup` with now.
    pub fn save(&self, state: &mut AppState) -> Result<(), StoreError> {
        self.put(USERS_KEY, &state.users)?;
        self.put(ATTENDANCE_KEY, &state.attendance)?;
        self.put(INCOME_KEY, &state.income)?;
        state.last_backup = Some(Utc::now());
        Ok(())
    }

    /// Replaces each collection that has a stored value; absent keys leave the
    /// collection untouched. Any malformed value aborts the whole load.
    pub fn load(&self, state: &mut AppState) -> Result<(), StoreError> {
        if let Some(users) = self.fetch(USERS_KEY)? {
            state.users = users;
        }
        if let Some(attendance) = self.fetch(ATTENDANCE_KEY)? {
            state.attendance = attendance;
        }
        if let Some(income) = self.fetch(INCOME_KEY)? {
            state.income = income;
        }
        Ok(())
    }

    fn put<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(items).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &encoded)
    }

    fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>, StoreError> {
        let Some(raw) = self.kv.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            })
    }
}
