//! Durable key-value storage.
//!
//! Every store persists one JSON document per key, mirroring the flat
//! local-storage model: episodes, medications, medication logs and
//! settings each live under their own key. Reads that fail or hold
//! malformed JSON degrade to a default value; writes that fail are
//! logged. Neither is ever surfaced to store callers.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("JSON error for key {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// A synchronous string key-value sink.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn read_raw(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored value, using default");
            None
        }
    }
}

/// Read and decode the JSON document stored under `key`.
///
/// A missing key yields `T::default()` silently. A read failure or a
/// document that does not decode is logged and also yields the default.
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = read_raw(store, key) else {
        return T::default();
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(source) => {
            let e = StorageError::Json { key: key.into(), source };
            tracing::warn!(key, error = %e, "Malformed stored value, using default");
            T::default()
        }
    }
}

/// Read the JSON array stored under `key`, decoding entries one by one.
///
/// Entries that do not decode are logged and skipped; the rest load. A
/// document that is not a JSON array yields an empty list.
pub fn load_json_list<T>(store: &dyn KeyValueStore, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    let entries: Vec<Value> = load_json(store, key);
    let total = entries.len();
    let items: Vec<T> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(source) => {
                let e = StorageError::Json { key: key.into(), source };
                tracing::warn!(key, index, error = %e, "Skipping undecodable stored entry");
                None
            }
        })
        .collect();

    if items.len() < total {
        tracing::warn!(key, kept = items.len(), total, "Some stored entries were skipped");
    }
    items
}

/// Encode `value` and write it under `key`, logging any failure.
///
/// Returns whether the write reached the sink.
pub fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(source) => {
            let e = StorageError::Json { key: key.into(), source };
            tracing::error!(key, error = %e, "Failed to encode value");
            return false;
        }
    };

    match store.set(key, &encoded) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to save value");
            false
        }
    }
}
