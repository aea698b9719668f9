//! Local cache persistence.
//!
//! A keyed blob store: one opaque serialized record per key, no partial
//! updates. Any mutation that must survive a restart re-serializes the whole
//! record. A corrupt or undecodable blob is a cache miss, never an error.

mod sqlite;

pub use sqlite::SqliteCacheStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Persistence key for the curated feed record.
pub const CURATED_CACHE_KEY: &str = "curated_batch";
/// Persistence key for the trending feed record.
pub const TRENDING_CACHE_KEY: &str = "trending_batch";

/// Error type for the blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Keyed blob persistence.
///
/// `delete` of an absent key is not an error.
pub trait CacheStore: Send + Sync {
    fn save(&self, key: &str, blob: &[u8]) -> Result<(), StoreError>;
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Serialize and persist a record under `key`. Persistence is best-effort:
/// failures are logged and swallowed so a storage hiccup never fails the
/// operation that triggered the write.
pub fn save_record<T: Serialize>(store: &dyn CacheStore, key: &str, record: &T) {
    let blob = match serde_json::to_vec(record) {
        Ok(blob) => blob,
        Err(e) => {
            warn!(key, "Failed to serialize cache record: {}", e);
            return;
        }
    };
    if let Err(e) = store.save(key, &blob) {
        warn!(key, "Failed to persist cache record: {}", e);
    }
}

/// Load and decode the record under `key`. Absent, unreadable, or
/// undecodable blobs all come back as `None`.
pub fn load_record<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let blob = match store.load(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, "Failed to read cache record: {}", e);
            return None;
        }
    };
    match serde_json::from_slice(&blob) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(key, "Discarding undecodable cache record: {}", e);
            None
        }
    }
}

/// Delete the record under `key`, ignoring storage failures.
pub fn delete_record(store: &dyn CacheStore, key: &str) {
    if let Err(e) = store.delete(key) {
        warn!(key, "Failed to delete cache record: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = SqliteCacheStore::in_memory().unwrap();
        save_record(&store, "sample", &Sample { value: 7 });
        let loaded: Option<Sample> = load_record(&store, "sample");
        assert_eq!(loaded, Some(Sample { value: 7 }));
    }

    #[test]
    fn test_corrupt_blob_is_a_miss() {
        let store = SqliteCacheStore::in_memory().unwrap();
        store.save("sample", b"not json at all").unwrap();
        let loaded: Option<Sample> = load_record(&store, "sample");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_delete_absent_key_is_ok() {
        let store = SqliteCacheStore::in_memory().unwrap();
        assert!(store.delete("never_saved").is_ok());
    }
}
