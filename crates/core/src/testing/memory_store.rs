//! In-memory cache store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::store::{CacheStore, StoreError};

/// HashMap-backed [`CacheStore`].
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_saves: Mutex<bool>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail, to exercise the best-effort
    /// persistence path.
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap() = fail;
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a blob exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }
}

impl CacheStore for MemoryCacheStore {
    fn save(&self, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(StoreError::Database("simulated save failure".to_string()));
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}
