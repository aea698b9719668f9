//! Generic cache-record manager: in-memory cursor plus whole-record
//! persistence under one fixed key.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::metrics;
use crate::store::{delete_record, load_record, save_record, CacheStore};

use super::record::{BatchRecord, ValidityPolicy};

/// Metadata of the batch currently held in memory, needed to re-persist the
/// whole record on every cursor mutation.
#[derive(Debug, Clone)]
struct RecordMeta<F> {
    filters: F,
    user: Option<String>,
    created_at: DateTime<Utc>,
}

/// Cursor over one persisted batch of items.
///
/// The same component serves both feeds; only the persistence key and the
/// [`ValidityPolicy`] differ.
pub struct BatchCache<T, F> {
    store: Arc<dyn CacheStore>,
    key: &'static str,
    policy: ValidityPolicy,
    items: Vec<T>,
    cursor: usize,
    meta: Option<RecordMeta<F>>,
}

impl<T, F> BatchCache<T, F>
where
    T: Serialize + DeserializeOwned + Clone,
    F: Serialize + DeserializeOwned + PartialEq + Clone,
{
    pub fn new(store: Arc<dyn CacheStore>, key: &'static str, policy: ValidityPolicy) -> Self {
        Self {
            store,
            key,
            policy,
            items: Vec::new(),
            cursor: 0,
            meta: None,
        }
    }

    /// Load the persisted record if it passes every validity condition.
    /// An invalid record is deleted as a side effect, not merely skipped.
    fn load_valid_record(
        &self,
        user: Option<&str>,
        filters: &F,
        now: DateTime<Utc>,
    ) -> Option<BatchRecord<T, F>> {
        let record: BatchRecord<T, F> = load_record(self.store.as_ref(), self.key)?;
        if !self.policy.is_valid(&record, user, filters, now) {
            debug!(key = self.key, "Persisted record invalid, deleting");
            metrics::CACHE_INVALIDATIONS.with_label_values(&[self.key]).inc();
            delete_record(self.store.as_ref(), self.key);
            return None;
        }
        Some(record)
    }

    /// Whether a usable persisted record exists for this user and filter set.
    pub fn has_valid_record(&self, user: Option<&str>, filters: &F, now: DateTime<Utc>) -> bool {
        self.load_valid_record(user, filters, now).is_some()
    }

    /// Replace the in-memory cursor and items with the persisted record, if
    /// valid, refreshing its last-used timestamp. Returns false (and deletes
    /// the record) on any invalidation condition.
    pub fn load_from_storage(
        &mut self,
        user: Option<&str>,
        filters: &F,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(record) = self.load_valid_record(user, filters, now) else {
            return false;
        };

        self.items = record.items;
        self.cursor = record.cursor;
        self.meta = Some(RecordMeta {
            filters: record.filters,
            user: record.user,
            created_at: record.created_at,
        });
        self.persist(now);
        true
    }

    /// Replace memory with a freshly fetched batch and persist it.
    pub fn install(&mut self, items: Vec<T>, filters: F, user: Option<String>, now: DateTime<Utc>) {
        self.items = items;
        self.cursor = 0;
        self.meta = Some(RecordMeta {
            filters,
            user,
            created_at: now,
        });
        self.persist(now);
    }

    /// Serialize the whole in-memory record and write it under the key.
    fn persist(&self, now: DateTime<Utc>) {
        let Some(meta) = &self.meta else {
            return;
        };
        let record = BatchRecord {
            items: self.items.clone(),
            cursor: self.cursor,
            filters: meta.filters.clone(),
            user: meta.user.clone(),
            created_at: meta.created_at,
            last_used_at: now,
        };
        save_record(self.store.as_ref(), self.key, &record);
    }

    /// The item at the cursor, without advancing.
    pub fn peek(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    /// Advance the cursor by one and persist. No-op (and no persistence
    /// write) when already at the end.
    pub fn advance(&mut self, now: DateTime<Utc>) -> bool {
        if self.cursor >= self.items.len() {
            return false;
        }
        self.cursor += 1;
        self.persist(now);
        true
    }

    /// Remove the item at the cursor without advancing, then persist. The
    /// item formerly after it moves into the cursor position.
    pub fn remove_current(&mut self, now: DateTime<Utc>) -> bool {
        if self.cursor >= self.items.len() {
            return false;
        }
        self.items.remove(self.cursor);
        self.persist(now);
        true
    }

    /// Clear the in-memory state without touching persisted state.
    pub fn reset(&mut self) {
        self.items.clear();
        self.cursor = 0;
        self.meta = None;
    }

    /// Clear both the in-memory state and the persisted record.
    pub fn clear(&mut self) {
        self.reset();
        delete_record(self.store.as_ref(), self.key);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.items.len()
    }

    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.cursor)
    }
}
