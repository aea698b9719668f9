//! Curated batch cache: cursor over one daily batch of curated candidates.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::api::{ApiError, CuratedFeed, RepoSummary, UserRef};
use crate::config::FeedConfig;
use crate::filters::CuratedFilters;
use crate::metrics;
use crate::store::{CacheStore, CURATED_CACHE_KEY};

use super::batch::BatchCache;
use super::record::ValidityPolicy;

/// Owns the cursor over a batch of curated items and decides when to reuse,
/// discard, or refill the persisted cache.
///
/// Quota is deliberately not enforced here: callers check the externally
/// reported daily count against the limit (see [`super::quota_exhausted`])
/// before invoking [`fetch_new_batch`](Self::fetch_new_batch).
pub struct CuratedBatchCache {
    feed: Arc<dyn CuratedFeed>,
    cache: BatchCache<RepoSummary, CuratedFilters>,
    filters: CuratedFilters,
    requested_batch_size: u32,
}

impl CuratedBatchCache {
    pub fn new(feed: Arc<dyn CuratedFeed>, store: Arc<dyn CacheStore>, config: &FeedConfig) -> Self {
        Self {
            feed,
            cache: BatchCache::new(
                store,
                CURATED_CACHE_KEY,
                ValidityPolicy::curated(config.curated_ttl_hours),
            ),
            filters: CuratedFilters::default(),
            requested_batch_size: config.curated_batch_size,
        }
    }

    /// The active filter snapshot.
    pub fn filters(&self) -> &CuratedFilters {
        &self.filters
    }

    /// Replace the active filter snapshot. The persisted record is not
    /// touched here; the validity check discards it on the next load if it
    /// no longer matches.
    pub fn set_filters(&mut self, filters: CuratedFilters) {
        self.filters = filters;
    }

    /// Whether a persisted record exists for this user, created today, inside
    /// the TTL, and under the current filters. An invalid record is deleted
    /// as a side effect.
    pub fn has_valid_cache(&self, username: &str) -> bool {
        self.cache
            .has_valid_record(Some(username), &self.filters, Utc::now())
    }

    /// Load the persisted record into memory, refreshing its last-used
    /// timestamp. Returns false (and deletes the record) on any invalidation
    /// condition.
    pub fn load_from_storage(&mut self, username: &str) -> bool {
        self.cache
            .load_from_storage(Some(username), &self.filters, Utc::now())
    }

    /// Serve from the persisted cache if possible, otherwise fetch a batch
    /// from the remote feed and persist it.
    ///
    /// `should_log` requests a best-effort quota log after a successful
    /// remote fetch; its outcome never gates success.
    pub async fn fetch_batch(&mut self, user: &UserRef, should_log: bool) -> Result<(), ApiError> {
        if self.load_from_storage(&user.username) && self.cache.has_next() {
            debug!(user = %user.username, "Serving curated batch from cache");
            metrics::CURATED_BATCH_FETCHES.with_label_values(&["cache"]).inc();
            return Ok(());
        }
        self.fetch_from_remote(user, should_log).await
    }

    /// Discard everything (memory and persisted record) and fetch a brand
    /// new batch, logging the quota unit. Callers must have confirmed the
    /// daily quota beforehand.
    pub async fn fetch_new_batch(&mut self, user: &UserRef) -> Result<(), ApiError> {
        self.cache.clear();
        self.fetch_from_remote(user, true).await
    }

    async fn fetch_from_remote(&mut self, user: &UserRef, should_log: bool) -> Result<(), ApiError> {
        let batch = match self
            .feed
            .fetch_uninteracted(&user.username, self.requested_batch_size, &self.filters)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                metrics::CURATED_FETCH_FAILURES.inc();
                return Err(e);
            }
        };

        debug!(
            user = %user.username,
            count = batch.repositories.len(),
            "Curated batch fetched from remote"
        );
        metrics::CURATED_BATCH_FETCHES.with_label_values(&["remote"]).inc();

        self.cache.install(
            batch.repositories,
            self.filters.clone(),
            Some(user.username.clone()),
            Utc::now(),
        );

        if should_log {
            if let Some(user_id) = user.id {
                // Best-effort: a failed quota log never fails the batch.
                if let Err(e) = self.feed.log_batch_generation(user_id).await {
                    warn!(user_id, "Quota log failed: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Read-only remote query: how many items the current filters would
    /// yield, without mutating any cache state. Used to warn the user before
    /// they commit a quota unit.
    pub async fn fetch_batch_preview(&self, user: &UserRef) -> Result<usize, ApiError> {
        let batch = self
            .feed
            .fetch_uninteracted(&user.username, self.requested_batch_size, &self.filters)
            .await?;
        Ok(batch.repositories.len())
    }

    /// The item at the cursor, without advancing.
    pub fn get_next(&self) -> Option<&RepoSummary> {
        self.cache.peek()
    }

    /// Advance the cursor by one and persist it. No-op at the end.
    pub fn move_to_next(&mut self) {
        self.cache.advance(Utc::now());
    }

    /// Clear the in-memory list and cursor without touching persisted state.
    pub fn reset(&mut self) {
        self.cache.reset();
    }

    pub fn has_next(&self) -> bool {
        self.cache.has_next()
    }

    pub fn remaining(&self) -> usize {
        self.cache.remaining()
    }

    /// Number of items in the current batch (the actual batch size, which
    /// may be smaller than the requested one).
    pub fn batch_size(&self) -> usize {
        self.cache.len()
    }

    /// 1-based position of the cursor for display.
    pub fn current_position(&self) -> usize {
        self.cache.cursor() + 1
    }
}
