//! Trending enrichment pipeline.
//!
//! Fans out concurrent canonical-id lookups over a raw trending batch, fans
//! the results into one deduplicated, filtered, sorted list, and owns the
//! cursor and short-TTL cache over the survivors.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::api::{
    ApiError, EnrichedTrendingRepo, InteractionOracle, TrendingPeriod, TrendingRepo, TrendingSource,
};
use crate::cache::{BatchCache, ValidityPolicy};
use crate::config::FeedConfig;
use crate::filters::TrendingFilters;
use crate::metrics;
use crate::store::{CacheStore, TRENDING_CACHE_KEY};

/// Warning reported when enrichment leaves nothing to show. Not an error:
/// the fetch itself succeeded.
const EMPTY_AFTER_FILTERING: &str = "no uninteracted trending repositories found";

/// Cursor and cache over an enriched trending batch.
///
/// Mutating operations take `&mut self`, which is the single-flight
/// protection for the persisted key: two `fetch_trending` calls cannot
/// overlap on the same pipeline instance.
pub struct TrendingPipeline {
    source: Arc<dyn TrendingSource>,
    oracle: Arc<dyn InteractionOracle>,
    cache: BatchCache<EnrichedTrendingRepo, TrendingFilters>,
    filters: TrendingFilters,
    requested_batch_size: u32,
    concurrency: usize,
}

impl TrendingPipeline {
    pub fn new(
        source: Arc<dyn TrendingSource>,
        oracle: Arc<dyn InteractionOracle>,
        store: Arc<dyn CacheStore>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            source,
            oracle,
            cache: BatchCache::new(
                store,
                TRENDING_CACHE_KEY,
                ValidityPolicy::trending(config.trending_ttl_minutes),
            ),
            filters: TrendingFilters::default(),
            requested_batch_size: config.trending_batch_size,
            concurrency: config.enrichment_concurrency,
        }
    }

    /// The active filter snapshot.
    pub fn filters(&self) -> &TrendingFilters {
        &self.filters
    }

    /// Fetch a raw trending batch, enrich it, and install the survivors as
    /// the new cached batch.
    ///
    /// Returns `Ok(None)` on success, or `Ok(Some(warning))` when the fetch
    /// succeeded but nothing survived filtering. Transport and decode
    /// failures on the raw batch fetch surface as errors; per-item lookup
    /// failures silently drop the item.
    pub async fn fetch_trending(&mut self, username: &str) -> Result<Option<String>, ApiError> {
        let raw = self
            .source
            .fetch_trending(&self.filters, self.requested_batch_size)
            .await?;
        metrics::TRENDING_FETCHES.inc();

        if raw.is_empty() {
            debug!("Trending source returned no items");
            self.cache
                .install(Vec::new(), self.filters.clone(), None, Utc::now());
            return Ok(None);
        }

        // One interaction-set fetch per enrichment pass. A failure degrades
        // to an empty set: the batch still shows, filtering just catches up
        // on the next pass.
        let interacted = match self.oracle.interacted_repo_ids(username).await {
            Ok(set) => set,
            Err(e) => {
                warn!(username, "Interaction set fetch failed: {}", e);
                HashSet::new()
            }
        };

        let enriched = self.enrich(raw, &interacted).await;
        let survivors = enriched.len();

        self.cache
            .install(enriched, self.filters.clone(), None, Utc::now());

        if survivors == 0 {
            Ok(Some(EMPTY_AFTER_FILTERING.to_string()))
        } else {
            debug!(survivors, "Trending batch enriched and cached");
            Ok(None)
        }
    }

    /// Resolve canonical ids for every raw item with bounded concurrency,
    /// dropping items whose lookup fails or whose id the user has already
    /// acted on.
    ///
    /// The single consumer loop serializes accumulation and doubles as the
    /// join barrier: the stream ends only after every dispatched lookup has
    /// completed, so partial results are never surfaced. The final order is
    /// deterministic regardless of lookup completion order: stars
    /// descending, ties broken by discovery order.
    async fn enrich(
        &self,
        raw: Vec<TrendingRepo>,
        interacted: &HashSet<u64>,
    ) -> Vec<EnrichedTrendingRepo> {
        let source = &self.source;
        let lookups = raw.into_iter().enumerate().map(|(index, repo)| {
            let source = Arc::clone(source);
            async move {
                match source.resolve_repo_id(&repo.author, &repo.name).await {
                    Ok(github_id) => Some((index, repo, github_id)),
                    Err(e) => {
                        debug!(slug = %repo.slug(), "Canonical id lookup failed: {}", e);
                        metrics::ENRICHMENT_LOOKUP_FAILURES.inc();
                        None
                    }
                }
            }
        });

        let mut results = futures::stream::iter(lookups).buffer_unordered(self.concurrency.max(1));

        let mut survivors = Vec::new();
        while let Some(result) = results.next().await {
            let Some((index, repo, github_id)) = result else {
                continue;
            };
            if interacted.contains(&github_id) {
                metrics::ENRICHMENT_FILTERED.inc();
                continue;
            }
            survivors.push((
                index,
                EnrichedTrendingRepo {
                    trending: repo,
                    github_id,
                    fetched_at: Utc::now(),
                },
            ));
        }

        // Restore discovery order first, then a stable sort by stars keeps
        // that order for ties.
        survivors.sort_by_key(|(index, _)| *index);
        let mut repos: Vec<EnrichedTrendingRepo> =
            survivors.into_iter().map(|(_, repo)| repo).collect();
        repos.sort_by(|a, b| b.trending.stars.cmp(&a.trending.stars));
        repos
    }

    /// Load the persisted record if it is within the TTL and matches the
    /// current filters. Returns false (and deletes the record) otherwise.
    pub fn load_from_storage(&mut self) -> bool {
        self.cache.load_from_storage(None, &self.filters, Utc::now())
    }

    /// The item at the cursor, without advancing.
    pub fn get_next(&self) -> Option<&EnrichedTrendingRepo> {
        self.cache.peek()
    }

    /// Advance the cursor by one and persist it. No-op at the end.
    pub fn move_to_next(&mut self) {
        self.cache.advance(Utc::now());
    }

    /// Remove the item at the cursor from the in-memory and persisted list
    /// without advancing, so it cannot reappear when the cache is reloaded.
    pub fn remove_current(&mut self) {
        self.cache.remove_current(Utc::now());
    }

    /// Clear everything: in-memory state and the persisted record.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Replace the filters. On any change the entire cache (in-memory and
    /// persisted) is cleared; callers must re-fetch explicitly.
    pub fn update_filters(&mut self, language: Option<String>, period: TrendingPeriod) {
        let next = TrendingFilters { language, period };
        if next != self.filters {
            debug!("Trending filters changed, clearing cache");
            self.cache.clear();
        }
        self.filters = next;
    }

    pub fn has_next(&self) -> bool {
        self.cache.has_next()
    }

    pub fn remaining(&self) -> usize {
        self.cache.remaining()
    }

    pub fn batch_size(&self) -> usize {
        self.cache.len()
    }

    pub fn current_position(&self) -> usize {
        self.cache.cursor()
    }
}
