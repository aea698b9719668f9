//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Curated batch cache (fetch source, failures)
//! - Trending pipeline (fetches, enrichment drops)
//! - Cache invalidations per persisted key

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Curated batch fetches by source ("cache" or "remote").
pub static CURATED_BATCH_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reposcout_curated_batch_fetches_total",
            "Curated batch fetches by source",
        ),
        &["source"], // "cache", "remote"
    )
    .unwrap()
});

/// Curated remote fetches that failed.
pub static CURATED_FETCH_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reposcout_curated_fetch_failures_total",
        "Failed curated remote fetches",
    )
    .unwrap()
});

/// Trending raw batches fetched.
pub static TRENDING_FETCHES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reposcout_trending_fetches_total",
        "Trending raw batches fetched",
    )
    .unwrap()
});

/// Items dropped because their canonical-id lookup failed.
pub static ENRICHMENT_LOOKUP_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reposcout_enrichment_lookup_failures_total",
        "Trending items dropped on failed canonical-id lookup",
    )
    .unwrap()
});

/// Items dropped because the user already interacted with them.
pub static ENRICHMENT_FILTERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reposcout_enrichment_filtered_total",
        "Trending items dropped as already interacted",
    )
    .unwrap()
});

/// Persisted records deleted on a failed validity check, by key.
pub static CACHE_INVALIDATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reposcout_cache_invalidations_total",
            "Persisted cache records deleted as invalid",
        ),
        &["key"],
    )
    .unwrap()
});

/// Registry holding all core metrics.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    registry
        .register(Box::new(CURATED_BATCH_FETCHES.clone()))
        .unwrap();
    registry
        .register(Box::new(CURATED_FETCH_FAILURES.clone()))
        .unwrap();
    registry.register(Box::new(TRENDING_FETCHES.clone())).unwrap();
    registry
        .register(Box::new(ENRICHMENT_LOOKUP_FAILURES.clone()))
        .unwrap();
    registry
        .register(Box::new(ENRICHMENT_FILTERED.clone()))
        .unwrap();
    registry
        .register(Box::new(CACHE_INVALIDATIONS.clone()))
        .unwrap();
    registry
});

/// Render all core metrics in the Prometheus text format.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    encoder
        .encode_to_string(&REGISTRY.gather())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_register_and_render() {
        CURATED_BATCH_FETCHES.with_label_values(&["cache"]).inc();
        TRENDING_FETCHES.inc();
        let text = gather();
        assert!(text.contains("reposcout_curated_batch_fetches_total"));
        assert!(text.contains("reposcout_trending_fetches_total"));
    }
}
