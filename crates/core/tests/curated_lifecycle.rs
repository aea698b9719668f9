//! Curated batch cache lifecycle integration tests.
//!
//! These tests drive the curated cache against the mock feed and the
//! in-memory store: cache reuse vs. refill decisions, filter and identity
//! invalidation, cursor persistence, and quota logging.

use std::sync::Arc;

use reposcout_core::api::{ApiError, CuratedFeed};
use reposcout_core::cache::{quota_exhausted, CuratedBatchCache};
use reposcout_core::config::FeedConfig;
use reposcout_core::filters::CuratedFilters;
use reposcout_core::store::{CacheStore, CURATED_CACHE_KEY};
use reposcout_core::testing::{fixtures, MemoryCacheStore, MockCuratedFeed};
use reposcout_core::UserRef;

struct TestHarness {
    feed: MockCuratedFeed,
    store: Arc<MemoryCacheStore>,
    cache: CuratedBatchCache,
}

impl TestHarness {
    fn new() -> Self {
        let feed = MockCuratedFeed::new();
        let store = Arc::new(MemoryCacheStore::new());
        let cache = CuratedBatchCache::new(
            Arc::new(feed.clone()),
            Arc::clone(&store) as Arc<dyn CacheStore>,
            &FeedConfig::default(),
        );
        Self { feed, store, cache }
    }

    /// A second cache instance sharing the same store, as after a restart.
    fn restarted(&self) -> CuratedBatchCache {
        CuratedBatchCache::new(
            Arc::new(self.feed.clone()),
            Arc::clone(&self.store) as Arc<dyn CacheStore>,
            &FeedConfig::default(),
        )
    }

    fn user() -> UserRef {
        UserRef::new("octocat", Some(7))
    }
}

#[tokio::test]
async fn test_short_batch_consumed_to_exhaustion() {
    let mut h = TestHarness::new();
    h.cache.set_filters(CuratedFilters {
        categories: vec!["ml".to_string()],
        min_stars: "100".to_string(),
        ..Default::default()
    });

    // Remote returns 4 items for a requested batch of 10.
    h.feed
        .set_repositories(vec![
            fixtures::repo_summary(1, 101, 500),
            fixtures::repo_summary(2, 102, 400),
            fixtures::repo_summary(3, 103, 300),
            fixtures::repo_summary(4, 104, 200),
        ])
        .await;

    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();

    let requests = h.feed.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].batch_size, 10);
    assert_eq!(requests[0].filters.categories, vec!["ml".to_string()]);
    assert_eq!(requests[0].filters.min_stars, "100");

    assert_eq!(h.cache.remaining(), 4);
    assert_eq!(h.cache.batch_size(), 4);

    for _ in 0..4 {
        assert!(h.cache.get_next().is_some());
        h.cache.move_to_next();
    }

    assert_eq!(h.cache.remaining(), 0);
    assert!(h.cache.get_next().is_none());

    // Cursor stays put at the end.
    h.cache.move_to_next();
    assert_eq!(h.cache.current_position(), 5);
}

#[tokio::test]
async fn test_second_fetch_served_from_cache() {
    let mut h = TestHarness::new();
    h.feed
        .set_repositories(vec![fixtures::repo_summary(1, 101, 500)])
        .await;

    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();
    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();

    // One remote request: the second fetch hit the persisted record.
    assert_eq!(h.feed.requests().await.len(), 1);
}

#[tokio::test]
async fn test_filter_change_deletes_persisted_record() {
    let mut h = TestHarness::new();
    h.cache.set_filters(CuratedFilters {
        categories: vec!["ml".to_string()],
        ..Default::default()
    });
    h.feed
        .set_repositories(vec![fixtures::repo_summary(1, 101, 500)])
        .await;
    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();
    assert!(h.store.contains(CURATED_CACHE_KEY));

    // Request under different filters: the old record must be deleted, not
    // merely skipped.
    h.cache.set_filters(CuratedFilters {
        categories: vec!["databases".to_string()],
        ..Default::default()
    });
    assert!(!h.cache.load_from_storage("octocat"));
    assert!(!h.store.contains(CURATED_CACHE_KEY));
}

#[tokio::test]
async fn test_other_users_record_is_invalid_and_deleted() {
    let mut h = TestHarness::new();
    h.feed
        .set_repositories(vec![fixtures::repo_summary(1, 101, 500)])
        .await;
    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();

    assert!(!h.cache.has_valid_cache("hubot"));
    assert!(!h.store.contains(CURATED_CACHE_KEY));
}

#[tokio::test]
async fn test_cursor_survives_restart() {
    let mut h = TestHarness::new();
    h.feed
        .set_repositories(vec![
            fixtures::repo_summary(1, 101, 500),
            fixtures::repo_summary(2, 102, 400),
        ])
        .await;
    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();
    h.cache.move_to_next();

    let mut restarted = h.restarted();
    assert!(restarted.load_from_storage("octocat"));
    assert_eq!(restarted.remaining(), 1);
    assert_eq!(restarted.get_next().unwrap().github_id, 102);
}

#[tokio::test]
async fn test_fetch_new_batch_logs_quota_unit() {
    let mut h = TestHarness::new();
    h.feed
        .set_repositories(vec![fixtures::repo_summary(1, 101, 500)])
        .await;

    h.cache.fetch_new_batch(&TestHarness::user()).await.unwrap();

    assert_eq!(h.feed.requests().await.len(), 1);
    assert_eq!(h.feed.log_calls().await, vec![7]);
}

#[tokio::test]
async fn test_quota_log_failure_does_not_fail_batch() {
    let mut h = TestHarness::new();
    h.feed
        .set_repositories(vec![fixtures::repo_summary(1, 101, 500)])
        .await;
    h.feed.set_fail_log_calls(true).await;

    h.cache.fetch_new_batch(&TestHarness::user()).await.unwrap();

    assert_eq!(h.cache.remaining(), 1);
    assert_eq!(h.feed.log_calls().await, vec![7]);
}

#[tokio::test]
async fn test_fetch_new_batch_discards_existing_record() {
    let mut h = TestHarness::new();
    h.feed
        .set_repositories(vec![
            fixtures::repo_summary(1, 101, 500),
            fixtures::repo_summary(2, 102, 400),
        ])
        .await;
    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();
    h.cache.move_to_next();
    assert_eq!(h.cache.remaining(), 1);

    // A new batch starts from scratch, cursor back at the beginning.
    h.cache.fetch_new_batch(&TestHarness::user()).await.unwrap();
    assert_eq!(h.cache.remaining(), 2);
    assert_eq!(h.feed.requests().await.len(), 2);
}

#[tokio::test]
async fn test_remote_failure_surfaces_as_error() {
    let mut h = TestHarness::new();
    h.feed.fail_next(ApiError::Status { status: 502 }).await;

    let result = h.cache.fetch_batch(&TestHarness::user(), false).await;
    assert!(result.is_err());
    assert_eq!(h.cache.remaining(), 0);
    assert!(!h.store.contains(CURATED_CACHE_KEY));
}

#[tokio::test]
async fn test_preview_does_not_mutate_cache_state() {
    let h = TestHarness::new();
    h.feed
        .set_repositories(vec![
            fixtures::repo_summary(1, 101, 500),
            fixtures::repo_summary(2, 102, 400),
        ])
        .await;

    let count = h.cache.fetch_batch_preview(&TestHarness::user()).await.unwrap();
    assert_eq!(count, 2);

    assert_eq!(h.cache.remaining(), 0);
    assert!(!h.store.contains(CURATED_CACHE_KEY));
}

#[tokio::test]
async fn test_save_failures_never_fail_the_operation() {
    let mut h = TestHarness::new();
    h.feed
        .set_repositories(vec![
            fixtures::repo_summary(1, 101, 500),
            fixtures::repo_summary(2, 102, 400),
        ])
        .await;
    h.store.set_fail_saves(true);

    // The fetch installs and tries to persist; the failed write is swallowed.
    h.cache.fetch_batch(&TestHarness::user(), false).await.unwrap();
    assert_eq!(h.cache.remaining(), 2);
    assert!(!h.store.contains(CURATED_CACHE_KEY));

    // Cursor mutations keep working on the in-memory state.
    h.cache.move_to_next();
    assert_eq!(h.cache.remaining(), 1);
    assert_eq!(h.cache.get_next().unwrap().github_id, 102);

    // Once storage recovers, the next mutation persists the whole record.
    h.store.set_fail_saves(false);
    h.cache.move_to_next();
    assert!(h.store.contains(CURATED_CACHE_KEY));

    let mut restarted = h.restarted();
    assert!(restarted.load_from_storage("octocat"));
    assert_eq!(restarted.remaining(), 0);
}

#[tokio::test]
async fn test_quota_gate_at_call_site() {
    let h = TestHarness::new();
    h.feed.set_daily_count(10).await;

    // The cache itself never refuses; the caller compares the reported count
    // against the limit before generating.
    let count = h.feed.daily_batch_count("octocat").await.unwrap();
    assert!(quota_exhausted(count, FeedConfig::default().daily_batch_limit));

    h.feed.set_daily_count(9).await;
    let count = h.feed.daily_batch_count("octocat").await.unwrap();
    assert!(!quota_exhausted(count, FeedConfig::default().daily_batch_limit));
}
