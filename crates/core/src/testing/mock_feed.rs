//! Mock curated feed for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::api::{ApiError, CuratedBatch, CuratedFeed, RepoSummary};
use crate::filters::CuratedFilters;

/// A recorded batch request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedBatchRequest {
    pub username: String,
    pub batch_size: u32,
    pub filters: CuratedFilters,
}

/// Mock implementation of the [`CuratedFeed`] trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable batch contents
/// - Fail the next call with an injected error
/// - Track requests and quota-log calls for assertions
#[derive(Clone, Default)]
pub struct MockCuratedFeed {
    repositories: Arc<RwLock<Vec<RepoSummary>>>,
    next_error: Arc<RwLock<Option<ApiError>>>,
    requests: Arc<RwLock<Vec<RecordedBatchRequest>>>,
    log_calls: Arc<RwLock<Vec<i64>>>,
    fail_log_calls: Arc<RwLock<bool>>,
    daily_count: Arc<RwLock<u32>>,
}

impl MockCuratedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the repositories the next fetches return.
    pub async fn set_repositories(&self, repositories: Vec<RepoSummary>) {
        *self.repositories.write().await = repositories;
    }

    /// Fail the next `fetch_uninteracted` with this error, once.
    pub async fn fail_next(&self, error: ApiError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make quota-log calls fail.
    pub async fn set_fail_log_calls(&self, fail: bool) {
        *self.fail_log_calls.write().await = fail;
    }

    /// Configure the reported daily batch count.
    pub async fn set_daily_count(&self, count: u32) {
        *self.daily_count.write().await = count;
    }

    /// All recorded batch requests.
    pub async fn requests(&self) -> Vec<RecordedBatchRequest> {
        self.requests.read().await.clone()
    }

    /// All recorded quota-log calls.
    pub async fn log_calls(&self) -> Vec<i64> {
        self.log_calls.read().await.clone()
    }
}

#[async_trait]
impl CuratedFeed for MockCuratedFeed {
    async fn fetch_uninteracted(
        &self,
        username: &str,
        batch_size: u32,
        filters: &CuratedFilters,
    ) -> Result<CuratedBatch, ApiError> {
        self.requests.write().await.push(RecordedBatchRequest {
            username: username.to_string(),
            batch_size,
            filters: filters.clone(),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let repositories = self.repositories.read().await.clone();
        Ok(CuratedBatch {
            count: repositories.len(),
            repositories,
        })
    }

    async fn log_batch_generation(&self, user_id: i64) -> Result<(), ApiError> {
        self.log_calls.write().await.push(user_id);
        if *self.fail_log_calls.read().await {
            return Err(ApiError::Status { status: 500 });
        }
        Ok(())
    }

    async fn daily_batch_count(&self, _username: &str) -> Result<u32, ApiError> {
        Ok(*self.daily_count.read().await)
    }
}
