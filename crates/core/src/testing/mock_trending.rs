//! Mock trending source for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::api::{ApiError, TrendingRepo, TrendingSource};
use crate::filters::TrendingFilters;

/// Mock implementation of the [`TrendingSource`] trait.
///
/// Raw batch contents and per-slug canonical ids are configurable; a lookup
/// for a slug with no configured id fails, which is how tests exercise the
/// dropped-item path.
#[derive(Clone, Default)]
pub struct MockTrendingSource {
    repositories: Arc<RwLock<Vec<TrendingRepo>>>,
    ids: Arc<RwLock<HashMap<String, u64>>>,
    next_error: Arc<RwLock<Option<ApiError>>>,
    fetches: Arc<RwLock<Vec<TrendingFilters>>>,
    lookups: Arc<RwLock<Vec<String>>>,
}

impl MockTrendingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the raw batch the next fetches return.
    pub async fn set_repositories(&self, repositories: Vec<TrendingRepo>) {
        *self.repositories.write().await = repositories;
    }

    /// Configure the canonical id resolved for an "owner/name" slug.
    pub async fn set_repo_id(&self, slug: &str, id: u64) {
        self.ids.write().await.insert(slug.to_string(), id);
    }

    /// Fail the next `fetch_trending` with this error, once.
    pub async fn fail_next(&self, error: ApiError) {
        *self.next_error.write().await = Some(error);
    }

    /// All recorded fetch filter snapshots.
    pub async fn fetches(&self) -> Vec<TrendingFilters> {
        self.fetches.read().await.clone()
    }

    /// All recorded canonical-id lookups, in dispatch completion order.
    pub async fn lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl TrendingSource for MockTrendingSource {
    async fn fetch_trending(
        &self,
        filters: &TrendingFilters,
        _batch_size: u32,
    ) -> Result<Vec<TrendingRepo>, ApiError> {
        self.fetches.write().await.push(filters.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.repositories.read().await.clone())
    }

    async fn resolve_repo_id(&self, owner: &str, name: &str) -> Result<u64, ApiError> {
        let slug = format!("{}/{}", owner, name);
        self.lookups.write().await.push(slug.clone());

        match self.ids.read().await.get(&slug) {
            Some(id) => Ok(*id),
            None => Err(ApiError::Status { status: 404 }),
        }
    }
}
