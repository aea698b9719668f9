//! Remote feed clients.
//!
//! This module provides typed clients for the two remote sources the caches
//! draw from (the curated backend and the GitHub search API), plus the trait
//! seams the cache components depend on so tests can substitute mocks.

mod backend;
mod github;
mod types;

pub use backend::{BackendClient, BackendConfig};
pub use github::{GitHubClient, GitHubConfig};
pub use types::*;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::filters::{CuratedFilters, TrendingFilters};

/// Errors from remote feed calls.
///
/// Callers treat `Transport` and `Decode` identically (retryable, shown as a
/// generic failure); `Unauthorized` is distinguished because it invalidates
/// the stored credential and broadcasts a re-authentication signal.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure (no route, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Credential was rejected (401).
    #[error("Authorization failed")]
    Unauthorized,

    /// Any other unexpected HTTP status.
    #[error("API error: status {status}")]
    Status { status: u16 },
}

impl ApiError {
    /// Whether the failure is a retryable transport/decode class failure.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Unauthorized)
    }
}

/// Source of curated candidate batches and the daily quota counters.
#[async_trait]
pub trait CuratedFeed: Send + Sync {
    /// Fetch a bounded batch of repositories the user has not interacted with.
    async fn fetch_uninteracted(
        &self,
        username: &str,
        batch_size: u32,
        filters: &CuratedFilters,
    ) -> Result<CuratedBatch, ApiError>;

    /// Record that a batch was generated for this user. Best-effort: callers
    /// never let a failure here fail the batch itself.
    async fn log_batch_generation(&self, user_id: i64) -> Result<(), ApiError>;

    /// How many batches the user has generated today. Always re-read from the
    /// backend before a quota-gated action; never cached locally.
    async fn daily_batch_count(&self, username: &str) -> Result<u32, ApiError>;
}

/// Source of raw trending batches and canonical-id lookups.
#[async_trait]
pub trait TrendingSource: Send + Sync {
    /// Fetch a raw trending batch for the given filter window.
    async fn fetch_trending(
        &self,
        filters: &TrendingFilters,
        batch_size: u32,
    ) -> Result<Vec<TrendingRepo>, ApiError>;

    /// Resolve the canonical numeric id for one repository.
    async fn resolve_repo_id(&self, owner: &str, name: &str) -> Result<u64, ApiError>;
}

/// Supplies the set of canonical ids the user has already acted on, and
/// records new interactions.
#[async_trait]
pub trait InteractionOracle: Send + Sync {
    /// All canonical repo ids the user has starred or passed on.
    async fn interacted_repo_ids(&self, username: &str) -> Result<HashSet<u64>, ApiError>;

    /// Record one interaction. Fire and forget: not retried by this crate.
    async fn record_interaction(
        &self,
        username: &str,
        repo_id: u64,
        kind: InteractionKind,
    ) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_not_retryable() {
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(ApiError::Decode("bad json".to_string()).is_retryable());
        assert!(ApiError::Status { status: 502 }.is_retryable());
    }
}
