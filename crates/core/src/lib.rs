//! reposcout-core: client-side repository discovery engine.
//!
//! The crate owns the batch cache and enrichment pipeline behind a swipe-style
//! discovery UI: bounded batch fetches from a curated backend and a trending
//! source, local persistence with TTL/identity/filter invalidation, concurrent
//! canonical-id enrichment with already-interacted filtering, and a stable
//! resumable cursor per feed. Presentation is entirely the embedder's concern.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod filters;
pub mod metrics;
pub mod store;
pub mod testing;
pub mod trending;

pub use api::{
    ApiError, BackendClient, BackendConfig, CuratedFeed, EnrichedTrendingRepo, GitHubClient,
    GitHubConfig, InteractionKind, InteractionOracle, RepoSummary, TrendingPeriod, TrendingRepo,
    TrendingSource, UserRef,
};
pub use auth::{AuthEvent, AuthEvents, CredentialStore, MemoryCredentialStore};
pub use cache::{quota_exhausted, BatchCache, BatchRecord, CuratedBatchCache, ValidityPolicy};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError, FeedConfig};
pub use filters::{CuratedFilters, TrendingFilters};
pub use store::{CacheStore, SqliteCacheStore, StoreError};
pub use trending::TrendingPipeline;
