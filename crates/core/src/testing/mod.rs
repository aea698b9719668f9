//! Test doubles for the remote boundaries and local persistence.
//!
//! These mocks let the cache components run without a network or a sqlite
//! file: configurable results, one-shot error injection, and recorded calls
//! for assertions.

mod memory_store;
mod mock_feed;
mod mock_oracle;
mod mock_trending;

pub use memory_store::MemoryCacheStore;
pub use mock_feed::MockCuratedFeed;
pub use mock_oracle::MockInteractionOracle;
pub use mock_trending::MockTrendingSource;

/// Canned data builders used across tests.
pub mod fixtures {
    use std::collections::HashMap;

    use crate::api::{RepoSummary, TrendingRepo};

    /// A curated repo summary with the given ids and star count.
    pub fn repo_summary(id: u64, github_id: u64, stars: u64) -> RepoSummary {
        RepoSummary {
            id,
            github_id,
            owner: "owner".to_string(),
            name: format!("repo-{}", id),
            category: Some("tools".to_string()),
            description: "a repository".to_string(),
            stargazer_count: stars,
            watcher_count: stars,
            fork_count: stars / 10,
            languages: HashMap::from([("Rust".to_string(), 1024)]),
            license: Some("MIT".to_string()),
            topics: vec!["cli".to_string()],
            repo_created_at: "2020-01-01T00:00:00Z".to_string(),
            repo_updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    /// A raw trending repo with the given slug parts and star count.
    pub fn trending_repo(author: &str, name: &str, stars: u64) -> TrendingRepo {
        TrendingRepo {
            author: author.to_string(),
            name: name.to_string(),
            url: Some(format!("https://github.com/{}/{}", author, name)),
            description: Some("trending".to_string()),
            language: Some("Rust".to_string()),
            stars,
            forks: stars / 10,
        }
    }
}
