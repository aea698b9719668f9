use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::{BackendConfig, GitHubConfig};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Local persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("reposcout.db")
}

/// Feed and cache tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Requested curated batch size.
    #[serde(default = "default_curated_batch_size")]
    pub curated_batch_size: u32,
    /// Requested trending batch size.
    #[serde(default = "default_trending_batch_size")]
    pub trending_batch_size: u32,
    /// Daily batch-generation quota, checked by callers before generating.
    #[serde(default = "default_daily_batch_limit")]
    pub daily_batch_limit: u32,
    /// Concurrent canonical-id lookups during enrichment.
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,
    /// Curated cache TTL in hours.
    #[serde(default = "default_curated_ttl_hours")]
    pub curated_ttl_hours: i64,
    /// Trending cache TTL in minutes. Trending updates frequently.
    #[serde(default = "default_trending_ttl_minutes")]
    pub trending_ttl_minutes: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            curated_batch_size: default_curated_batch_size(),
            trending_batch_size: default_trending_batch_size(),
            daily_batch_limit: default_daily_batch_limit(),
            enrichment_concurrency: default_enrichment_concurrency(),
            curated_ttl_hours: default_curated_ttl_hours(),
            trending_ttl_minutes: default_trending_ttl_minutes(),
        }
    }
}

fn default_curated_batch_size() -> u32 {
    10
}

fn default_trending_batch_size() -> u32 {
    30
}

fn default_daily_batch_limit() -> u32 {
    10
}

fn default_enrichment_concurrency() -> usize {
    8
}

fn default_curated_ttl_hours() -> i64 {
    24
}

fn default_trending_ttl_minutes() -> i64 {
    60
}
