//! Types for the remote feed clients.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discoverable candidate from the curated feed.
///
/// Created by deserializing a backend response and never mutated afterwards;
/// it lives exactly as long as the batch that carried it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    /// Backend-assigned numeric id, unique within the curated feed.
    pub id: u64,
    /// Canonical GitHub repository id, used for interaction tracking.
    pub github_id: u64,
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Curation category tag.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    pub stargazer_count: u64,
    pub watcher_count: u64,
    pub fork_count: u64,
    /// Language name -> byte count.
    #[serde(default)]
    pub languages: HashMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Repository creation timestamp, as reported by the backend.
    pub repo_created_at: String,
    /// Repository last-update timestamp, as reported by the backend.
    pub repo_updated_at: String,
}

/// A raw item from the trending source, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingRepo {
    /// Repository owner login.
    pub author: String,
    /// Repository name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
}

impl TrendingRepo {
    /// "owner/name" slug, unique within one trending batch.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.author, self.name)
    }
}

/// A trending item whose canonical id has been resolved.
///
/// The canonical id is present iff enrichment succeeded; items that fail
/// resolution are dropped, never retained with a missing id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTrendingRepo {
    /// The raw trending item.
    pub trending: TrendingRepo,
    /// Canonical GitHub repository id.
    pub github_id: u64,
    /// When the enrichment lookup completed.
    pub fetched_at: DateTime<Utc>,
}

/// Time window covered by a trending query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl TrendingPeriod {
    /// How many days back the window reaches.
    pub fn days_back(&self) -> i64 {
        match self {
            TrendingPeriod::Daily => 1,
            TrendingPeriod::Weekly => 7,
            TrendingPeriod::Monthly => 30,
        }
    }

    /// Wire value used in backend query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingPeriod::Daily => "daily",
            TrendingPeriod::Weekly => "weekly",
            TrendingPeriod::Monthly => "monthly",
        }
    }
}

/// The kind of interaction a user can record against a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Star,
    Pass,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Star => "star",
            InteractionKind::Pass => "pass",
        }
    }
}

/// Identifies the current user towards the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    /// Login name, used as the identity key for caches and queries.
    pub username: String,
    /// Backend-assigned numeric id, required only for quota logging.
    pub id: Option<i64>,
}

impl UserRef {
    pub fn new(username: impl Into<String>, id: Option<i64>) -> Self {
        Self {
            username: username.into(),
            id,
        }
    }
}

/// Response envelope for the curated uninteracted-repos query.
#[derive(Debug, Clone, Deserialize)]
pub struct CuratedBatch {
    pub count: usize,
    #[serde(default)]
    pub repositories: Vec<RepoSummary>,
}

/// Response envelope for the server-resolved trending query.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedTrendingBatch {
    pub count: usize,
    #[serde(default)]
    pub repositories: Vec<ResolvedTrendingRepo>,
}

/// A trending item whose canonical id was resolved server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedTrendingRepo {
    pub github_id: u64,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    #[serde(default)]
    pub url: Option<String>,
}
