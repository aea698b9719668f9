//! Filter snapshots used as cache-invalidation keys.
//!
//! A snapshot captures the filter state that produced a batch. Two snapshots
//! compare equal iff every field matches exactly; star bounds are kept as the
//! text the user entered and only parsed when a request is built.

use serde::{Deserialize, Serialize};

use crate::api::TrendingPeriod;

/// Filter state for the curated feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedFilters {
    /// Selected category tags (empty = all categories).
    #[serde(default)]
    pub categories: Vec<String>,
    /// Minimum star count, as entered. Empty string = no bound.
    #[serde(default)]
    pub min_stars: String,
    /// Maximum star count, as entered. Empty string = no bound.
    #[serde(default)]
    pub max_stars: String,
    /// Selected languages (empty = all languages).
    #[serde(default)]
    pub languages: Vec<String>,
}

impl CuratedFilters {
    /// Parsed minimum star bound, if one is set and numeric.
    pub fn min_star_count(&self) -> Option<u64> {
        self.min_stars.trim().parse().ok()
    }

    /// Parsed maximum star bound, if one is set and numeric.
    pub fn max_star_count(&self) -> Option<u64> {
        self.max_stars.trim().parse().ok()
    }
}

/// Filter state for the trending feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingFilters {
    /// Optional language restriction.
    #[serde(default)]
    pub language: Option<String>,
    /// Time window the trending ranking covers.
    pub period: TrendingPeriod,
}

impl Default for TrendingFilters {
    fn default() -> Self {
        Self {
            language: None,
            period: TrendingPeriod::Daily,
        }
    }
}
