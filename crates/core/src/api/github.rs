//! GitHub search API client, the trending source.
//!
//! Trending is approximated the way the backend's legacy path did it: a
//! repository search restricted to a creation-date window derived from the
//! trending period, ordered by stars. The search results do not feed the
//! cache directly; the enrichment pipeline resolves each item's canonical id
//! with a per-repository lookup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::CredentialStore;
use crate::filters::TrendingFilters;

use super::types::TrendingRepo;
use super::{ApiError, TrendingSource};

/// GitHub client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Base URL (default: https://api.github.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// GitHub search API client.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl GitHubClient {
    pub fn new(
        config: GitHubConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(format!("reposcout/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/vnd.github+json");
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Build the search query string for a trending window, e.g.
    /// `created:>2024-05-25 language:rust`.
    fn search_query(filters: &TrendingFilters) -> String {
        let from = Utc::now().date_naive() - chrono::Duration::days(filters.period.days_back());
        let mut query = format!("created:>{}", from.format("%Y-%m-%d"));
        if let Some(language) = &filters.language {
            query.push_str(&format!(" language:{}", language));
        }
        query
    }
}

#[async_trait]
impl TrendingSource for GitHubClient {
    async fn fetch_trending(
        &self,
        filters: &TrendingFilters,
        batch_size: u32,
    ) -> Result<Vec<TrendingRepo>, ApiError> {
        let url = format!("{}/search/repositories", self.base_url);
        let query = Self::search_query(filters);

        debug!(%query, batch_size, "Searching trending repositories");

        let response = self
            .authorized(self.client.get(&url))
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", &batch_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            warn!("GitHub rejected token on trending search");
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("search response: {}", e)))?;

        debug!(count = search.items.len(), "Trending search results received");
        Ok(search.items.into_iter().map(TrendingRepo::from).collect())
    }

    async fn resolve_repo_id(&self, owner: &str, name: &str) -> Result<u64, ApiError> {
        let url = format!(
            "{}/repos/{}/{}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(name)
        );

        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        let details: RepoDetails = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("repo details response: {}", e)))?;

        Ok(details.id)
    }
}

// ============================================================================
// GitHub API response types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    name: String,
    owner: SearchOwner,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoDetails {
    id: u64,
}

impl From<SearchItem> for TrendingRepo {
    fn from(item: SearchItem) -> Self {
        TrendingRepo {
            author: item.owner.login,
            name: item.name,
            url: Some(item.html_url),
            description: item.description,
            language: item.language,
            stars: item.stargazers_count,
            forks: item.forks_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TrendingPeriod;

    #[test]
    fn test_search_query_includes_language() {
        let filters = TrendingFilters {
            language: Some("rust".to_string()),
            period: TrendingPeriod::Weekly,
        };
        let query = GitHubClient::search_query(&filters);
        assert!(query.starts_with("created:>"));
        assert!(query.ends_with(" language:rust"));
    }

    #[test]
    fn test_search_query_without_language() {
        let filters = TrendingFilters {
            language: None,
            period: TrendingPeriod::Daily,
        };
        let query = GitHubClient::search_query(&filters);
        assert!(!query.contains("language:"));
    }

    #[test]
    fn test_search_item_maps_to_trending_repo() {
        let json = r#"{
            "items": [{
                "id": 1296269,
                "name": "Hello-World",
                "owner": {"login": "octocat"},
                "html_url": "https://github.com/octocat/Hello-World",
                "description": "My first repository",
                "language": "Rust",
                "stargazers_count": 1988,
                "forks_count": 9219
            }]
        }"#;

        let search: SearchResponse = serde_json::from_str(json).unwrap();
        let repos: Vec<TrendingRepo> = search.items.into_iter().map(TrendingRepo::from).collect();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].slug(), "octocat/Hello-World");
        assert_eq!(repos[0].stars, 1988);
    }
}
