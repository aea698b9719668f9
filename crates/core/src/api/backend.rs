//! Curated backend API client.
//!
//! Talks to the discovery backend: uninteracted batch queries, interaction
//! listing and recording, quota logging, category listing. Every request
//! carries the bearer credential; a 401 invalidates it and broadcasts a
//! re-authentication signal before surfacing [`ApiError::Unauthorized`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::{AuthEvents, CredentialStore};
use crate::filters::{CuratedFilters, TrendingFilters};

use super::types::{CuratedBatch, InteractionKind, ResolvedTrendingBatch};
use super::{ApiError, CuratedFeed, InteractionOracle};

/// Backend client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the discovery backend, e.g. "https://backend.example.com/api".
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Client for the curated discovery backend.
pub struct BackendClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    auth_events: AuthEvents,
}

impl BackendClient {
    pub fn new(
        config: BackendConfig,
        credentials: Arc<dyn CredentialStore>,
        auth_events: AuthEvents,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            auth_events,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map non-2xx statuses to errors. A 401 discards the credential and
    /// notifies subscribers before returning.
    fn check_status(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.as_u16() == 401 {
            warn!("Backend rejected credential, invalidating");
            self.credentials.invalidate();
            self.auth_events.credential_invalidated();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// List the category tags the backend curates.
    pub async fn fetch_categories(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/repos/categories/", self.base_url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = self.check_status(response)?;

        let categories: CategoriesResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("categories response: {}", e)))?;

        Ok(categories.categories)
    }

    /// Server-resolved trending batch: every item already carries its
    /// canonical id, so no enrichment pass is needed.
    pub async fn fetch_uninteracted_trending(
        &self,
        username: &str,
        batch_size: u32,
        filters: &TrendingFilters,
    ) -> Result<ResolvedTrendingBatch, ApiError> {
        let url = format!("{}/repos/trending/uninteracted/", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("username", username.to_string()),
            ("batch_size", batch_size.to_string()),
            ("period", filters.period.as_str().to_string()),
        ];
        if let Some(language) = &filters.language {
            query.push(("language", language.clone()));
        }

        debug!(username, batch_size, "Fetching server-resolved trending batch");

        let response = self
            .authorized(self.client.get(&url))
            .query(&query)
            .send()
            .await?;
        let response = self.check_status(response)?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("trending batch response: {}", e)))
    }
}

#[async_trait]
impl CuratedFeed for BackendClient {
    async fn fetch_uninteracted(
        &self,
        username: &str,
        batch_size: u32,
        filters: &CuratedFilters,
    ) -> Result<CuratedBatch, ApiError> {
        let url = format!("{}/repos/uninteracted/", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("username", username.to_string()),
            ("batch_size", batch_size.to_string()),
        ];
        for category in &filters.categories {
            query.push(("category", category.clone()));
        }
        if let Some(min) = filters.min_star_count() {
            query.push(("min_star_count", min.to_string()));
        }
        if let Some(max) = filters.max_star_count() {
            query.push(("max_star_count", max.to_string()));
        }
        if !filters.languages.is_empty() {
            query.push(("languages", filters.languages.join(",")));
        }

        debug!(username, batch_size, "Fetching curated batch");

        let response = self
            .authorized(self.client.get(&url))
            .query(&query)
            .send()
            .await?;
        let response = self.check_status(response)?;

        let batch: CuratedBatch = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("curated batch response: {}", e)))?;

        debug!(count = batch.repositories.len(), "Curated batch received");
        Ok(batch)
    }

    async fn log_batch_generation(&self, user_id: i64) -> Result<(), ApiError> {
        let url = format!("{}/batch/log/", self.base_url);

        let response = self
            .authorized(self.client.post(&url))
            .json(&BatchLogRequest { user_id })
            .send()
            .await?;
        self.check_status(response)?;

        Ok(())
    }

    async fn daily_batch_count(&self, _username: &str) -> Result<u32, ApiError> {
        let url = format!("{}/batch/daily-count/", self.base_url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = self.check_status(response)?;

        let count: DailyBatchCountResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("daily count response: {}", e)))?;

        Ok(count.batch_count)
    }
}

#[async_trait]
impl InteractionOracle for BackendClient {
    async fn interacted_repo_ids(&self, username: &str) -> Result<HashSet<u64>, ApiError> {
        let url = format!("{}/users/interactions/", self.base_url);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("username", username)])
            .send()
            .await?;
        let response = self.check_status(response)?;

        let rows: Vec<InteractionRow> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("interactions response: {}", e)))?;

        debug!(username, count = rows.len(), "Interaction set fetched");
        Ok(rows.into_iter().map(|row| row.repository).collect())
    }

    async fn record_interaction(
        &self,
        username: &str,
        repo_id: u64,
        kind: InteractionKind,
    ) -> Result<(), ApiError> {
        let url = format!("{}/interactions/", self.base_url);

        let response = self
            .authorized(self.client.post(&url))
            .json(&RecordInteractionRequest {
                user: username.to_string(),
                repository: repo_id,
                interaction: kind.as_str().to_string(),
            })
            .send()
            .await?;
        self.check_status(response)?;

        debug!(username, repo_id, kind = kind.as_str(), "Interaction recorded");
        Ok(())
    }
}

// ============================================================================
// Backend wire types (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct BatchLogRequest {
    user_id: i64,
}

#[derive(Debug, Serialize)]
struct RecordInteractionRequest {
    user: String,
    repository: u64,
    interaction: String,
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBatchCountResponse {
    batch_count: u32,
}

#[derive(Debug, Deserialize)]
struct InteractionRow {
    repository: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_rows_decode() {
        let json = r#"[
            {"id": 1, "user": "octocat", "repository": 101, "interaction": "star", "interacted_at": "2024-01-01T00:00:00Z"},
            {"id": 2, "user": "octocat", "repository": 202, "interaction": "pass", "interacted_at": "2024-01-02T00:00:00Z"}
        ]"#;

        let rows: Vec<InteractionRow> = serde_json::from_str(json).unwrap();
        let ids: HashSet<u64> = rows.into_iter().map(|r| r.repository).collect();
        assert_eq!(ids, HashSet::from([101, 202]));
    }

    #[test]
    fn test_daily_count_decodes() {
        let json = r#"{"date": "2024-06-01", "batch_count": 7}"#;
        let count: DailyBatchCountResponse = serde_json::from_str(json).unwrap();
        assert_eq!(count.batch_count, 7);
    }

    #[test]
    fn test_categories_response_decodes() {
        let json = r#"{"categories": ["ml", "databases", "tools"]}"#;
        let response: CategoriesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.categories, vec!["ml", "databases", "tools"]);

        let empty: CategoriesResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.categories.is_empty());
    }

    #[test]
    fn test_resolved_trending_batch_decodes() {
        let json = r#"{
            "count": 1,
            "repositories": [{
                "github_id": 1296269,
                "owner": "octocat",
                "name": "Hello-World",
                "description": "My first repository",
                "language": "Rust",
                "stars": 1988,
                "forks": 9219,
                "url": "https://github.com/octocat/Hello-World"
            }]
        }"#;

        let batch: ResolvedTrendingBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.count, 1);
        assert_eq!(batch.repositories[0].github_id, 1296269);
        assert_eq!(batch.repositories[0].language.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_curated_batch_envelope_decodes() {
        let json = r#"{
            "username": "octocat",
            "batch_size": 10,
            "count": 1,
            "repositories": [{
                "id": 1,
                "github_id": 2,
                "owner": "a",
                "name": "b",
                "stargazer_count": 5,
                "watcher_count": 5,
                "fork_count": 1,
                "repo_created_at": "2020-01-01T00:00:00Z",
                "repo_updated_at": "2020-01-01T00:00:00Z"
            }]
        }"#;

        let batch: CuratedBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.count, 1);
        assert_eq!(batch.repositories[0].github_id, 2);
    }
}
