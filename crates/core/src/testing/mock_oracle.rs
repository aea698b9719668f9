//! Mock interaction oracle for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::api::{ApiError, InteractionKind, InteractionOracle};

/// A recorded interaction for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInteraction {
    pub username: String,
    pub repo_id: u64,
    pub kind: InteractionKind,
}

/// Mock implementation of the [`InteractionOracle`] trait.
#[derive(Clone, Default)]
pub struct MockInteractionOracle {
    interacted: Arc<RwLock<HashSet<u64>>>,
    next_error: Arc<RwLock<Option<ApiError>>>,
    recorded: Arc<RwLock<Vec<RecordedInteraction>>>,
}

impl MockInteractionOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the set of already-interacted canonical ids.
    pub async fn set_interacted(&self, ids: impl IntoIterator<Item = u64>) {
        *self.interacted.write().await = ids.into_iter().collect();
    }

    /// Fail the next `interacted_repo_ids` with this error, once.
    pub async fn fail_next(&self, error: ApiError) {
        *self.next_error.write().await = Some(error);
    }

    /// All interactions recorded through the oracle.
    pub async fn recorded(&self) -> Vec<RecordedInteraction> {
        self.recorded.read().await.clone()
    }
}

#[async_trait]
impl InteractionOracle for MockInteractionOracle {
    async fn interacted_repo_ids(&self, _username: &str) -> Result<HashSet<u64>, ApiError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.interacted.read().await.clone())
    }

    async fn record_interaction(
        &self,
        username: &str,
        repo_id: u64,
        kind: InteractionKind,
    ) -> Result<(), ApiError> {
        self.recorded.write().await.push(RecordedInteraction {
            username: username.to_string(),
            repo_id,
            kind,
        });
        self.interacted.write().await.insert(repo_id);
        Ok(())
    }
}
