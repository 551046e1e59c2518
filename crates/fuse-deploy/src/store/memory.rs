//! In-memory state store for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::FuseResult;
use crate::state::DeploymentState;

use super::StateStore;

/// In-memory state store.
///
/// State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    states: RwLock<HashMap<String, DeploymentState>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self, key: &str) -> FuseResult<Option<DeploymentState>> {
        Ok(self.states.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, state: &DeploymentState) -> FuseResult<()> {
        self.states
            .write()
            .await
            .insert(key.to_owned(), state.clone());
        Ok(())
    }

    async fn discard(&self, key: &str) -> FuseResult<()> {
        self.states.write().await.remove(key);
        Ok(())
    }
}
