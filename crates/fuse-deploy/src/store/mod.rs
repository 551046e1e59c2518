//! Deployment state persistence.
//!
//! A [`DeploymentState`] normally lives only as long as the caller holding
//! it. Persisting it lets a failed attempt be retried by a later process
//! without redeploying steps that already succeeded.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use alloy_primitives::{hex, keccak256};
use async_trait::async_trait;

use crate::error::FuseResult;
use crate::state::DeploymentState;

/// Backend for storing in-progress deployment state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state saved under `key`.
    ///
    /// Returns `None` if nothing was saved.
    async fn load(&self, key: &str) -> FuseResult<Option<DeploymentState>>;

    /// Save `state` under `key`, replacing any previous value.
    async fn save(&self, key: &str, state: &DeploymentState) -> FuseResult<()>;

    /// Forget the state saved under `key`. Missing keys are not an error.
    async fn discard(&self, key: &str) -> FuseResult<()>;
}

/// Derive a file-safe store key from a pool name.
///
/// The readable part lowercases the name and collapses every run of
/// non-alphanumeric characters into a single `-`. A short digest of the
/// exact name is appended, so names that slug the same still get distinct
/// keys.
#[must_use]
pub fn state_key(pool_name: &str) -> String {
    let mut slug = String::with_capacity(pool_name.len());
    for c in pool_name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = match slug.trim_end_matches('-') {
        "" => "unnamed",
        slug => slug,
    };
    let digest = keccak256(pool_name.as_bytes());
    format!("{slug}-{}", hex::encode(&digest[..4]))
}
