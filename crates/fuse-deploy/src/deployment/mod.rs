//! Pool deployment orchestration.
//!
//! This module drives the two remote steps (price oracle, then pool) and
//! records progress on a [`DeploymentState`](crate::DeploymentState) so
//! that failed attempts can be resumed.

mod controller;

pub use controller::{find_pool_id, DeploymentController};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::types::PoolId;

/// Where to send the user when no pool identifier could be found.
pub const MY_POOLS_PATH: &str = "/fuse?filter=my-pools";

/// Result of a completed deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentOutcome {
    /// Comptroller address of the new pool.
    pub pool_address: Address,
    /// Price oracle the pool was deployed with.
    pub price_oracle: Address,
    /// Directory index of the pool, if its registration event was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<PoolId>,
}

impl DeploymentOutcome {
    /// Page to open after deployment.
    ///
    /// The pool's edit page when its identifier is known, otherwise the
    /// user's pool listing.
    #[must_use]
    pub fn redirect_path(&self) -> String {
        match self.pool_id {
            Some(id) => format!("/fuse/pool/{id}/edit"),
            None => MY_POOLS_PATH.to_owned(),
        }
    }
}
