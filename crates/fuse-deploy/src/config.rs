//! Configuration for fuse-deploy.
//!
//! These structs are deserialised from the `[chain]`, `[deployment]` and
//! `[store]` tables of the operator's configuration file. Every field has a
//! default so an empty table is valid.

use std::path::PathBuf;

use alloy_primitives::Address;
use serde::Deserialize;

use crate::chain::PUBLIC_MASTER_PRICE_ORACLE;

/// Chain configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Account deployments are sent from.
    #[serde(default)]
    pub deployer: Option<Address>,

    /// Public oracle new pool oracles fall back to.
    #[serde(default = "default_public_price_oracle")]
    pub public_price_oracle: Address,

    /// Block height the simulated chain starts at.
    #[serde(default)]
    pub start_block: u64,

    /// Pools already registered in the simulated directory.
    #[serde(default)]
    pub existing_pools: u64,
}

const fn default_public_price_oracle() -> Address {
    PUBLIC_MASTER_PRICE_ORACLE
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            deployer: None,
            public_price_oracle: default_public_price_oracle(),
            start_block: 0,
            existing_pools: 0,
        }
    }
}

/// Deployment behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    /// How many blocks back to search for the pool's registration event.
    #[serde(default = "default_event_lookback_blocks")]
    pub event_lookback_blocks: u64,
}

const fn default_event_lookback_blocks() -> u64 {
    10
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            event_lookback_blocks: default_event_lookback_blocks(),
        }
    }
}

/// Persisted deployment state configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one state file per pending deployment.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".fuse/deployments")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}
