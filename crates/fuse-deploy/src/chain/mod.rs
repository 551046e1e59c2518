//! Chain capability used by the deployment workflow.
//!
//! The workflow never talks to a node directly. Everything it needs from the
//! chain (deploying contracts, reading the pool directory's registration
//! events) goes through [`ChainCapability`], so the SDK behind it can be
//! swapped without touching the step logic.

mod simulated;

pub use simulated::SimulatedChain;

use std::fmt;

use alloy_primitives::{address, Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::types::PoolId;

/// Public master price oracle on Ethereum mainnet.
///
/// Freshly deployed pool oracles fall back to it for any asset they have no
/// feed for.
pub const PUBLIC_MASTER_PRICE_ORACLE: Address =
    address!("1887118E49e0F4A78Bd71B792a49dE03504A764D");

/// Kind of price oracle contract to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleKind {
    /// Oracle that routes each underlying to a configured feed.
    MasterPriceOracle,
}

impl OracleKind {
    /// Contract name understood by the SDK.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MasterPriceOracle => "MasterPriceOracle",
        }
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constructor arguments for a master price oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOracleConfig {
    /// Underlyings with a dedicated feed.
    pub underlyings: Vec<Address>,
    /// Feeds matching `underlyings` by position.
    pub oracles: Vec<Address>,
    /// Whether the admin may replace feeds later.
    pub can_admin_overwrite: bool,
    /// Oracle consulted for underlyings with no dedicated feed.
    pub default_oracle: Address,
}

impl PriceOracleConfig {
    /// An empty, admin-editable oracle that defers everything to `default_oracle`.
    #[must_use]
    pub const fn with_fallback(default_oracle: Address) -> Self {
        Self {
            underlyings: Vec::new(),
            oracles: Vec::new(),
            can_admin_overwrite: true,
            default_oracle,
        }
    }
}

/// Transaction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOptions {
    /// Sending account.
    pub from: Address,
}

/// Arguments for deploying a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDeployment {
    /// Pool name.
    pub name: String,
    /// Whether supplying is restricted to `whitelist`.
    pub enforce_whitelist: bool,
    /// Close factor mantissa (18 decimals).
    pub close_factor: U256,
    /// Liquidation incentive mantissa (18 decimals).
    pub liquidation_incentive: U256,
    /// Price oracle the pool reads from.
    pub price_oracle: Address,
    /// Supplier whitelist, present only when enforced.
    pub whitelist: Option<Vec<Address>>,
}

/// Result of a successful pool deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedPool {
    /// Address of the pool's comptroller (the pool's main contract).
    pub comptroller: Address,
}

/// Pool descriptor carried by a registration event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPool {
    /// Pool name.
    pub name: String,
    /// Account that registered the pool.
    pub creator: Address,
    /// Comptroller address.
    pub comptroller: Address,
    /// Block in which the pool was registered.
    pub block_posted: u64,
}

/// `PoolRegistered` event emitted by the pool directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRegisteredEvent {
    /// Directory index of the pool.
    pub index: PoolId,
    /// Registered pool.
    pub pool: RegisteredPool,
}

/// Operations the deployment workflow needs from the chain.
///
/// Every method may suspend for as long as it takes the transaction or query
/// to resolve. Implementations must not retry on their own.
#[async_trait]
pub trait ChainCapability: Send + Sync {
    /// The public price oracle new pool oracles fall back to.
    fn public_price_oracle(&self) -> Address;

    /// Deploy a price oracle and return its address.
    async fn deploy_price_oracle(
        &self,
        kind: OracleKind,
        config: &PriceOracleConfig,
        options: &TxOptions,
    ) -> Result<Address, ChainError>;

    /// Deploy and register a pool.
    async fn deploy_pool(
        &self,
        request: &PoolDeployment,
        options: &TxOptions,
    ) -> Result<DeployedPool, ChainError>;

    /// Current block height.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// `PoolRegistered` events from `from_block` to the latest block, in
    /// chain order.
    async fn pool_registered_events(
        &self,
        from_block: u64,
    ) -> Result<Vec<PoolRegisteredEvent>, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_config_matches_directory_defaults() {
        let config = PriceOracleConfig::with_fallback(PUBLIC_MASTER_PRICE_ORACLE);
        assert!(config.underlyings.is_empty());
        assert!(config.oracles.is_empty());
        assert!(config.can_admin_overwrite);
        assert_eq!(config.default_oracle, PUBLIC_MASTER_PRICE_ORACLE);
    }

    #[test]
    fn oracle_config_uses_sdk_field_names() {
        let config = PriceOracleConfig::with_fallback(Address::ZERO);
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("canAdminOverwrite").is_some());
        assert!(json.get("defaultOracle").is_some());
    }

    #[test]
    fn oracle_kind_name() {
        assert_eq!(OracleKind::MasterPriceOracle.to_string(), "MasterPriceOracle");
    }
}
