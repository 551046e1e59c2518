//! In-memory chain for tests and dry runs.

use std::collections::HashMap;
use std::sync::RwLock;

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::debug;

use crate::error::ChainError;
use crate::types::PoolId;

use super::{
    ChainCapability, DeployedPool, OracleKind, PoolDeployment, PoolRegisteredEvent,
    PriceOracleConfig, RegisteredPool, TxOptions,
};

/// Chain that keeps its ledger in memory.
///
/// Each successful transaction mines one block. Contract addresses follow
/// CREATE derivation from the sender and its nonce, and every pool
/// deployment appends a `PoolRegistered` event to the directory. Failures can
/// be queued per operation to exercise retry paths.
#[derive(Debug)]
pub struct SimulatedChain {
    public_price_oracle: Address,
    ledger: RwLock<Ledger>,
}

#[derive(Debug, Default)]
struct Ledger {
    block: u64,
    nonces: HashMap<Address, u64>,
    registrations: Vec<(u64, PoolRegisteredEvent)>,
    next_pool_index: u64,
    oracle_failures: u32,
    pool_failures: u32,
    fail_event_queries: bool,
    oracle_calls: u32,
    pool_calls: u32,
}

impl Ledger {
    fn mine(&mut self, sender: Address) -> Address {
        let nonce = self.nonces.entry(sender).or_insert(0);
        let deployed = sender.create(*nonce);
        *nonce += 1;
        self.block += 1;
        deployed
    }
}

impl SimulatedChain {
    /// Create an empty chain at block zero.
    #[must_use]
    pub fn new(public_price_oracle: Address) -> Self {
        Self {
            public_price_oracle,
            ledger: RwLock::new(Ledger::default()),
        }
    }

    /// Start from the given block height.
    #[must_use]
    pub fn with_start_block(self, block: u64) -> Self {
        self.write_ledger(|ledger| ledger.block = block);
        self
    }

    /// Pretend the directory already holds `count` pools, so the next pool
    /// receives index `count`.
    #[must_use]
    pub fn with_existing_pools(self, count: u64) -> Self {
        self.write_ledger(|ledger| ledger.next_pool_index = count);
        self
    }

    /// Set the next transaction nonce of `account`.
    #[must_use]
    pub fn with_nonce(self, account: Address, nonce: u64) -> Self {
        self.write_ledger(|ledger| {
            ledger.nonces.insert(account, nonce);
        });
        self
    }

    /// Make the next `count` oracle deployments revert.
    pub fn fail_next_oracle_deploys(&self, count: u32) {
        self.write_ledger(|ledger| ledger.oracle_failures = count);
    }

    /// Make the next `count` pool deployments revert.
    pub fn fail_next_pool_deploys(&self, count: u32) {
        self.write_ledger(|ledger| ledger.pool_failures = count);
    }

    /// Make event queries fail until switched off.
    pub fn fail_event_queries(&self, fail: bool) {
        self.write_ledger(|ledger| ledger.fail_event_queries = fail);
    }

    /// Register a pool deployed by someone else in the current block.
    pub fn register_foreign_pool(&self, name: &str, creator: Address) -> PoolRegisteredEvent {
        self.write_ledger(|ledger| {
            let comptroller = ledger.mine(creator);
            Self::register(ledger, name, creator, comptroller)
        })
    }

    /// Number of oracle deployments attempted.
    #[must_use]
    pub fn oracle_deploy_calls(&self) -> u32 {
        self.read_ledger(|ledger| ledger.oracle_calls)
    }

    /// Number of pool deployments attempted.
    #[must_use]
    pub fn pool_deploy_calls(&self) -> u32 {
        self.read_ledger(|ledger| ledger.pool_calls)
    }

    fn register(
        ledger: &mut Ledger,
        name: &str,
        creator: Address,
        comptroller: Address,
    ) -> PoolRegisteredEvent {
        let event = PoolRegisteredEvent {
            index: PoolId::new(ledger.next_pool_index),
            pool: RegisteredPool {
                name: name.to_owned(),
                creator,
                comptroller,
                block_posted: ledger.block,
            },
        };
        ledger.next_pool_index += 1;
        ledger.registrations.push((ledger.block, event.clone()));
        event
    }

    // Poisoned locks are recovered.
    fn write_ledger<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        let mut ledger = self
            .ledger
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut ledger)
    }

    fn read_ledger<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        let ledger = self
            .ledger
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&ledger)
    }
}

#[async_trait]
impl ChainCapability for SimulatedChain {
    fn public_price_oracle(&self) -> Address {
        self.public_price_oracle
    }

    async fn deploy_price_oracle(
        &self,
        kind: OracleKind,
        config: &PriceOracleConfig,
        options: &TxOptions,
    ) -> Result<Address, ChainError> {
        self.write_ledger(|ledger| {
            ledger.oracle_calls += 1;

            if ledger.oracle_failures > 0 {
                ledger.oracle_failures -= 1;
                return Err(ChainError::reverted(format!("{kind} deployment reverted")));
            }

            let oracle = ledger.mine(options.from);
            debug!(
                %oracle,
                kind = %kind,
                fallback = %config.default_oracle,
                block = ledger.block,
                "simulated oracle deployed"
            );
            Ok(oracle)
        })
    }

    async fn deploy_pool(
        &self,
        request: &PoolDeployment,
        options: &TxOptions,
    ) -> Result<DeployedPool, ChainError> {
        self.write_ledger(|ledger| {
            ledger.pool_calls += 1;

            if ledger.pool_failures > 0 {
                ledger.pool_failures -= 1;
                return Err(ChainError::reverted("pool deployment reverted"));
            }

            let comptroller = ledger.mine(options.from);
            let event = Self::register(ledger, &request.name, options.from, comptroller);
            debug!(
                %comptroller,
                index = %event.index,
                block = ledger.block,
                "simulated pool deployed"
            );
            Ok(DeployedPool { comptroller })
        })
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.read_ledger(|ledger| ledger.block))
    }

    async fn pool_registered_events(
        &self,
        from_block: u64,
    ) -> Result<Vec<PoolRegisteredEvent>, ChainError> {
        self.read_ledger(|ledger| {
            if ledger.fail_event_queries {
                return Err(ChainError::transport("event query failed"));
            }

            Ok(ledger
                .registrations
                .iter()
                .filter(|(block, _)| *block >= from_block)
                .map(|(_, event)| event.clone())
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::PUBLIC_MASTER_PRICE_ORACLE;
    use alloy_primitives::U256;

    const SENDER: Address = Address::repeat_byte(0x11);

    fn pool_request(name: &str) -> PoolDeployment {
        PoolDeployment {
            name: name.to_owned(),
            enforce_whitelist: false,
            close_factor: U256::ZERO,
            liquidation_incentive: U256::ZERO,
            price_oracle: PUBLIC_MASTER_PRICE_ORACLE,
            whitelist: None,
        }
    }

    #[tokio::test]
    async fn deployments_mine_blocks_and_derive_addresses() {
        let chain = SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE).with_start_block(100);
        let options = TxOptions { from: SENDER };

        let oracle = chain
            .deploy_price_oracle(
                OracleKind::MasterPriceOracle,
                &PriceOracleConfig::with_fallback(PUBLIC_MASTER_PRICE_ORACLE),
                &options,
            )
            .await
            .unwrap();
        assert_eq!(oracle, SENDER.create(0));

        let pool = chain.deploy_pool(&pool_request("a"), &options).await.unwrap();
        assert_eq!(pool.comptroller, SENDER.create(1));
        assert_eq!(chain.block_number().await.unwrap(), 102);
    }

    #[tokio::test]
    async fn registration_events_respect_from_block() {
        let chain = SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE).with_existing_pools(7);
        let options = TxOptions { from: SENDER };

        chain.deploy_pool(&pool_request("first"), &options).await.unwrap();
        chain.deploy_pool(&pool_request("second"), &options).await.unwrap();

        let all = chain.pool_registered_events(0).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].index, PoolId::new(7));
        assert_eq!(all[1].index, PoolId::new(8));

        let recent = chain.pool_registered_events(2).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].pool.name, "second");
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let chain = SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE);
        let options = TxOptions { from: SENDER };
        chain.fail_next_pool_deploys(1);

        assert!(chain.deploy_pool(&pool_request("x"), &options).await.is_err());
        assert!(chain.deploy_pool(&pool_request("x"), &options).await.is_ok());
        assert_eq!(chain.pool_deploy_calls(), 2);
        assert_eq!(chain.block_number().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn nonce_can_be_advanced() {
        let chain = SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE).with_nonce(SENDER, 4);
        let options = TxOptions { from: SENDER };

        let pool = chain.deploy_pool(&pool_request("late"), &options).await.unwrap();
        assert_eq!(pool.comptroller, SENDER.create(4));
    }

    #[tokio::test]
    async fn event_query_failure() {
        let chain = SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE);
        chain.fail_event_queries(true);

        let err = chain.pool_registered_events(0).await.unwrap_err();
        assert!(matches!(err, ChainError::Transport(_)));
    }
}
