//! Resumable two-step pool deployment.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::chain::{
    ChainCapability, OracleKind, PoolDeployment, PoolRegisteredEvent, PriceOracleConfig,
    TxOptions,
};
use crate::config::DeploymentConfig;
use crate::draft::{self, OracleChoice, PoolDraft};
use crate::error::{ChainError, DeploymentError, ValidationError};
use crate::fixed_point::{close_factor_mantissa, liquidation_incentive_mantissa};
use crate::state::{DeploymentState, Stage, StageKind};
use crate::types::{parse_address, PoolId};

use super::DeploymentOutcome;

/// Drives pool deployments against a chain capability.
///
/// The controller holds no per-deployment data; everything an attempt
/// produces is written to the [`DeploymentState`] passed to
/// [`execute`](Self::execute). Taking that state by `&mut` means a second
/// `execute` on the same state cannot start while one is in flight.
pub struct DeploymentController {
    chain: Arc<dyn ChainCapability>,
    deployer: Address,
    config: DeploymentConfig,
    progress: watch::Sender<StageKind>,
}

impl DeploymentController {
    /// Create a controller that sends transactions from `deployer`.
    pub fn new(
        chain: Arc<dyn ChainCapability>,
        deployer: Address,
        config: DeploymentConfig,
    ) -> Self {
        let (progress, _) = watch::channel(StageKind::AwaitingOracle);
        Self {
            chain,
            deployer,
            config,
            progress,
        }
    }

    /// Account transactions are sent from.
    #[must_use]
    pub const fn deployer(&self) -> Address {
        self.deployer
    }

    /// Observe the active step of the current attempt.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<StageKind> {
        self.progress.subscribe()
    }

    /// Check a draft without touching the chain.
    pub fn validate(&self, draft: &PoolDraft) -> Result<(), ValidationError> {
        draft::validate(draft)
    }

    /// Run the deployment from wherever `state` left off.
    ///
    /// 1. Resolve the price oracle: use the custom address, or deploy a
    ///    master price oracle falling back to the public one.
    /// 2. Deploy the pool with the resolved oracle.
    /// 3. Look up the pool's directory index from recent registration events.
    ///
    /// A failing step leaves the stage where it was and sets the retry flag,
    /// so calling `execute` again re-runs only the failed step. Executing a
    /// finished state returns its outcome without any remote call.
    pub async fn execute(
        &self,
        draft: &PoolDraft,
        state: &mut DeploymentState,
    ) -> Result<DeploymentOutcome, DeploymentError> {
        self.validate(draft)?;

        if let Some(outcome) = state.outcome() {
            debug!(pool = %draft.name, "deployment already complete");
            return Ok(outcome.clone());
        }

        state.begin_attempt();
        self.report(state.kind());

        info!(
            pool = %draft.name,
            stage = %state.kind(),
            attempt = state.attempts(),
            "starting pool deployment"
        );

        let options = TxOptions {
            from: self.deployer,
        };

        let price_oracle = match state.stage() {
            Stage::AwaitingOracle => {
                let price_oracle = self.resolve_oracle(draft, state, &options).await?;
                state.oracle_ready(price_oracle);
                self.report(state.kind());
                price_oracle
            }
            Stage::AwaitingPool { price_oracle } => {
                debug!(%price_oracle, "reusing price oracle from earlier attempt");
                *price_oracle
            }
            Stage::Done { outcome } => return Ok(outcome.clone()),
        };

        let request = PoolDeployment {
            name: draft.name.clone(),
            enforce_whitelist: draft.is_whitelisted,
            close_factor: close_factor_mantissa(draft.close_factor),
            liquidation_incentive: liquidation_incentive_mantissa(draft.liquidation_incentive),
            price_oracle,
            whitelist: draft.whitelist_for_deployment(),
        };

        info!(
            pool = %draft.name,
            %price_oracle,
            close_factor = %draft.close_factor,
            liquidation_incentive = %draft.liquidation_incentive,
            whitelisted = draft.is_whitelisted,
            "deploying pool"
        );

        let pool = match self.chain.deploy_pool(&request, &options).await {
            Ok(pool) => pool,
            Err(e) => {
                error!(pool = %draft.name, error = %e, "pool deployment failed");
                state.fail(e.clone());
                return Err(DeploymentError::PoolDeployFailed(e));
            }
        };

        let pool_id = self.lookup_pool_id(pool.comptroller).await;
        let outcome = DeploymentOutcome {
            pool_address: pool.comptroller,
            price_oracle,
            pool_id,
        };

        state.complete(outcome.clone());
        self.report(state.kind());

        info!(
            pool = %draft.name,
            comptroller = %outcome.pool_address,
            pool_id = ?outcome.pool_id,
            "pool deployed"
        );

        Ok(outcome)
    }

    async fn resolve_oracle(
        &self,
        draft: &PoolDraft,
        state: &mut DeploymentState,
        options: &TxOptions,
    ) -> Result<Address, DeploymentError> {
        if let OracleChoice::Custom(raw) = &draft.oracle {
            let price_oracle = parse_address(raw).ok_or(ValidationError::InvalidOracleAddress)?;
            info!(%price_oracle, "using custom price oracle");
            return Ok(price_oracle);
        }

        let config = PriceOracleConfig::with_fallback(self.chain.public_price_oracle());
        info!(fallback = %config.default_oracle, "deploying price oracle");

        match self
            .chain
            .deploy_price_oracle(OracleKind::MasterPriceOracle, &config, options)
            .await
        {
            Ok(price_oracle) => {
                info!(%price_oracle, "price oracle deployed");
                Ok(price_oracle)
            }
            Err(e) => {
                error!(error = %e, "price oracle deployment failed");
                state.fail(e.clone());
                Err(DeploymentError::OracleDeployFailed(e))
            }
        }
    }

    /// Find the directory index of a freshly deployed pool.
    ///
    /// The pool is already on-chain at this point, so a failed lookup is
    /// logged and reported as an unknown index rather than as a failure.
    async fn lookup_pool_id(&self, comptroller: Address) -> Option<PoolId> {
        match self.recent_registrations().await {
            Ok(events) => {
                let pool_id = find_pool_id(&events, comptroller);
                if pool_id.is_none() {
                    warn!(
                        %comptroller,
                        scanned = events.len(),
                        "no registration event found for deployed pool"
                    );
                }
                pool_id
            }
            Err(e) => {
                warn!(%comptroller, error = %e, "failed to query pool registrations");
                None
            }
        }
    }

    async fn recent_registrations(&self) -> Result<Vec<PoolRegisteredEvent>, ChainError> {
        let current = self.chain.block_number().await?;
        let from_block = current.saturating_sub(self.config.event_lookback_blocks);
        debug!(from_block, current, "querying pool registrations");
        self.chain.pool_registered_events(from_block).await
    }

    fn report(&self, kind: StageKind) {
        self.progress.send_replace(kind);
    }
}

impl std::fmt::Debug for DeploymentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentController")
            .field("deployer", &self.deployer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Index of the first registration event for `comptroller`, in the order
/// the events were returned.
#[must_use]
pub fn find_pool_id(events: &[PoolRegisteredEvent], comptroller: Address) -> Option<PoolId> {
    events
        .iter()
        .find(|event| event.pool.comptroller == comptroller)
        .map(|event| event.index)
}
