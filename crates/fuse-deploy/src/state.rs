//! Resumable deployment state.
//!
//! A deployment attempt moves through a fixed sequence of stages. The stage
//! carries whatever earlier steps produced, so a retry can pick up exactly
//! where the previous attempt stopped:
//!
//! ```text
//! AwaitingOracle ──(oracle deployed / custom oracle)──▶ AwaitingPool ──(pool deployed)──▶ Done
//!       │ ▲                                                  │ ▲
//!       └─┘ failure: needs_retry                             └─┘ failure: needs_retry
//! ```
//!
//! Stages only move forward. A failure leaves the stage untouched and sets
//! the retry flag.

use std::fmt;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deployment::DeploymentOutcome;
use crate::error::ChainError;

/// Where a deployment attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// No price oracle yet.
    AwaitingOracle,
    /// The price oracle is known; the pool still has to be deployed.
    AwaitingPool {
        /// Oracle the pool will be deployed with.
        price_oracle: Address,
    },
    /// The pool is deployed.
    Done {
        /// What the deployment produced.
        outcome: DeploymentOutcome,
    },
}

impl Stage {
    /// The stage without its payload.
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::AwaitingOracle => StageKind::AwaitingOracle,
            Self::AwaitingPool { .. } => StageKind::AwaitingPool,
            Self::Done { .. } => StageKind::Done,
        }
    }
}

/// Payload-free stage, used for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Deploying the price oracle.
    AwaitingOracle,
    /// Deploying the pool.
    AwaitingPool,
    /// Finished.
    Done,
}

impl StageKind {
    /// Step labels shown in the progress modal, indexed by [`Self::step_index`].
    pub const STEPS: [&'static str; 2] = ["Deploying Oracle", "Deploying Pool!"];

    /// Get the stage name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingOracle => "awaiting_oracle",
            Self::AwaitingPool => "awaiting_pool",
            Self::Done => "done",
        }
    }

    /// Index of the active step in [`Self::STEPS`].
    ///
    /// `Done` stays on the last step.
    #[must_use]
    pub const fn step_index(&self) -> usize {
        match self {
            Self::AwaitingOracle => 0,
            Self::AwaitingPool | Self::Done => 1,
        }
    }

    /// Label of the active step.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        Self::STEPS[self.step_index()]
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_oracle" => Ok(Self::AwaitingOracle),
            "awaiting_pool" => Ok(Self::AwaitingPool),
            "done" => Ok(Self::Done),
            _ => Err(format!("unknown deployment stage: {s}")),
        }
    }
}

/// Progress of one user-initiated deployment.
///
/// Created when the user starts deploying, mutated in place by
/// [`DeploymentController::execute`](crate::DeploymentController::execute),
/// and discarded once the pool is deployed or the user gives up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentState {
    #[serde(flatten)]
    stage: Stage,
    needs_retry: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_error: Option<ChainError>,
    attempts: u32,
    updated_at: DateTime<Utc>,
}

impl Default for DeploymentState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeploymentState {
    /// Fresh state, starting with the oracle step.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Stage::AwaitingOracle)
    }

    /// State for an attempt whose price oracle was already deployed.
    #[must_use]
    pub fn resuming(price_oracle: Address) -> Self {
        Self::at(Stage::AwaitingPool { price_oracle })
    }

    fn at(stage: Stage) -> Self {
        Self {
            stage,
            needs_retry: false,
            last_error: None,
            attempts: 0,
            updated_at: Utc::now(),
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Current stage without payload.
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    /// Oracle recorded by an earlier step, if any.
    #[must_use]
    pub const fn price_oracle_address(&self) -> Option<Address> {
        match &self.stage {
            Stage::AwaitingOracle => None,
            Stage::AwaitingPool { price_oracle } => Some(*price_oracle),
            Stage::Done { outcome } => Some(outcome.price_oracle),
        }
    }

    /// Whether the last attempt failed and can be retried.
    #[must_use]
    pub const fn needs_retry(&self) -> bool {
        self.needs_retry
    }

    /// Failure of the last attempt.
    #[must_use]
    pub const fn last_error(&self) -> Option<&ChainError> {
        self.last_error.as_ref()
    }

    /// Number of attempts started.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When the state last changed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The finished deployment, once `Done`.
    #[must_use]
    pub const fn outcome(&self) -> Option<&DeploymentOutcome> {
        match &self.stage {
            Stage::Done { outcome } => Some(outcome),
            _ => None,
        }
    }

    /// Returns true once the pool is deployed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done { .. })
    }

    /// Drop all progress and start over.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.needs_retry = false;
        self.attempts += 1;
        self.touch();
    }

    /// Record the oracle. Ignored unless the oracle step is still pending.
    pub(crate) fn oracle_ready(&mut self, price_oracle: Address) {
        if matches!(self.stage, Stage::AwaitingOracle) {
            self.stage = Stage::AwaitingPool { price_oracle };
            self.touch();
        }
    }

    /// Record the deployed pool. Ignored once already done.
    pub(crate) fn complete(&mut self, outcome: DeploymentOutcome) {
        if !self.is_done() {
            self.stage = Stage::Done { outcome };
            self.last_error = None;
            self.touch();
        }
    }

    pub(crate) fn fail(&mut self, error: ChainError) {
        self.needs_retry = true;
        self.last_error = Some(error);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PoolId;

    const ORACLE: Address = Address::repeat_byte(0xaa);
    const OTHER: Address = Address::repeat_byte(0xbb);

    fn outcome() -> DeploymentOutcome {
        DeploymentOutcome {
            pool_address: Address::repeat_byte(0xcc),
            price_oracle: ORACLE,
            pool_id: Some(PoolId::new(3)),
        }
    }

    #[test]
    fn fresh_state_awaits_oracle() {
        let state = DeploymentState::new();
        assert_eq!(state.kind(), StageKind::AwaitingOracle);
        assert!(state.price_oracle_address().is_none());
        assert!(!state.needs_retry());
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn resuming_state_awaits_pool() {
        let state = DeploymentState::resuming(ORACLE);
        assert_eq!(state.kind(), StageKind::AwaitingPool);
        assert_eq!(state.price_oracle_address(), Some(ORACLE));
    }

    #[test]
    fn stage_never_moves_backwards() {
        let mut state = DeploymentState::new();
        state.oracle_ready(ORACLE);
        state.oracle_ready(OTHER);
        assert_eq!(state.price_oracle_address(), Some(ORACLE));

        state.complete(outcome());
        state.oracle_ready(OTHER);
        assert!(state.is_done());
        assert_eq!(state.price_oracle_address(), Some(ORACLE));
    }

    #[test]
    fn failure_keeps_stage_and_sets_retry() {
        let mut state = DeploymentState::resuming(ORACLE);
        state.begin_attempt();
        state.fail(ChainError::reverted("boom"));

        assert_eq!(state.kind(), StageKind::AwaitingPool);
        assert!(state.needs_retry());
        assert_eq!(state.last_error(), Some(&ChainError::reverted("boom")));

        state.begin_attempt();
        assert!(!state.needs_retry());
        assert_eq!(state.attempts(), 2);
    }

    #[test]
    fn reset_discards_progress() {
        let mut state = DeploymentState::resuming(ORACLE);
        state.fail(ChainError::transport("down"));
        state.reset();

        assert_eq!(state.kind(), StageKind::AwaitingOracle);
        assert!(!state.needs_retry());
        assert!(state.last_error().is_none());
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn step_labels() {
        assert_eq!(StageKind::AwaitingOracle.label(), "Deploying Oracle");
        assert_eq!(StageKind::AwaitingPool.label(), "Deploying Pool!");
        assert_eq!(StageKind::Done.step_index(), 1);
    }

    #[test]
    fn stage_kind_parsing() {
        for kind in [StageKind::AwaitingOracle, StageKind::AwaitingPool, StageKind::Done] {
            assert_eq!(kind.as_str().parse::<StageKind>(), Ok(kind));
        }
        assert!("deploying".parse::<StageKind>().is_err());
    }

    #[test]
    fn state_serialisation_roundtrip() {
        let mut state = DeploymentState::resuming(ORACLE);
        state.fail(ChainError::reverted("pool reverted"));

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["stage"], "awaiting_pool");
        assert_eq!(json["needs_retry"], true);

        let parsed: DeploymentState = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, state);
    }
}
