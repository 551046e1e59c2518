//! Error types for fuse-deploy.

use serde::{Deserialize, Serialize};

/// Result type alias using [`FuseError`].
pub type FuseResult<T> = Result<T, FuseError>;

/// Reasons a pool draft cannot be deployed.
///
/// These are raised before any remote call is made and never mutate
/// deployment state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The pool has no name.
    #[error("you must specify a name for your Fuse pool")]
    EmptyName,

    /// The whitelist is enabled but holds fewer than two addresses.
    #[error("you must add an address to your whitelist")]
    WhitelistTooSmall,

    /// The custom oracle address is not a well-formed address.
    #[error("you must add an address for your oracle or use the default oracle")]
    InvalidOracleAddress,

    /// A whitelist entry is not a well-formed address.
    #[error("not a valid ethereum address: {0}")]
    InvalidWhitelistAddress(String),

    /// A whitelist entry was already present.
    #[error("address already whitelisted: {0}")]
    DuplicateWhitelistAddress(String),

    /// Close factor outside the accepted percent range.
    #[error("close factor must be between 5% and 90%, got {0}%")]
    CloseFactorOutOfRange(u8),

    /// Liquidation incentive outside the accepted percent range.
    #[error("liquidation incentive must be between 0% and 50%, got {0}%")]
    LiquidationIncentiveOutOfRange(u8),
}

/// Failure reported by the chain capability.
///
/// Carried verbatim to the caller and recorded on the deployment state so
/// it can be shown next to the retry control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ChainError {
    /// The sender declined to sign the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction was mined but reverted.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// The node or SDK could not be reached.
    #[error("chain transport error: {0}")]
    Transport(String),
}

impl ChainError {
    /// Create a rejection error.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a revert error.
    #[must_use]
    pub fn reverted(msg: impl Into<String>) -> Self {
        Self::Reverted(msg.into())
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Errors returned by a deployment attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeploymentError {
    /// The draft failed validation; nothing was sent to the chain.
    #[error("invalid pool configuration: {0}")]
    Validation(#[from] ValidationError),

    /// Deploying the price oracle failed. A retry re-attempts this step.
    #[error("failed to deploy price oracle: {0}")]
    OracleDeployFailed(#[source] ChainError),

    /// Deploying the pool failed. A retry re-attempts only this step.
    #[error("failed to deploy pool: {0}")]
    PoolDeployFailed(#[source] ChainError),
}

impl DeploymentError {
    /// The underlying chain failure, if the error came from a remote call.
    #[must_use]
    pub const fn chain_error(&self) -> Option<&ChainError> {
        match self {
            Self::Validation(_) => None,
            Self::OracleDeployFailed(e) | Self::PoolDeployFailed(e) => Some(e),
        }
    }
}

/// Errors raised outside a deployment attempt (configuration, persistence).
#[derive(Debug, thiserror::Error)]
pub enum FuseError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// State store I/O error.
    #[error("state store error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialisation error.
    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

impl FuseError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
