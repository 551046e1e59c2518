//! Fuse pool deployment
//!
//! This crate turns a user's pool configuration into a deployed Fuse lending
//! pool. Deployment takes two on-chain transactions, a price oracle and then
//! the pool itself, and either can fail. The workflow records what has
//! already succeeded so a retry continues from the failed step instead of
//! starting over.
//!
//! # Architecture
//!
//! - **Draft**: [`PoolDraft`] holds the configuration (name, whitelist, close
//!   factor, liquidation incentive, oracle choice) and its validation rules
//! - **Chain seam**: [`ChainCapability`] is the only way the workflow reaches
//!   the chain; [`SimulatedChain`] implements it in memory
//! - **State**: [`DeploymentState`] is the resumable step pointer plus the
//!   results earlier steps produced
//! - **Controller**: [`DeploymentController`] runs the steps against a state
//! - **Store**: [`StateStore`] persists state between processes
//!
//! # State Machine
//!
//! ```text
//! AwaitingOracle ──▶ AwaitingPool ──▶ Done
//!       ↺                 ↺
//!    (retry)           (retry)
//! ```
//!
//! A failed step keeps the stage and raises the retry flag. Stages never move
//! backwards, so an oracle deployed by one attempt is reused by the next.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fuse_deploy::{
//!     DeploymentConfig, DeploymentController, DeploymentState, PoolDraft, SimulatedChain,
//!     PUBLIC_MASTER_PRICE_ORACLE,
//! };
//!
//! let chain = Arc::new(SimulatedChain::new(PUBLIC_MASTER_PRICE_ORACLE));
//! let controller = DeploymentController::new(chain, deployer, DeploymentConfig::default());
//!
//! let draft = PoolDraft::new("Blue Chips");
//! let mut state = DeploymentState::new();
//!
//! match controller.execute(&draft, &mut state).await {
//!     Ok(outcome) => println!("open {}", outcome.redirect_path()),
//!     Err(e) if state.needs_retry() => eprintln!("{e}; retry to continue"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

#![forbid(unsafe_code)]

pub mod chain;
pub mod config;
pub mod deployment;
pub mod draft;
pub mod error;
pub mod fixed_point;
pub mod state;
pub mod store;
pub mod types;

pub use chain::{
    ChainCapability, DeployedPool, OracleKind, PoolDeployment, PoolRegisteredEvent,
    PriceOracleConfig, RegisteredPool, SimulatedChain, TxOptions, PUBLIC_MASTER_PRICE_ORACLE,
};
pub use config::{ChainConfig, DeploymentConfig, StoreConfig};
pub use deployment::{DeploymentController, DeploymentOutcome};
pub use draft::{validate, CloseFactor, LiquidationIncentive, OracleChoice, PoolDraft, Whitelist};
pub use error::{ChainError, DeploymentError, FuseError, FuseResult, ValidationError};
pub use state::{DeploymentState, Stage, StageKind};
pub use store::{state_key, FileStore, MemoryStore, StateStore};
pub use types::{parse_address, PoolId};
