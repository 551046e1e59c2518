//! Configuration for the `fuse` command.
//!
//! Loaded from `fuse.toml` in the working directory, then overridden by
//! `FUSE_`-prefixed environment variables. Nested keys use a double
//! underscore, e.g. `FUSE_SUBGRAPH__URL` or `FUSE_CHAIN__DEPLOYER`.

use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use fuse_deploy::{ChainConfig, DeploymentConfig, FuseError, FuseResult, StoreConfig};
use fuse_subgraph::SubgraphConfig;
use serde::Deserialize;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "fuse.toml";

const ENV_PREFIX: &str = "FUSE_";

/// Configuration for every subcommand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Subgraph endpoint.
    #[serde(default)]
    pub subgraph: SubgraphConfig,

    /// Chain configuration.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Deployment behaviour.
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Where pending deployments are kept.
    #[serde(default)]
    pub store: StoreConfig,
}

impl CliConfig {
    /// Load configuration from `fuse.toml` and the environment.
    pub fn load() -> FuseResult<Self> {
        Self::from_file(CONFIG_FILE)
    }

    /// Load configuration from a specific TOML file and the environment.
    ///
    /// A missing file is not an error.
    pub fn from_file(path: impl AsRef<Path>) -> FuseResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| FuseError::config(e.to_string()))
    }
}
