//! Configuration for fuse-subgraph.

use serde::Deserialize;

/// Subgraph endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SubgraphConfig {
    /// GraphQL endpoint URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:8000/subgraphs/name/fuse".to_owned()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
