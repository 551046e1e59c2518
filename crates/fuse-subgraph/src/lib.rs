//! Fuse subgraph client
//!
//! Read-only GraphQL access to the underlying assets indexed by the Fuse
//! subgraph. Each query is a single POST; there is no retry and no caching.
//!
//! ```ignore
//! use fuse_subgraph::{SubgraphClient, SubgraphConfig};
//!
//! let client = SubgraphClient::new(&SubgraphConfig::default())?;
//! let results = client.search_for_token("dai").await?;
//! for asset in results.underlying_assets {
//!     println!("{} {}", asset.symbol, asset.id);
//! }
//! ```

#![forbid(unsafe_code)]

pub mod assets;
pub mod client;
pub mod config;
pub mod error;
pub mod queries;

pub use assets::{AssetPage, OrderDirection, SearchResults, SubgraphClient, UnderlyingAsset};
pub use client::GraphQlClient;
pub use config::SubgraphConfig;
pub use error::{GraphQlError, SubgraphError, SubgraphResult};
