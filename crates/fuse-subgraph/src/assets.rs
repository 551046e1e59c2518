//! Underlying-asset queries.
//!
//! An underlying asset is a token that some Fuse pool accepts as a market.
//! The subgraph indexes one record per token, keyed by its lowercase
//! address.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::GraphQlClient;
use crate::config::SubgraphConfig;
use crate::error::SubgraphResult;
use crate::queries;

/// Token metadata and aggregate market figures as indexed by the subgraph.
///
/// Amounts are decimal strings; the subgraph's big numbers do not fit a
/// JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlyingAsset {
    /// Token address, lowercase hex.
    pub id: String,
    /// Token symbol, upper case.
    pub symbol: String,
    /// Token name.
    pub name: String,
    /// Token decimals.
    pub decimals: u32,
    /// Price as reported by the subgraph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Amount supplied across all pools, in token units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<String>,
    /// Amount borrowed across all pools, in token units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_borrow: Option<String>,
    /// Supplied minus borrowed, in token units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_liquidity: Option<String>,
    /// Total supply in USD.
    #[serde(
        default,
        rename = "totalSupplyUSD",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_supply_usd: Option<String>,
    /// Total borrow in USD.
    #[serde(
        default,
        rename = "totalBorrowUSD",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_borrow_usd: Option<String>,
    /// Total liquidity in USD.
    #[serde(
        default,
        rename = "totalLiquidityUSD",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_liquidity_usd: Option<String>,
}

impl UnderlyingAsset {
    /// Token address, if the record's id is a well-formed address.
    #[must_use]
    pub fn address(&self) -> Option<Address> {
        self.id.parse().ok()
    }
}

/// The `data` object every asset query returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Matching assets, in the order the subgraph returned them.
    pub underlying_assets: Vec<UnderlyingAsset>,
}

/// Sort direction for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl OrderDirection {
    /// Get the direction as the subgraph spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("unknown order direction: {s}")),
        }
    }
}

/// Variables of a paginated query.
///
/// Unset fields are left out of the request, so the subgraph applies its
/// own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    /// Records to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Records to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Field to sort by, e.g. `totalSupplyUSD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_dir: Option<OrderDirection>,
}

#[derive(Serialize)]
struct NoVariables {}

#[derive(Serialize)]
struct SearchVariables {
    search: String,
}

#[derive(Serialize)]
struct AddressVariables {
    addresses: Vec<String>,
}

/// Read access to the underlying assets indexed by the Fuse subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    graphql: GraphQlClient,
}

impl SubgraphClient {
    /// Create a new client from configuration.
    pub fn new(config: &SubgraphConfig) -> SubgraphResult<Self> {
        Ok(Self::from_graphql(GraphQlClient::new(config)?))
    }

    /// Wrap an existing GraphQL client.
    #[must_use]
    pub const fn from_graphql(graphql: GraphQlClient) -> Self {
        Self { graphql }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.graphql.url()
    }

    /// Fetch every underlying asset.
    #[instrument(skip(self))]
    pub async fn all_underlying_assets(&self) -> SubgraphResult<Vec<UnderlyingAsset>> {
        let results: SearchResults = self
            .graphql
            .request(queries::GET_ALL_UNDERLYING_ASSETS, &NoVariables {})
            .await?;

        debug!(count = results.underlying_assets.len(), "fetched underlying assets");
        Ok(results.underlying_assets)
    }

    /// Fetch one page of underlying assets.
    #[instrument(skip(self))]
    pub async fn underlying_assets_paginated(
        &self,
        page: &AssetPage,
    ) -> SubgraphResult<Vec<UnderlyingAsset>> {
        let results: SearchResults = self
            .graphql
            .request(queries::GET_UNDERLYING_ASSETS_PAGINATED, page)
            .await?;

        debug!(count = results.underlying_assets.len(), "fetched asset page");
        Ok(results.underlying_assets)
    }

    /// Find assets whose symbol contains `text`.
    ///
    /// Symbols are indexed in upper case, so the search text is upper-cased
    /// before it is sent.
    #[instrument(skip(self))]
    pub async fn search_for_token(&self, text: &str) -> SubgraphResult<SearchResults> {
        let variables = SearchVariables {
            search: text.to_uppercase(),
        };

        self.graphql
            .request(queries::SEARCH_FOR_TOKEN, &variables)
            .await
    }

    /// Find the assets with the given addresses.
    ///
    /// Addresses without a record are simply missing from the result.
    #[instrument(skip(self, addresses), fields(count = addresses.len()))]
    pub async fn search_for_tokens_by_addresses(
        &self,
        addresses: &[Address],
    ) -> SubgraphResult<SearchResults> {
        let variables = AddressVariables {
            addresses: addresses.iter().map(|a| format!("{a:#x}")).collect(),
        };

        self.graphql
            .request(queries::SEARCH_FOR_TOKENS_BY_ADDRESSES, &variables)
            .await
    }
}
