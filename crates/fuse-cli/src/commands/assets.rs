//! Implementation of the `fuse assets` commands.

use alloy_primitives::Address;
use fuse_subgraph::{AssetPage, SubgraphClient, SubgraphConfig, SubgraphError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetsError {
    #[error(transparent)]
    Subgraph(#[from] SubgraphError),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Which asset query to run.
#[derive(Debug, Clone)]
pub enum AssetQuery {
    All,
    Page(AssetPage),
    Search(String),
    Lookup(Vec<Address>),
}

pub async fn run(config: &SubgraphConfig, query: AssetQuery) -> Result<(), AssetsError> {
    let client = SubgraphClient::new(config)?;
    let output = fetch(&client, query).await?;
    println!("{output}");
    Ok(())
}

/// Run the query and render its result as pretty JSON.
pub async fn fetch(client: &SubgraphClient, query: AssetQuery) -> Result<String, AssetsError> {
    match query {
        AssetQuery::All => render(&client.all_underlying_assets().await?),
        AssetQuery::Page(page) => render(&client.underlying_assets_paginated(&page).await?),
        AssetQuery::Search(text) => render(&client.search_for_token(&text).await?),
        AssetQuery::Lookup(addresses) => {
            render(&client.search_for_tokens_by_addresses(&addresses).await?)
        }
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, AssetsError> {
    Ok(serde_json::to_string_pretty(value)?)
}
