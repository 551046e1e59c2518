//! GraphQL documents for underlying-asset queries.

macro_rules! with_asset_fields {
    ($query:literal) => {
        concat!(
            $query,
            r#"
fragment UnderlyingAssetFields on UnderlyingAsset {
  id
  symbol
  name
  decimals
  price
  totalSupply
  totalBorrow
  totalLiquidity
  totalSupplyUSD
  totalBorrowUSD
  totalLiquidityUSD
}
"#
        )
    };
}

/// Every underlying asset known to the subgraph.
pub const GET_ALL_UNDERLYING_ASSETS: &str = with_asset_fields!(
    r#"
query GetAllUnderlyingAssets {
  underlyingAssets(first: 1000) {
    ...UnderlyingAssetFields
  }
}
"#
);

/// One page of underlying assets.
pub const GET_UNDERLYING_ASSETS_PAGINATED: &str = with_asset_fields!(
    r#"
query GetUnderlyingAssetsPaginated(
  $offset: Int
  $limit: Int
  $orderBy: UnderlyingAsset_orderBy
  $orderDir: OrderDirection
) {
  underlyingAssets(
    skip: $offset
    first: $limit
    orderBy: $orderBy
    orderDirection: $orderDir
  ) {
    ...UnderlyingAssetFields
  }
}
"#
);

/// Underlying assets whose symbol contains `$search`.
pub const SEARCH_FOR_TOKEN: &str = with_asset_fields!(
    r#"
query SearchForToken($search: String!) {
  underlyingAssets(where: { symbol_contains: $search }) {
    ...UnderlyingAssetFields
  }
}
"#
);

/// Underlying assets with one of the given addresses.
pub const SEARCH_FOR_TOKENS_BY_ADDRESSES: &str = with_asset_fields!(
    r#"
query SearchForTokensByAddresses($addresses: [ID!]!) {
  underlyingAssets(where: { id_in: $addresses }) {
    ...UnderlyingAssetFields
  }
}
"#
);
