//! Mock GraphQL endpoint for subgraph client tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use fuse_subgraph::{SubgraphClient, SubgraphConfig};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    response: Value,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// A subgraph that answers every query with one canned response.
pub struct MockSubgraph {
    pub url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockSubgraph {
    /// Serve `response` with status 200.
    pub async fn start(response: Value) -> Self {
        Self::start_with_status(StatusCode::OK, response).await
    }

    /// Serve `response` with the given status.
    pub async fn start_with_status(status: StatusCode, response: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            response,
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/subgraphs/name/fuse", post(handle))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/subgraphs/name/fuse"),
            requests,
        }
    }

    /// Client pointed at this mock.
    pub fn client(&self) -> SubgraphClient {
        SubgraphClient::new(&SubgraphConfig {
            url: self.url.clone(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    /// Request bodies received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Variables of the only request received.
    pub fn single_variables(&self) -> Value {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0]["variables"].clone()
    }
}

async fn handle(State(state): State<MockState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(body);
    (state.status, Json(state.response))
}

/// A `data` payload holding the given assets.
pub fn assets_response(assets: Vec<Value>) -> Value {
    json!({ "data": { "underlyingAssets": assets } })
}

/// A subgraph record for a token.
pub fn asset(id: &str, symbol: &str, decimals: u32) -> Value {
    json!({
        "id": id,
        "symbol": symbol,
        "name": format!("{symbol} Token"),
        "decimals": decimals,
        "price": "1000000000000000000",
        "totalSupply": "0",
        "totalBorrow": "0",
        "totalLiquidity": "0",
        "totalSupplyUSD": "0",
        "totalBorrowUSD": "0",
        "totalLiquidityUSD": "0"
    })
}

pub const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";
pub const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
