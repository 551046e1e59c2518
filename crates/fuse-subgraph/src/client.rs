//! HTTP transport for GraphQL queries.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SubgraphConfig;
use crate::error::{GraphQlError, SubgraphError, SubgraphResult};

#[derive(Serialize)]
struct GraphQlRequest<'a, V: ?Sized> {
    query: &'a str,
    variables: &'a V,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// Executes GraphQL documents against a single endpoint.
///
/// No retries and no caching; failures are returned as-is.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: Client,
    url: String,
}

impl GraphQlClient {
    /// Create a new client from configuration.
    pub fn new(config: &SubgraphConfig) -> SubgraphResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Create a new client for the given endpoint URL.
    pub fn with_url(url: impl Into<String>) -> SubgraphResult<Self> {
        Self::new(&SubgraphConfig {
            url: url.into(),
            ..SubgraphConfig::default()
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run `query` with `variables` and decode its `data` object into `T`.
    pub async fn request<V, T>(&self, query: &str, variables: &V) -> SubgraphResult<T>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(url = %self.url, "sending GraphQL request");

        let response = self
            .client
            .post(&self.url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubgraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: GraphQlResponse = serde_json::from_slice(&bytes)?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(SubgraphError::Query(errors));
        }

        let data = envelope.data.ok_or(SubgraphError::MissingData)?;
        Ok(serde_json::from_value(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let config = SubgraphConfig::default();
        let client = GraphQlClient::new(&config).unwrap();
        assert_eq!(client.url(), config.url);
    }

    #[test]
    fn client_with_url() {
        let client = GraphQlClient::with_url("http://localhost:8000/subgraphs/name/test").unwrap();
        assert_eq!(client.url(), "http://localhost:8000/subgraphs/name/test");
    }

    #[test]
    fn request_body_shape() {
        let variables = serde_json::json!({ "search": "DAI" });
        let body = serde_json::to_value(GraphQlRequest {
            query: "query { x }",
            variables: &variables,
        })
        .unwrap();

        assert_eq!(body["query"], "query { x }");
        assert_eq!(body["variables"]["search"], "DAI");
    }

    #[test]
    fn null_data_is_missing() {
        let envelope: GraphQlResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.errors.is_none());
    }
}
