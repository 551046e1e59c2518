//! Error types for fuse-subgraph.

/// Result type alias using [`SubgraphError`].
pub type SubgraphResult<T> = Result<T, SubgraphError>;

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct GraphQlError {
    /// Human-readable message.
    pub message: String,
}

/// Errors that can occur while querying the subgraph.
#[derive(Debug, thiserror::Error)]
pub enum SubgraphError {
    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("subgraph returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The query was executed but reported errors.
    #[error("query failed: {}", join_messages(.0))]
    Query(Vec<GraphQlError>),

    /// The response carried neither data nor errors.
    #[error("response has no data")]
    MissingData,

    /// The data did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
