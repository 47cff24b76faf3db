use thiserror::Error;

/// Errors returned by the blob store and database clients.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid endpoint \"{url}\": {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("JSON error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context} did not serialize to a JSON object")]
    NotAnObject { context: String },
}
