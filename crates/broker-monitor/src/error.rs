use thiserror::Error;

/// Result type for monitoring-endpoint queries.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur querying the broker's monitoring endpoints.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
