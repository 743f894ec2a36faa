use thiserror::Error;

/// Result type for collaborator queries.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the metadata and message stores.
#[derive(Debug, Error)]
pub enum Error {
    /// The station's backing stream is gone; callers surface this as
    /// "station does not exist".
    #[error("stream {0} does not exist")]
    StreamNotFound(String),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}
