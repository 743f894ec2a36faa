use thiserror::Error;

/// Result type for log queries.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying system logs.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested log type is not one of the known filters.
    #[error("unknown log type {0}")]
    UnknownLogType(String),

    /// The underlying stream read failed.
    #[error(transparent)]
    Read(#[from] switchyard_streams::Error),
}
