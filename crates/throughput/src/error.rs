use thiserror::Error;

/// Result type for throughput decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding throughput samples.
#[derive(Debug, Error)]
pub enum Error {
    /// A sample payload was not valid JSON of the expected shape.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}
