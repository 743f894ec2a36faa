use thiserror::Error;

/// Result type for component probing.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing system components.
#[derive(Debug, Error)]
pub enum Error {
    /// An orchestrator API call failed.
    #[error("orchestrator request failed: {0}")]
    Orchestrator(String),

    /// The local process could not be inspected.
    #[error("failed to probe local process: {0}")]
    Process(String),

    /// Running an external probe command failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// `df` output did not have the expected columns.
    #[error("unparseable df output: {0}")]
    DfParse(String),
}
