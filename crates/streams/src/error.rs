use thiserror::Error;

/// Result type for stream reads.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading recent records from an internal stream.
///
/// Read timeouts are deliberately absent: an expired deadline returns the
/// records that arrived in time.
#[derive(Debug, Error)]
pub enum Error {
    /// The named stream does not exist on the broker.
    #[error("stream {0} does not exist")]
    StreamNotFound(String),

    /// Fetching stream state failed.
    #[error("failed to fetch stream info: {0}")]
    StreamInfo(String),

    /// Creating the ephemeral consumer failed.
    #[error("failed to create reader consumer: {0}")]
    ConsumerCreate(String),

    /// Subscribing for deliveries failed.
    #[error("failed to subscribe for deliveries: {0}")]
    Subscribe(String),

    /// A delivery carried a reply that could not be parsed.
    #[error("malformed delivery: {0}")]
    MalformedDelivery(String),
}
