use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Result type for monitoring operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Status code for errors whose message is shown to the operator verbatim.
pub const SHOWABLE_ERROR_STATUS: StatusCode = StatusCode::UNPROCESSABLE_ENTITY;

/// Errors surfaced by the monitoring core.
#[derive(Debug, Error)]
pub enum Error {
    /// No authenticated principal on the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// A user-surfaceable condition; the message goes out verbatim with a
    /// 4xx status.
    #[error("{0}")]
    Showable(String),

    /// Stream-reader failure.
    #[error(transparent)]
    Streams(#[from] switchyard_streams::Error),

    /// Log-query failure.
    #[error(transparent)]
    Logs(#[from] switchyard_syslog::Error),

    /// Throughput decode failure.
    #[error(transparent)]
    Throughput(#[from] switchyard_throughput::Error),

    /// Component-probe failure.
    #[error(transparent)]
    Probe(#[from] switchyard_probe::Error),

    /// Metadata- or message-store failure.
    #[error(transparent)]
    Metadata(#[from] switchyard_metadata::Error),

    /// Broker monitoring-endpoint failure.
    #[error(transparent)]
    Telemetry(#[from] switchyard_broker_monitor::Error),
}

impl Error {
    /// A user-surfaceable error with a plain message.
    #[must_use]
    pub fn showable(message: impl Into<String>) -> Self {
        Self::Showable(message.into())
    }

    /// The standard "station does not exist" message.
    #[must_use]
    pub fn station_missing(station: &str) -> Self {
        Self::Showable(format!("Station {station} does not exist"))
    }

    fn showable_message(&self) -> Option<String> {
        match self {
            Self::Showable(message) => Some(message.clone()),
            Self::Logs(switchyard_syslog::Error::UnknownLogType(log_type)) => {
                Some(format!("Unknown log type {log_type}"))
            }
            Self::Streams(switchyard_streams::Error::StreamNotFound(name))
            | Self::Metadata(switchyard_metadata::Error::StreamNotFound(name)) => {
                Some(format!("{name} does not exist"))
            }
            _ => None,
        }
    }
}

/// Downgrades environment-unavailable component errors to a showable
/// status; everything else keeps its severity.
pub(crate) fn downgrade_component_error(err: Error) -> Error {
    let message = err.to_string();
    if message
        .to_lowercase()
        .contains("cannot connect to the docker daemon")
    {
        Error::Showable(format!("Failed getting system components data: {message}"))
    } else {
        err
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if matches!(self, Self::Unauthorized) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Unauthorized"})),
            )
                .into_response();
        }
        if let Some(message) = self.showable_message() {
            warn!("{self}");
            return (SHOWABLE_ERROR_STATUS, Json(json!({"message": message}))).into_response();
        }
        error!("{self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Server error"})),
        )
            .into_response()
    }
}
