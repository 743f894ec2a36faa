//! Router for the monitoring surface.

use axum::http::StatusCode;
use axum::routing::{any, get};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::{
    available_replicas_handler, cluster_info_handler, download_logs_handler,
    main_overview_handler, station_overview_handler, system_logs_handler,
};
use crate::MonitoringContext;

/// Route constants for the monitoring endpoints.
pub mod routes {
    /// Broker version.
    pub const CLUSTER_INFO: &str = "/monitoring/getClusterInfo";
    /// Main dashboard composite.
    pub const MAIN_OVERVIEW: &str = "/monitoring/getMainOverviewData";
    /// Per-station dashboard composite.
    pub const STATION_OVERVIEW: &str = "/monitoring/getStationOverviewData";
    /// Paginated system logs.
    pub const SYSTEM_LOGS: &str = "/monitoring/getSystemLogs";
    /// Full system-log download.
    pub const DOWNLOAD_SYSTEM_LOGS: &str = "/monitoring/downloadSystemLogs";
    /// Replica count available for new stations.
    pub const AVAILABLE_REPLICAS: &str = "/monitoring/getAvailableReplicas";
}

/// Builds the monitoring router over a context.
///
/// The auth middleware wraps this router at the edge; handlers only consume
/// the principal it injects.
#[must_use]
pub fn monitoring_router(ctx: MonitoringContext) -> Router {
    Router::new()
        .route(routes::CLUSTER_INFO, get(cluster_info_handler))
        .route(routes::MAIN_OVERVIEW, get(main_overview_handler))
        .route(routes::STATION_OVERVIEW, get(station_overview_handler))
        .route(routes::SYSTEM_LOGS, get(system_logs_handler))
        .route(routes::DOWNLOAD_SYSTEM_LOGS, get(download_logs_handler))
        .route(routes::AVAILABLE_REPLICAS, get(available_replicas_handler))
        .with_state(ctx)
        .fallback(any(|| async { (StatusCode::NOT_FOUND, "") }))
        .layer(CorsLayer::very_permissive())
}
