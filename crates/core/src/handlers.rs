//! Axum handlers for the monitoring surface.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use switchyard_streams::ReadMode;
use switchyard_syslog::{filter_for_log_type, Log};

use crate::overview::{main_overview, MainOverviewData};
use crate::station::{station_overview, StationOverview};
use crate::{AuthenticatedUser, Error, MonitoringContext, Result};

/// How many log records one page fetches.
const LOGS_FETCH_AMOUNT: u64 = 100;

/// Budget for one paginated log fetch.
const LOGS_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Budget for draining the whole log stream on download.
const LOGS_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) async fn cluster_info_handler(
    State(ctx): State<MonitoringContext>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse> {
    let varz = ctx.telemetry.varz().await?;
    Ok(Json(json!({ "version": varz.version })))
}

pub(crate) async fn main_overview_handler(
    State(ctx): State<MonitoringContext>,
    user: AuthenticatedUser,
) -> Result<Json<MainOverviewData>> {
    let data = main_overview(&ctx, &user.tenant_name).await?;
    Ok(Json(data))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StationOverviewParams {
    station_name: String,
}

pub(crate) async fn station_overview_handler(
    State(ctx): State<MonitoringContext>,
    user: AuthenticatedUser,
    Query(params): Query<StationOverviewParams>,
) -> Result<Json<StationOverview>> {
    if params.station_name.trim().is_empty() {
        return Err(Error::showable("Station name cannot be empty"));
    }
    let data = station_overview(&ctx, &user.tenant_name, &params.station_name).await?;
    Ok(Json(data))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SystemLogsParams {
    log_type: String,
    start_index: i64,
}

pub(crate) async fn system_logs_handler(
    State(ctx): State<MonitoringContext>,
    _user: AuthenticatedUser,
    Query(params): Query<SystemLogsParams>,
) -> Result<impl IntoResponse> {
    let filter = filter_for_log_type(&params.log_type).map_err(Error::Logs)?;
    let mode = if params.start_index == -1 {
        ReadMode::TailLast
    } else {
        ReadMode::FromSeqBack {
            last_known_seq: u64::try_from(params.start_index).unwrap_or_default(),
        }
    };
    let logs: Vec<Log> = ctx
        .log_query()
        .fetch(LOGS_FETCH_AMOUNT, LOGS_FETCH_TIMEOUT, mode, filter)
        .await?;
    Ok(Json(json!({ "logs": logs })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadLogsParams {
    log_type: String,
}

pub(crate) async fn download_logs_handler(
    State(ctx): State<MonitoringContext>,
    _user: AuthenticatedUser,
    Query(params): Query<DownloadLogsParams>,
) -> Result<impl IntoResponse> {
    let filter = filter_for_log_type(&params.log_type).map_err(Error::Logs)?;
    let text = ctx
        .log_query()
        .download(LOGS_DOWNLOAD_TIMEOUT, filter)
        .await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"switchyard-system-logs.txt\"",
            ),
        ],
        text,
    ))
}

pub(crate) async fn available_replicas_handler(
    State(ctx): State<MonitoringContext>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse> {
    let varz = ctx.telemetry.varz().await?;
    Ok(Json(json!({ "available_replicas": varz.routes + 1 })))
}
