//! The main-overview composite: inventory, component health and broker
//! throughput fetched concurrently and assembled only when all three
//! succeed.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use switchyard_metadata::{ExtendedStation, MetadataStore};
use switchyard_probe::{ComponentFamily, SystemProbe};
use switchyard_streams::{ReadMode, ReadRequest, RecentReader};
use switchyard_throughput::{aggregate, decode_record, AlignedSeries, TimedSample};
use tokio::sync::Mutex;

use crate::error::downgrade_component_error;
use crate::{Error, MonitoringContext, Result};

/// Name of the internal per-broker throughput stream.
pub const THROUGHPUT_STREAM_NAME: &str = "$switchyard_throughput_v1";

/// Budget for draining the throughput stream; the stream retains only the
/// rolling window, so this stays tight.
const THROUGHPUT_READ_TIMEOUT: Duration = Duration::from_millis(300);

/// The composite payload behind the main dashboard.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MainOverviewData {
    /// Number of stations the tenant owns.
    pub total_stations: usize,
    /// Messages retained across all stations.
    pub total_messages: u64,
    /// Dead-letter messages across all stations.
    pub total_dls_messages: u64,
    /// Component families with health rollups.
    pub system_components: Vec<ComponentFamily>,
    /// Station inventory.
    pub stations: Vec<ExtendedStation>,
    /// Whether the deployment runs under a cluster orchestrator.
    pub k8s_env: bool,
    /// Aligned throughput series, `total` row first.
    pub brokers_throughput: Vec<AlignedSeries>,
    /// False when component stats are synthetic (metrics API absent).
    pub metrics_enabled: bool,
}

async fn set_first_error(cell: &Mutex<Option<Error>>, err: Error) {
    let mut slot = cell.lock().await;
    slot.get_or_insert(err);
}

/// Reads the rolling throughput window and aggregates it for one tenant.
async fn brokers_throughput(
    reader: Arc<dyn RecentReader>,
    tenant: &str,
    window: usize,
) -> Result<Vec<AlignedSeries>> {
    let outcome = reader
        .read_recent(ReadRequest::new(
            THROUGHPUT_STREAM_NAME,
            u64::MAX,
            THROUGHPUT_READ_TIMEOUT,
            ReadMode::All,
        ))
        .await?;

    let samples = outcome
        .records
        .iter()
        .map(decode_record)
        .collect::<switchyard_throughput::Result<Vec<TimedSample>>>()?;

    Ok(aggregate(samples, tenant, window))
}

/// Assembles the main overview for one tenant.
///
/// The three sub-queries run as sibling tasks sharing the result struct
/// under a mutex and a single first-error cell; the response exists only if
/// all of them succeed.
///
/// # Errors
///
/// The first sub-query failure wins. Component failures caused by an
/// unreachable container daemon are downgraded to a showable error.
pub async fn main_overview(ctx: &MonitoringContext, tenant: &str) -> Result<MainOverviewData> {
    let shared = Arc::new(Mutex::new(MainOverviewData::default()));
    let first_error: Arc<Mutex<Option<Error>>> = Arc::new(Mutex::new(None));

    let inventory_task = {
        let metadata: Arc<dyn MetadataStore> = ctx.metadata.clone();
        let shared = shared.clone();
        let first_error = first_error.clone();
        let tenant = tenant.to_string();
        tokio::spawn(async move {
            match metadata.stations_inventory(&tenant).await {
                Ok(inventory) => {
                    let mut data = shared.lock().await;
                    data.total_stations = inventory.stations.len();
                    data.stations = inventory.stations;
                    data.total_messages = inventory.total_messages;
                    data.total_dls_messages = inventory.total_dls_messages;
                }
                Err(err) => set_first_error(&first_error, err.into()).await,
            }
        })
    };

    let components_task = {
        let probe: Arc<dyn SystemProbe> = ctx.probe.clone();
        let shared = shared.clone();
        let first_error = first_error.clone();
        tokio::spawn(async move {
            match probe.system_components().await {
                Ok(snapshot) => {
                    let mut data = shared.lock().await;
                    data.system_components = snapshot.families;
                    data.metrics_enabled = snapshot.metrics_enabled;
                }
                Err(err) => {
                    set_first_error(&first_error, downgrade_component_error(err.into())).await;
                }
            }
        })
    };

    let throughput_task = {
        let reader = ctx.reader.clone();
        let shared = shared.clone();
        let first_error = first_error.clone();
        let tenant = tenant.to_string();
        let window = ctx.config.window();
        tokio::spawn(async move {
            match brokers_throughput(reader, &tenant, window).await {
                Ok(series) => shared.lock().await.brokers_throughput = series,
                Err(err) => set_first_error(&first_error, err).await,
            }
        })
    };

    let _ = tokio::join!(inventory_task, components_task, throughput_task);

    if let Some(err) = first_error.lock().await.take() {
        return Err(err);
    }

    let mut data = std::mem::take(&mut *shared.lock().await);
    data.k8s_env = ctx.config.k8s_env();
    Ok(data)
}
