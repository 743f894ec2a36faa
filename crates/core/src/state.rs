//! Shared request state: configuration plus the collaborator handles.

use std::sync::Arc;

use switchyard_broker_monitor::ClusterTelemetry;
use switchyard_metadata::{IntegrationsCache, MetadataStore, StationMessages};
use switchyard_probe::SystemProbe;
use switchyard_streams::RecentReader;
use switchyard_syslog::LogQuery;

use crate::Config;

/// Collaborators handed to the core at startup.
pub struct MonitoringContextOptions {
    /// Deployment configuration.
    pub config: Config,
    /// Reader over the internal streams.
    pub reader: Arc<dyn RecentReader>,
    /// Relational metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Message store backing the stations.
    pub messages: Arc<dyn StationMessages>,
    /// Active component-probe back-end.
    pub probe: Arc<dyn SystemProbe>,
    /// Broker monitoring-endpoint client.
    pub telemetry: Arc<dyn ClusterTelemetry>,
    /// Tenant integrations cache.
    pub integrations: Arc<IntegrationsCache>,
}

/// Everything a monitoring request needs, cheap to clone.
#[derive(Clone)]
pub struct MonitoringContext {
    /// Deployment configuration.
    pub config: Arc<Config>,
    /// Reader over the internal streams.
    pub reader: Arc<dyn RecentReader>,
    /// Relational metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Message store backing the stations.
    pub messages: Arc<dyn StationMessages>,
    /// Active component-probe back-end.
    pub probe: Arc<dyn SystemProbe>,
    /// Broker monitoring-endpoint client.
    pub telemetry: Arc<dyn ClusterTelemetry>,
    /// Tenant integrations cache.
    pub integrations: Arc<IntegrationsCache>,
}

impl MonitoringContext {
    /// Builds the context from its collaborators.
    #[must_use]
    pub fn new(
        MonitoringContextOptions {
            config,
            reader,
            metadata,
            messages,
            probe,
            telemetry,
            integrations,
        }: MonitoringContextOptions,
    ) -> Self {
        Self {
            config: Arc::new(config),
            reader,
            metadata,
            messages,
            probe,
            telemetry,
            integrations,
        }
    }

    /// A log query over the syslog stream.
    #[must_use]
    pub fn log_query(&self) -> LogQuery {
        LogQuery::new(self.reader.clone())
    }
}
