//! Collaborator interfaces of the Switchyard monitoring core.
//!
//! The relational metadata store, the message store behind each station and
//! the tenant integrations cache belong to other subsystems; the monitoring
//! core consumes the operations below and nothing else. Implementations
//! live with their owning subsystems, mocks live with the tests that need
//! them.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod integrations;
mod models;

pub use error::{Error, Result};
pub use integrations::{IntegrationsCache, S3_INTEGRATION};
pub use models::{
    AuditLog, Cg, CgsByStation, DlsSummary, ExtendedProducer, ExtendedStation, LeaderAndFollowers,
    LightDlsMessage, MessageDetails, ProducersByStation, Schema, SchemaDetails, SchemaVersion,
    Station, StationsInventory, Tag,
};

use async_trait::async_trait;

/// Read operations the core consumes from the relational metadata store.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// All of a tenant's stations plus aggregate counters.
    async fn stations_inventory(&self, tenant: &str) -> Result<StationsInventory>;

    /// Looks a station up by name.
    async fn station_by_name(&self, tenant: &str, station: &str) -> Result<Option<Station>>;

    /// Producers registered on a station, partitioned by connection state.
    async fn producers_by_station(&self, station: &Station) -> Result<ProducersByStation>;

    /// Consumer groups on a station, partitioned by connection state.
    async fn cgs_by_station(&self, station: &Station) -> Result<CgsByStation>;

    /// Audit trail of a station, newest first.
    async fn audit_logs_by_station(&self, tenant: &str, station: &str) -> Result<Vec<AuditLog>>;

    /// Tags attached to a station.
    async fn tags_by_station(&self, station_id: i64) -> Result<Vec<Tag>>;

    /// Looks a schema up by name.
    async fn schema_by_name(&self, tenant: &str, name: &str) -> Result<Option<Schema>>;

    /// Looks one version of a schema up.
    async fn schema_version(
        &self,
        schema_id: i64,
        version_number: i32,
    ) -> Result<Option<SchemaVersion>>;
}

/// Read operations the core consumes from the message store backing each
/// station.
///
/// Implementations return [`Error::StreamNotFound`] when the station's
/// stream is gone so callers can surface "station does not exist".
#[async_trait]
pub trait StationMessages: Send + Sync {
    /// Messages currently retained by the station.
    async fn total_messages(&self, tenant: &str, station: &str) -> Result<u64>;

    /// Average stored message size, in bytes.
    async fn average_message_size(&self, tenant: &str, station: &str) -> Result<i64>;

    /// The newest `limit` messages, oldest first.
    async fn last_messages(
        &self,
        tenant: &str,
        station: &str,
        limit: usize,
    ) -> Result<Vec<MessageDetails>>;

    /// The station's dead-letter summary.
    async fn dls_summary(&self, tenant: &str, station: &str) -> Result<DlsSummary>;

    /// Replica placement of the station's backing stream.
    async fn leader_and_followers(&self, tenant: &str, station: &str)
        -> Result<LeaderAndFollowers>;
}
