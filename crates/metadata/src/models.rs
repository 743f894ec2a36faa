//! Entities owned by the metadata and message stores, as the monitoring
//! core reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logical topic owned by a tenant.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Station {
    /// Row id in the metadata store.
    pub id: i64,
    /// Station name, unique per tenant.
    pub name: String,
    /// Owning tenant.
    pub tenant_name: String,
    /// Whether producers/consumers use the first-party SDK and report
    /// their identity.
    pub is_native: bool,
    /// Attached schema name; empty when none is enforced.
    pub schema_name: String,
    /// Active schema version; zero when none is enforced.
    pub schema_version_number: i32,
    /// Idempotency window, in milliseconds.
    pub idempotency_window_ms: i64,
    /// Whether poison messages go to the dead-letter side-channel.
    pub dls_configuration_poison: bool,
    /// Whether schema-failed messages go to the dead-letter side-channel.
    pub dls_configuration_schemaverse: bool,
    /// Whether aged messages offload to tiered storage.
    pub tiered_storage_enabled: bool,
    /// User that created the station.
    pub created_by_username: String,
}

/// A station decorated with the counters the overview shows.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ExtendedStation {
    /// The station itself.
    #[serde(flatten)]
    pub station: Station,
    /// Messages currently retained.
    pub total_messages: u64,
    /// Whether the dead-letter side-channel holds anything.
    pub has_dls_messages: bool,
}

/// The station inventory plus aggregate counters.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct StationsInventory {
    /// All of the tenant's stations.
    pub stations: Vec<ExtendedStation>,
    /// Messages retained across all stations.
    pub total_messages: u64,
    /// Dead-letter messages across all stations.
    pub total_dls_messages: u64,
}

/// A producer as shown on the station overview.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ExtendedProducer {
    /// Producer name.
    pub name: String,
    /// Producer kind reported by the SDK.
    #[serde(rename = "type")]
    pub producer_type: String,
    /// Connection the producer registered on.
    pub connection_id: String,
    /// User the producer authenticated as.
    pub created_by_username: String,
    /// Station the producer writes to.
    pub station_name: String,
    /// Whether the connection is currently up.
    pub is_active: bool,
    /// Remote address of the connection.
    pub client_address: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Producers partitioned by connection state.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ProducersByStation {
    /// Producers with a live connection.
    pub connected_producers: Vec<ExtendedProducer>,
    /// Producers whose connection dropped.
    pub disconnected_producers: Vec<ExtendedProducer>,
    /// Producers deleted by their owner.
    pub deleted_producers: Vec<ExtendedProducer>,
}

/// A consumer group as shown on the station overview.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Cg {
    /// Group name.
    pub name: String,
    /// Messages not yet delivered to the group.
    pub unprocessed_messages: i64,
    /// Messages on the group's dead-letter side-channel.
    pub poison_messages: i64,
    /// Messages delivered but not yet acknowledged.
    pub in_process_messages: i64,
    /// Ack deadline, in milliseconds.
    pub max_ack_time_ms: i64,
    /// Delivery attempts before a message is considered poison.
    pub max_msg_deliveries: i32,
    /// Whether any member is connected.
    pub is_active: bool,
    /// Members with a live connection.
    pub connected_consumers: Vec<String>,
    /// Members whose connection dropped.
    pub disconnected_consumers: Vec<String>,
    /// Members deleted by their owner.
    pub deleted_consumers: Vec<String>,
    /// Last time the group changed state.
    pub last_status_change_date: DateTime<Utc>,
}

/// Consumer groups partitioned by connection state.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CgsByStation {
    /// Groups with at least one live member.
    pub connected_cgs: Vec<Cg>,
    /// Groups with no live members.
    pub disconnected_cgs: Vec<Cg>,
    /// Deleted groups.
    pub deleted_cgs: Vec<Cg>,
}

/// One audit-log entry for a station.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AuditLog {
    /// Station the entry belongs to.
    pub station_name: String,
    /// Human-readable event.
    pub message: String,
    /// Acting user.
    pub created_by_username: String,
    /// Event time.
    pub created_at: DateTime<Utc>,
}

/// A tag attached to a station.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Tag {
    /// Tag text.
    pub name: String,
    /// Display colour.
    pub color: String,
}

/// A schema registered with the metadata store.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Schema {
    /// Row id in the metadata store.
    pub id: i64,
    /// Schema name, unique per tenant.
    pub name: String,
    /// Schema language (`json`, `protobuf`, ...).
    #[serde(rename = "type")]
    pub schema_type: String,
}

/// One version of a schema.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SchemaVersion {
    /// Version number, 1-based.
    pub version_number: i32,
    /// Whether this version is the active one.
    pub active: bool,
}

/// Schema details as shown on the station overview.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SchemaDetails {
    /// Schema name.
    pub schema_name: String,
    /// Version the station pins.
    pub version_number: i32,
    /// Whether a newer version is active.
    pub updates_available: bool,
    /// Schema language.
    pub schema_type: String,
}

/// One message from the station's recent sample.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MessageDetails {
    /// Stream sequence.
    pub message_seq: u64,
    /// Producer that wrote the message; empty for non-native stations.
    pub produced_by: String,
    /// Payload preview.
    pub data: String,
    /// Payload size, in bytes.
    pub size: i64,
    /// Store time.
    pub created_at: DateTime<Utc>,
}

/// A dead-letter message in its light listing form.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LightDlsMessage {
    /// Row id on the side-channel.
    pub id: i64,
    /// Original stream sequence.
    pub message_seq: u64,
    /// Payload preview.
    pub data: String,
}

/// The dead-letter summary for one station.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DlsSummary {
    /// Messages that exceeded max deliveries.
    pub poison_messages: Vec<LightDlsMessage>,
    /// Messages that failed schema validation.
    #[serde(rename = "schema_fail_messages")]
    pub schema_failed_messages: Vec<LightDlsMessage>,
    /// Total size of the side-channel.
    pub total_dls_amount: i64,
}

/// Replica placement of a station's backing stream.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LeaderAndFollowers {
    /// Broker hosting the stream leader.
    pub leader: String,
    /// Brokers hosting followers.
    pub followers: Vec<String>,
}
