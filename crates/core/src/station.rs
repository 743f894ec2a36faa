//! The station overview: a sequential pipeline of metadata- and
//! message-store reads for one station.

use serde::Serialize;
use switchyard_metadata::{
    AuditLog, Cg, CgsByStation, ExtendedProducer, LightDlsMessage, MessageDetails,
    ProducersByStation, SchemaDetails, Station, Tag, S3_INTEGRATION,
};

use crate::preview::{preview_cgs, preview_producers};
use crate::{Error, MonitoringContext, Result};

/// How many recent messages the overview samples.
pub const MESSAGES_SAMPLE_SIZE: usize = 1000;

/// The composite payload behind the per-station dashboard.
#[derive(Clone, Debug, Serialize)]
pub struct StationOverview {
    /// Producers with a live connection.
    pub connected_producers: Vec<ExtendedProducer>,
    /// Producers whose connection dropped.
    pub disconnected_producers: Vec<ExtendedProducer>,
    /// Producers deleted by their owner.
    pub deleted_producers: Vec<ExtendedProducer>,
    /// Groups with at least one live member.
    pub connected_cgs: Vec<Cg>,
    /// Groups with no live members.
    pub disconnected_cgs: Vec<Cg>,
    /// Deleted groups.
    pub deleted_cgs: Vec<Cg>,
    /// Messages currently retained.
    pub total_messages: u64,
    /// Average stored message size, in bytes.
    pub average_message_size: i64,
    /// Audit trail, newest first.
    pub audit_logs: Vec<AuditLog>,
    /// Recent message sample.
    pub messages: Vec<MessageDetails>,
    /// Messages that exceeded max deliveries.
    pub poison_messages: Vec<LightDlsMessage>,
    /// Messages that failed schema validation.
    #[serde(rename = "schema_fail_messages")]
    pub schema_failed_messages: Vec<LightDlsMessage>,
    /// Total size of the dead-letter side-channel.
    pub total_dls_messages: i64,
    /// Tags attached to the station.
    pub tags: Vec<Tag>,
    /// Broker hosting the stream leader.
    pub leader: String,
    /// Brokers hosting followers.
    pub followers: Vec<String>,
    /// Schema details, when the station enforces one.
    pub schema: Option<SchemaDetails>,
    /// Idempotency window, in milliseconds.
    pub idempotency_window_in_ms: i64,
    /// Whether poison messages go to the dead-letter side-channel.
    pub dls_configuration_poison: bool,
    /// Whether schema-failed messages go to the dead-letter side-channel.
    pub dls_configuration_schemaverse: bool,
    /// Whether tiered storage is active for the station.
    pub tiered_storage_enabled: bool,
    /// User that created the station.
    pub created_by_username: String,
}

/// Maps a message-store stream absence onto the showable "station does not
/// exist" condition.
fn station_scoped<T>(result: switchyard_metadata::Result<T>, station: &str) -> Result<T> {
    result.map_err(|err| match err {
        switchyard_metadata::Error::StreamNotFound(_) => Error::station_missing(station),
        other => other.into(),
    })
}

async fn schema_details(
    ctx: &MonitoringContext,
    tenant: &str,
    station: &Station,
) -> Result<Option<SchemaDetails>> {
    if station.schema_name.is_empty() || station.schema_version_number == 0 {
        return Ok(None);
    }
    let Some(schema) = ctx
        .metadata
        .schema_by_name(tenant, &station.schema_name)
        .await?
    else {
        // The schema was deleted from under the station; show an empty
        // attachment rather than failing the whole overview.
        return Ok(Some(SchemaDetails::default()));
    };
    let details = ctx
        .metadata
        .schema_version(schema.id, station.schema_version_number)
        .await?
        .map_or_else(SchemaDetails::default, |version| SchemaDetails {
            schema_name: schema.name,
            version_number: station.schema_version_number,
            updates_available: !version.active,
            schema_type: schema.schema_type,
        });
    Ok(Some(details))
}

/// Assembles the station overview.
///
/// # Errors
///
/// An unknown station and a vanished backing stream both surface as the
/// showable "station does not exist"; everything else is internal.
pub async fn station_overview(
    ctx: &MonitoringContext,
    tenant: &str,
    station_name: &str,
) -> Result<StationOverview> {
    let mut station = ctx
        .metadata
        .station_by_name(tenant, station_name)
        .await?
        .ok_or_else(|| Error::station_missing(station_name))?;

    // Only native stations report producer and group identity; the others
    // render the static preview fixture.
    let (producers, cgs) = if station.is_native {
        (
            ctx.metadata.producers_by_station(&station).await?,
            ctx.metadata.cgs_by_station(&station).await?,
        )
    } else {
        (preview_producers(), preview_cgs())
    };

    let audit_logs = ctx
        .metadata
        .audit_logs_by_station(tenant, &station.name)
        .await?;
    let total_messages = station_scoped(
        ctx.messages.total_messages(tenant, &station.name).await,
        station_name,
    )?;
    let average_message_size = station_scoped(
        ctx.messages
            .average_message_size(tenant, &station.name)
            .await,
        station_name,
    )?;
    let messages = station_scoped(
        ctx.messages
            .last_messages(tenant, &station.name, MESSAGES_SAMPLE_SIZE)
            .await,
        station_name,
    )?;
    let dls = station_scoped(
        ctx.messages.dls_summary(tenant, &station.name).await,
        station_name,
    )?;
    let tags = ctx.metadata.tags_by_station(station.id).await?;
    let placement = station_scoped(
        ctx.messages.leader_and_followers(tenant, &station.name).await,
        station_name,
    )?;

    station.tiered_storage_enabled =
        station.tiered_storage_enabled && ctx.integrations.tenant_has(tenant, S3_INTEGRATION);

    let schema = schema_details(ctx, tenant, &station).await?;

    let ProducersByStation {
        connected_producers,
        disconnected_producers,
        deleted_producers,
    } = producers;
    let CgsByStation {
        connected_cgs,
        disconnected_cgs,
        deleted_cgs,
    } = cgs;

    Ok(StationOverview {
        connected_producers,
        disconnected_producers,
        deleted_producers,
        connected_cgs,
        disconnected_cgs,
        deleted_cgs,
        total_messages,
        average_message_size,
        audit_logs,
        messages,
        poison_messages: dls.poison_messages,
        schema_failed_messages: dls.schema_failed_messages,
        total_dls_messages: dls.total_dls_amount,
        tags,
        leader: placement.leader,
        followers: placement.followers,
        schema,
        idempotency_window_in_ms: station.idempotency_window_ms,
        dls_configuration_poison: station.dls_configuration_poison,
        dls_configuration_schemaverse: station.dls_configuration_schemaverse,
        tiered_storage_enabled: station.tiered_storage_enabled,
        created_by_username: station.created_by_username,
    })
}
