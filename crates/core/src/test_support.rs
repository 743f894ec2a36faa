//! Mock collaborators shared by the core's test suites.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use switchyard_broker_monitor::{ClusterTelemetry, Varz};
use switchyard_health::{ComponentBuckets, Stat, SysComponent};
use switchyard_metadata::{
    AuditLog, Cg, CgsByStation, DlsSummary, Error as StoreError, ExtendedProducer,
    ExtendedStation, IntegrationsCache, LeaderAndFollowers, LightDlsMessage, MessageDetails,
    MetadataStore, ProducersByStation, Schema, SchemaVersion, Station, StationMessages,
    StationsInventory, Tag,
};
use switchyard_probe::{ComponentFamily, SystemProbe, SystemSnapshot};
use switchyard_streams_memory::MemoryStreams;
use switchyard_syslog::SYSLOG_STREAM_NAME;

use crate::overview::THROUGHPUT_STREAM_NAME;
use crate::{Config, MonitoringContext, MonitoringContextOptions};

/// Knobs for building a test context.
pub(crate) struct ContextConfig {
    pub inventory_error: Option<String>,
    pub probe_error: Option<String>,
    pub messages_stream_missing: bool,
    pub tenant_integrations: Vec<String>,
    pub station_schema: Option<(String, i32)>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            inventory_error: None,
            probe_error: None,
            messages_stream_missing: false,
            tenant_integrations: vec!["s3".to_string()],
            station_schema: None,
        }
    }
}

fn station(name: &str, is_native: bool, schema: Option<&(String, i32)>) -> Station {
    Station {
        id: 1,
        name: name.to_string(),
        tenant_name: "acme".to_string(),
        is_native,
        schema_name: schema.map(|(name, _)| name.clone()).unwrap_or_default(),
        schema_version_number: schema.map_or(0, |&(_, version)| version),
        idempotency_window_ms: 120_000,
        dls_configuration_poison: true,
        dls_configuration_schemaverse: false,
        tiered_storage_enabled: true,
        created_by_username: "root".to_string(),
    }
}

struct MockMetadataStore {
    inventory_error: Option<String>,
    station_schema: Option<(String, i32)>,
}

#[async_trait]
impl MetadataStore for MockMetadataStore {
    async fn stations_inventory(
        &self,
        _tenant: &str,
    ) -> switchyard_metadata::Result<StationsInventory> {
        if let Some(message) = &self.inventory_error {
            return Err(StoreError::Backend(message.clone()));
        }
        Ok(StationsInventory {
            stations: vec![
                ExtendedStation {
                    station: station("orders", true, self.station_schema.as_ref()),
                    total_messages: 800,
                    has_dls_messages: true,
                },
                ExtendedStation {
                    station: station("legacy", false, None),
                    total_messages: 400,
                    has_dls_messages: false,
                },
            ],
            total_messages: 1200,
            total_dls_messages: 7,
        })
    }

    async fn station_by_name(
        &self,
        _tenant: &str,
        name: &str,
    ) -> switchyard_metadata::Result<Option<Station>> {
        Ok(match name {
            "orders" => Some(station("orders", true, self.station_schema.as_ref())),
            "legacy" => Some(station("legacy", false, None)),
            _ => None,
        })
    }

    async fn producers_by_station(
        &self,
        _station: &Station,
    ) -> switchyard_metadata::Result<ProducersByStation> {
        Ok(ProducersByStation {
            connected_producers: vec![ExtendedProducer {
                name: "orders-writer".to_string(),
                producer_type: "application".to_string(),
                connection_id: "c0ffee".to_string(),
                created_by_username: "root".to_string(),
                station_name: "orders".to_string(),
                is_active: true,
                client_address: "10.0.0.7:50512".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single().unwrap(),
            }],
            disconnected_producers: Vec::new(),
            deleted_producers: Vec::new(),
        })
    }

    async fn cgs_by_station(&self, _station: &Station) -> switchyard_metadata::Result<CgsByStation> {
        Ok(CgsByStation {
            connected_cgs: vec![Cg {
                name: "orders-group".to_string(),
                max_ack_time_ms: 30_000,
                max_msg_deliveries: 10,
                is_active: true,
                last_status_change_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single().unwrap(),
                ..Cg::default()
            }],
            disconnected_cgs: Vec::new(),
            deleted_cgs: Vec::new(),
        })
    }

    async fn audit_logs_by_station(
        &self,
        _tenant: &str,
        station: &str,
    ) -> switchyard_metadata::Result<Vec<AuditLog>> {
        Ok(vec![AuditLog {
            station_name: station.to_string(),
            message: "station created".to_string(),
            created_by_username: "root".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single().unwrap(),
        }])
    }

    async fn tags_by_station(&self, _station_id: i64) -> switchyard_metadata::Result<Vec<Tag>> {
        Ok(vec![Tag {
            name: "critical".to_string(),
            color: "101, 87, 255".to_string(),
        }])
    }

    async fn schema_by_name(
        &self,
        _tenant: &str,
        name: &str,
    ) -> switchyard_metadata::Result<Option<Schema>> {
        Ok((name == "order-schema").then(|| Schema {
            id: 9,
            name: name.to_string(),
            schema_type: "json".to_string(),
        }))
    }

    async fn schema_version(
        &self,
        _schema_id: i64,
        version_number: i32,
    ) -> switchyard_metadata::Result<Option<SchemaVersion>> {
        Ok(Some(SchemaVersion {
            version_number,
            active: false,
        }))
    }
}

struct MockStationMessages {
    stream_missing: bool,
}

impl MockStationMessages {
    fn guard(&self) -> switchyard_metadata::Result<()> {
        if self.stream_missing {
            Err(StoreError::StreamNotFound("sy_acme_orders".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StationMessages for MockStationMessages {
    async fn total_messages(&self, _tenant: &str, _station: &str) -> switchyard_metadata::Result<u64> {
        self.guard()?;
        Ok(800)
    }

    async fn average_message_size(
        &self,
        _tenant: &str,
        _station: &str,
    ) -> switchyard_metadata::Result<i64> {
        self.guard()?;
        Ok(256)
    }

    async fn last_messages(
        &self,
        _tenant: &str,
        _station: &str,
        limit: usize,
    ) -> switchyard_metadata::Result<Vec<MessageDetails>> {
        self.guard()?;
        Ok((0..2.min(limit))
            .map(|i| MessageDetails {
                message_seq: 799 + i as u64,
                produced_by: "orders-writer".to_string(),
                data: format!("payload {i}"),
                size: 128,
                created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, i as u32).single().unwrap(),
            })
            .collect())
    }

    async fn dls_summary(&self, _tenant: &str, _station: &str) -> switchyard_metadata::Result<DlsSummary> {
        self.guard()?;
        Ok(DlsSummary {
            poison_messages: vec![LightDlsMessage {
                id: 1,
                message_seq: 512,
                data: "bad payload".to_string(),
            }],
            schema_failed_messages: Vec::new(),
            total_dls_amount: 2,
        })
    }

    async fn leader_and_followers(
        &self,
        _tenant: &str,
        _station: &str,
    ) -> switchyard_metadata::Result<LeaderAndFollowers> {
        self.guard()?;
        Ok(LeaderAndFollowers {
            leader: "broker-0".to_string(),
            followers: vec!["broker-1".to_string()],
        })
    }
}

struct MockProbe {
    error: Option<String>,
}

#[async_trait]
impl SystemProbe for MockProbe {
    async fn system_components(&self) -> switchyard_probe::Result<SystemSnapshot> {
        if let Some(message) = &self.error {
            return Err(switchyard_probe::Error::Orchestrator(message.clone()));
        }
        let component = SysComponent::classified(
            "broker-0",
            Stat {
                total: 1000.0,
                current: 100.0,
                percentage: 10,
            },
            Stat::default(),
            Stat::default(),
        );
        let mut buckets = ComponentBuckets::default();
        buckets.push(component);
        Ok(SystemSnapshot {
            families: vec![ComponentFamily {
                name: "broker".to_string(),
                status: buckets.rollup_status(),
                ports: vec![6666],
                desired_replicas: 1,
                actual_replicas: 1,
                hosts: vec!["node-a".to_string()],
                components: buckets,
            }],
            metrics_enabled: true,
        })
    }
}

struct MockTelemetry;

#[async_trait]
impl ClusterTelemetry for MockTelemetry {
    async fn varz(&self) -> switchyard_broker_monitor::Result<Varz> {
        Ok(Varz {
            version: "4.2.0".to_string(),
            routes: 2,
        })
    }
}

/// Builds a context over in-memory streams and the mocks above.
pub(crate) async fn test_context(config: ContextConfig) -> MonitoringContext {
    let streams = MemoryStreams::new();
    streams.create_stream(THROUGHPUT_STREAM_NAME).await;
    streams.create_stream(SYSLOG_STREAM_NAME).await;

    for (broker, read, write) in [("b1", 10, 1), ("b2", 5, 2)] {
        streams
            .publish(
                THROUGHPUT_STREAM_NAME,
                THROUGHPUT_STREAM_NAME,
                format!(
                    r#"{{"name":"{broker}","read":{{"acme":{read}}},"write":{{"acme":{write}}}}}"#
                ),
            )
            .await
            .unwrap();
    }
    for i in 0..6 {
        let level = if i % 2 == 0 { "info" } else { "err" };
        streams
            .publish(
                SYSLOG_STREAM_NAME,
                format!("{SYSLOG_STREAM_NAME}.broker-0.{level}"),
                format!("log line {i}"),
            )
            .await
            .unwrap();
    }

    let integrations = IntegrationsCache::new();
    integrations.set_tenant("acme", config.tenant_integrations.clone());

    MonitoringContext::new(MonitoringContextOptions {
        config: Config::default(),
        reader: Arc::new(streams),
        metadata: Arc::new(MockMetadataStore {
            inventory_error: config.inventory_error,
            station_schema: config.station_schema,
        }),
        messages: Arc::new(MockStationMessages {
            stream_missing: config.messages_stream_missing,
        }),
        probe: Arc::new(MockProbe {
            error: config.probe_error,
        }),
        telemetry: Arc::new(MockTelemetry),
        integrations: Arc::new(integrations),
    })
}
