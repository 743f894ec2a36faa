//! Static preview data shown for non-native stations.
//!
//! Producers and consumer groups on non-native stations do not report
//! their identity, so the station overview renders this fixed fixture in
//! place of live data.

use chrono::{DateTime, TimeZone, Utc};
use switchyard_metadata::{Cg, CgsByStation, ExtendedProducer, ProducersByStation};

const PREVIEW_STATION: &str = "preview";
const PREVIEW_CONNECTION: &str = "f95f24fbcf959dfb941e6ff3";
const PREVIEW_ADDRESS: &str = "127.0.0.1:61430";

fn preview_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 5, 8, 44, 37)
        .single()
        .unwrap_or_default()
}

fn producer(name: &str, is_active: bool) -> ExtendedProducer {
    ExtendedProducer {
        name: name.to_string(),
        producer_type: "application".to_string(),
        connection_id: PREVIEW_CONNECTION.to_string(),
        created_by_username: "root".to_string(),
        station_name: PREVIEW_STATION.to_string(),
        is_active,
        client_address: PREVIEW_ADDRESS.to_string(),
        created_at: preview_time(),
    }
}

fn cg(name: &str, is_active: bool) -> Cg {
    Cg {
        name: name.to_string(),
        unprocessed_messages: 0,
        poison_messages: 0,
        in_process_messages: 0,
        max_ack_time_ms: 30_000,
        max_msg_deliveries: 10,
        is_active,
        connected_consumers: Vec::new(),
        disconnected_consumers: Vec::new(),
        deleted_consumers: Vec::new(),
        last_status_change_date: preview_time(),
    }
}

/// The preview producer listing, verbatim on every call.
#[must_use]
pub fn preview_producers() -> ProducersByStation {
    ProducersByStation {
        connected_producers: vec![
            producer("prod.20", true),
            producer("prod.19", true),
            producer("prod.18", true),
            producer("prod.17", true),
        ],
        disconnected_producers: vec![
            producer("prod.16", false),
            producer("prod.15", false),
            producer("prod.14", false),
            producer("prod.13", false),
            producer("prod.12", false),
            producer("prod.11", false),
        ],
        deleted_producers: Vec::new(),
    }
}

/// The preview consumer-group listing, verbatim on every call.
#[must_use]
pub fn preview_cgs() -> CgsByStation {
    CgsByStation {
        connected_cgs: vec![cg("cg.20", true), cg("cg.19", true), cg("cg.18", true)],
        disconnected_cgs: vec![
            cg("cg.17", false),
            cg("cg.16", false),
            cg("cg.15", false),
            cg("cg.14", false),
        ],
        deleted_cgs: Vec::new(),
    }
}
