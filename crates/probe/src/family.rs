//! Routing of component instances into replica families.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use switchyard_health::{ComponentBuckets, SysComponent};

/// Broker replica family.
pub const BROKER_FAMILY: &str = "broker";
/// Metadata-store replica family.
pub const METADATA_FAMILY: &str = "metadata";
/// REST gateway family.
pub const REST_GATEWAY_FAMILY: &str = "rest-gateway";
/// Metadata coordinator family.
pub const METADATA_COORDINATOR_FAMILY: &str = "metadata-coordinator";

/// All families in display order.
pub const FAMILIES: [&str; 4] = [
    BROKER_FAMILY,
    METADATA_FAMILY,
    REST_GATEWAY_FAMILY,
    METADATA_COORDINATOR_FAMILY,
];

static BROKER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^broker-\d+$").expect("broker matcher"));
static METADATA_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^metadata-\d+$").expect("metadata matcher"));

/// Whether a component instance belongs to a family.
///
/// Broker and metadata replicas are numbered and matched exactly so that
/// e.g. `metadata-coordinator-0` never counts as a metadata replica; the
/// remaining families match by substring.
#[must_use]
pub fn matches_family(family: &str, component_name: &str) -> bool {
    match family {
        BROKER_FAMILY => BROKER_NAME.is_match(component_name),
        METADATA_FAMILY => METADATA_NAME.is_match(component_name),
        _ => component_name.contains(family),
    }
}

/// Buckets the components belonging to one family by status.
#[must_use]
pub fn family_buckets(family: &str, components: &[SysComponent]) -> ComponentBuckets {
    ComponentBuckets::from_components(
        components
            .iter()
            .filter(|component| matches_family(family, &component.name))
            .cloned(),
    )
}

/// Distinct sorted union of ports exposed by the family's instances.
#[must_use]
pub fn family_ports(family: &str, ports_by_instance: &HashMap<String, Vec<i32>>) -> Vec<i32> {
    let mut ports: Vec<i32> = ports_by_instance
        .iter()
        .filter(|(name, _)| matches_family(family, name))
        .flat_map(|(_, ports)| ports.iter().copied())
        .collect();
    ports.sort_unstable();
    ports.dedup();
    ports
}

/// Distinct sorted hosts the family's instances run on.
#[must_use]
pub fn family_hosts(family: &str, host_by_instance: &HashMap<String, String>) -> Vec<String> {
    let mut hosts: Vec<String> = host_by_instance
        .iter()
        .filter(|(name, _)| matches_family(family, name))
        .map(|(_, host)| host.clone())
        .collect();
    hosts.sort_unstable();
    hosts.dedup();
    hosts
}
