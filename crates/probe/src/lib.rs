//! Per-replica resource probing for the Switchyard overview.
//!
//! Two back-ends exist and exactly one is active per process: the
//! orchestrator back-end reads pod specs, the metrics API and in-container
//! `df` through the [`Orchestrator`] collaborator trait, and the
//! local-process back-end reads the broker's own process and root
//! filesystem. Both produce classified components grouped into replica
//! families.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
pub mod family;
mod local;
mod orchestrator;

pub use error::{Error, Result};
pub use local::LocalProbe;
pub use orchestrator::{
    parse_df_human, parse_df_kblocks, ContainerSpec, ContainerUsage, Orchestrator,
    OrchestratorProbe, PodSpec, PodUsage,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use switchyard_health::{ComponentBuckets, Status};

/// A replica family with its classified members and rollup.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ComponentFamily {
    /// Family name (`broker`, `metadata`, ...).
    pub name: String,
    /// Members partitioned by status, padding included.
    pub components: ComponentBuckets,
    /// Highest-severity non-empty bucket.
    pub status: Status,
    /// Distinct sorted ports exposed by the family.
    pub ports: Vec<i32>,
    /// Replicas the deployment asks for.
    pub desired_replicas: usize,
    /// Replicas accounted for, padding included.
    pub actual_replicas: usize,
    /// Distinct sorted hosts the family runs on.
    pub hosts: Vec<String>,
}

/// Everything the overview needs to render component health.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SystemSnapshot {
    /// Families with at least one actual or desired replica.
    pub families: Vec<ComponentFamily>,
    /// False when the metrics API was unreachable and stats are synthetic.
    pub metrics_enabled: bool,
}

/// The active probing back-end, selected at initialisation.
#[async_trait]
pub trait SystemProbe: Send + Sync {
    /// Collects and classifies the current component snapshot.
    async fn system_components(&self) -> Result<SystemSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_invariants_hold_in_serialized_form() {
        let snapshot = SystemSnapshot {
            families: vec![ComponentFamily {
                name: "broker".to_string(),
                components: ComponentBuckets::default(),
                status: Status::Healthy,
                ports: vec![6666],
                desired_replicas: 0,
                actual_replicas: 0,
                hosts: Vec::new(),
            }],
            metrics_enabled: true,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        let family = &json["families"][0];
        assert_eq!(family["status"], "healthy");
        assert!(family["components"]["healthy_components"]
            .as_array()
            .unwrap()
            .is_empty());
        assert_eq!(family["desired_replicas"], 0);
    }
}
