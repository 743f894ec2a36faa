//! Local-process fallback probe for single-node deployments.

use async_trait::async_trait;
use switchyard_health::{shorten_float, ComponentBuckets, Stat, SysComponent};
use tokio::process::Command;

use crate::family::BROKER_FAMILY;
use crate::orchestrator::parse_df_human;
use crate::{ComponentFamily, Error, Result, SystemProbe, SystemSnapshot};

/// Probes the broker's own process and root filesystem.
///
/// Used where no orchestrator is present (docker and local-cluster
/// deployments); the snapshot carries a single broker replica.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalProbe;

impl LocalProbe {
    /// Creates the local probe.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn process_stats() -> Result<(Stat, Stat)> {
    let mut system = sysinfo::System::new_all();
    system.refresh_all();

    let pid = sysinfo::get_current_pid().map_err(|err| Error::Process(err.to_string()))?;
    let process = system
        .process(pid)
        .ok_or_else(|| Error::Process(format!("process {pid} not visible")))?;

    let cpu_count = system.cpus().len().max(1);
    let cpu_pct = f64::from(process.cpu_usage()) / cpu_count as f64;
    let cpu = Stat {
        total: 100.0,
        current: shorten_float(cpu_pct),
        percentage: cpu_pct as i32,
    };

    let memory = Stat::from_usage(system.total_memory() as f64, process.virtual_memory() as f64);
    Ok((cpu, memory))
}

async fn root_storage_stat() -> Result<Stat> {
    let output = Command::new("df").args(["-h", "/"]).output().await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let (total, used, percentage) = parse_df_human(&stdout)?;
    Ok(Stat {
        total: shorten_float(total),
        current: shorten_float(used),
        percentage,
    })
}

#[async_trait]
impl SystemProbe for LocalProbe {
    async fn system_components(&self) -> Result<SystemSnapshot> {
        let (cpu, memory) = tokio::task::spawn_blocking(process_stats)
            .await
            .map_err(|err| Error::Process(err.to_string()))??;
        let storage = root_storage_stat().await?;

        let component = SysComponent::classified("broker-0", cpu, memory, storage);
        let mut buckets = ComponentBuckets::default();
        let status = component.status;
        buckets.push(component);

        let hosts = sysinfo::System::host_name()
            .map(|host| vec![host])
            .unwrap_or_default();

        Ok(SystemSnapshot {
            families: vec![ComponentFamily {
                name: BROKER_FAMILY.to_string(),
                status,
                ports: Vec::new(),
                desired_replicas: 1,
                actual_replicas: 1,
                hosts,
                components: buckets,
            }],
            metrics_enabled: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_snapshot_reports_one_broker_replica() {
        let snapshot = LocalProbe::new().system_components().await.unwrap();
        assert!(snapshot.metrics_enabled);
        assert_eq!(snapshot.families.len(), 1);

        let family = &snapshot.families[0];
        assert_eq!(family.name, BROKER_FAMILY);
        assert_eq!(family.actual_replicas, 1);
        assert_eq!(family.desired_replicas, 1);
        assert_eq!(family.components.len(), 1);
    }
}
