//! Orchestrator-backed probing of pod replicas.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use switchyard_health::{placeholder_component, Stat, SysComponent};
use tracing::warn;

use crate::family::{family_buckets, family_hosts, family_ports, FAMILIES};
use crate::{ComponentFamily, Error, Result, SystemProbe, SystemSnapshot};

/// One container within a pod, with the resource envelope granted to it.
#[derive(Clone, Debug)]
pub struct ContainerSpec {
    /// Container name.
    pub name: String,
    /// Requested CPU, in millicores.
    pub cpu_request_millis: i64,
    /// Memory limit, in bytes.
    pub memory_limit_bytes: i64,
    /// Data mount to measure with `df`, for storage-bearing containers.
    pub storage_mount: Option<String>,
}

/// One pod as reported by the orchestrator's listing API.
#[derive(Clone, Debug)]
pub struct PodSpec {
    /// Pod name.
    pub name: String,
    /// Node the pod is scheduled on.
    pub node: String,
    /// Ports exposed by the pod spec.
    pub ports: Vec<i32>,
    /// Containers in the pod.
    pub containers: Vec<ContainerSpec>,
}

/// Resource use of one container as reported by the metrics API.
#[derive(Clone, Debug, Default)]
pub struct ContainerUsage {
    /// Container name.
    pub name: String,
    /// CPU in use, in millicores.
    pub cpu_used_millis: i64,
    /// Memory in use, in bytes.
    pub memory_used_bytes: i64,
}

/// Resource use of one pod.
#[derive(Clone, Debug, Default)]
pub struct PodUsage {
    /// Pod name.
    pub pod: String,
    /// Per-container use.
    pub containers: Vec<ContainerUsage>,
}

impl PodUsage {
    fn cpu_used_millis(&self) -> i64 {
        self.containers.iter().map(|c| c.cpu_used_millis).sum()
    }

    fn memory_used_bytes(&self) -> i64 {
        self.containers.iter().map(|c| c.memory_used_bytes).sum()
    }
}

/// The orchestrator operations the probe consumes.
///
/// Implementations wrap the in-cluster client; the probe never talks to the
/// cluster API directly. `pod_usage` failing means the metrics API is
/// absent or unauthorised, which the probe treats as non-fatal.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Lists the pods in the product namespace.
    async fn list_pods(&self) -> Result<Vec<PodSpec>>;

    /// Fetches per-pod resource use from the metrics API.
    async fn pod_usage(&self) -> Result<Vec<PodUsage>>;

    /// Runs a command inside a container and returns its stdout.
    async fn exec_in_pod(&self, pod: &str, container: &str, command: &[&str]) -> Result<String>;

    /// Desired replica counts per family, from the workload specs.
    async fn desired_replicas(&self) -> Result<HashMap<String, usize>>;
}

/// Parses `df <mount>` output into `(total_bytes, used_bytes)`.
///
/// The second line carries 1K-block counts: column 1 is the filesystem
/// size, column 2 the blocks in use.
pub fn parse_df_kblocks(output: &str) -> Result<(f64, f64)> {
    let line = output
        .lines()
        .nth(1)
        .ok_or_else(|| Error::DfParse("missing data line".to_string()))?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(Error::DfParse(format!("short data line: {line}")));
    }
    let total: f64 = fields[1]
        .parse()
        .map_err(|_| Error::DfParse(format!("bad block count: {}", fields[1])))?;
    let used: f64 = fields[2]
        .parse()
        .map_err(|_| Error::DfParse(format!("bad used count: {}", fields[2])))?;
    Ok((total * 1024.0, used * 1024.0))
}

fn human_size_bytes(field: &str) -> Result<f64> {
    let multiplier = match field.chars().last() {
        Some('K' | 'k') => 1024.0,
        Some('M' | 'm') => 1024.0 * 1024.0,
        Some('G' | 'g') => 1024.0 * 1024.0 * 1024.0,
        Some('T' | 't') => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        Some(c) if c.is_ascii_digit() => 1.0,
        _ => return Err(Error::DfParse(format!("bad size: {field}"))),
    };
    field
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse::<f64>()
        .map(|value| value * multiplier)
        .map_err(|_| Error::DfParse(format!("bad size: {field}")))
}

/// Parses `df -h /` output into `(total_bytes, used_bytes, used_pct)`.
///
/// Sizes come back in gigabytes on the deployments this back-end targets;
/// the other human-readable suffixes are accepted for good measure.
pub fn parse_df_human(output: &str) -> Result<(f64, f64, i32)> {
    let line = output
        .lines()
        .nth(1)
        .ok_or_else(|| Error::DfParse("missing data line".to_string()))?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(Error::DfParse(format!("short data line: {line}")));
    }
    let total = human_size_bytes(fields[1])?;
    let used = human_size_bytes(fields[2])?;
    let percentage: i32 = fields[4]
        .trim_end_matches('%')
        .parse()
        .map_err(|_| Error::DfParse(format!("bad use%: {}", fields[4])))?;
    Ok((total, used, percentage))
}

/// Probes replicas through the orchestrator's pod, metrics and exec APIs.
pub struct OrchestratorProbe<O> {
    orchestrator: O,
    metrics_absent_warned: AtomicBool,
}

impl<O> OrchestratorProbe<O>
where
    O: Orchestrator,
{
    /// Creates a probe over an orchestrator client.
    #[must_use]
    pub const fn new(orchestrator: O) -> Self {
        Self {
            orchestrator,
            metrics_absent_warned: AtomicBool::new(false),
        }
    }

    async fn storage_stat(&self, pod: &PodSpec) -> Result<Stat> {
        let Some(container) = pod
            .containers
            .iter()
            .find(|container| container.storage_mount.is_some())
        else {
            return Ok(Stat::default());
        };
        let mount = container.storage_mount.as_deref().unwrap_or("/");
        let output = self
            .orchestrator
            .exec_in_pod(&pod.name, &container.name, &["df", mount])
            .await?;
        let (total, used) = parse_df_kblocks(&output)?;
        Ok(Stat::from_usage(total, used))
    }

    async fn component_for_pod(&self, pod: &PodSpec, usage: &PodUsage) -> Result<SysComponent> {
        let cpu_request: i64 = pod.containers.iter().map(|c| c.cpu_request_millis).sum();
        let memory_limit: i64 = pod.containers.iter().map(|c| c.memory_limit_bytes).sum();

        let cpu = Stat::from_usage(cpu_request as f64, usage.cpu_used_millis() as f64);
        let memory = Stat::from_usage(memory_limit as f64, usage.memory_used_bytes() as f64);
        let storage = self.storage_stat(pod).await?;

        Ok(SysComponent::classified(&pod.name, cpu, memory, storage))
    }
}

#[async_trait]
impl<O> SystemProbe for OrchestratorProbe<O>
where
    O: Orchestrator,
{
    async fn system_components(&self) -> Result<SystemSnapshot> {
        let pods = self.orchestrator.list_pods().await?;

        let usage_by_pod = match self.orchestrator.pod_usage().await {
            Ok(usage) => Some(
                usage
                    .into_iter()
                    .map(|pod_usage| (pod_usage.pod.clone(), pod_usage))
                    .collect::<HashMap<_, _>>(),
            ),
            Err(err) => {
                // Absence is reported once per process, not per request.
                if !self.metrics_absent_warned.swap(true, Ordering::SeqCst) {
                    warn!("pod metrics API unavailable, component stats disabled: {err}");
                }
                None
            }
        };
        let metrics_enabled = usage_by_pod.is_some();

        let mut components = Vec::with_capacity(pods.len());
        let mut ports_by_instance: HashMap<String, Vec<i32>> = HashMap::new();
        let mut host_by_instance: HashMap<String, String> = HashMap::new();

        for pod in &pods {
            ports_by_instance.insert(pod.name.clone(), pod.ports.clone());
            host_by_instance.insert(pod.name.clone(), pod.node.clone());

            let component = if let Some(usage_by_pod) = &usage_by_pod {
                let usage = usage_by_pod.get(&pod.name).cloned().unwrap_or_default();
                self.component_for_pod(pod, &usage).await?
            } else {
                // Without numbers the replica is healthy-unknown.
                placeholder_component(&pod.name, true)
            };
            components.push(component);
        }

        let desired_by_family = self.orchestrator.desired_replicas().await?;

        let mut families = Vec::new();
        for family in FAMILIES {
            let mut buckets = family_buckets(family, &components);
            let desired = desired_by_family
                .get(family)
                .copied()
                .unwrap_or_else(|| buckets.len());
            buckets.pad_to_desired(family, desired);
            if buckets.is_empty() {
                continue;
            }
            families.push(ComponentFamily {
                name: family.to_string(),
                status: buckets.rollup_status(),
                ports: family_ports(family, &ports_by_instance),
                desired_replicas: desired,
                actual_replicas: buckets.len(),
                hosts: family_hosts(family, &host_by_instance),
                components: buckets,
            });
        }

        Ok(SystemSnapshot {
            families,
            metrics_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use switchyard_health::Status;

    const DF_OUTPUT: &str = "Filesystem     1K-blocks    Used Available Use% Mounted on\n\
                             /dev/sda1       10485760 9437184   1048576  90% /data\n";

    struct FakeOrchestrator {
        pods: Vec<PodSpec>,
        usage: Result<Vec<PodUsage>>,
        desired: HashMap<String, usize>,
    }

    #[async_trait]
    impl Orchestrator for FakeOrchestrator {
        async fn list_pods(&self) -> Result<Vec<PodSpec>> {
            Ok(self.pods.clone())
        }

        async fn pod_usage(&self) -> Result<Vec<PodUsage>> {
            match &self.usage {
                Ok(usage) => Ok(usage.clone()),
                Err(_) => Err(Error::Orchestrator("metrics api gone".to_string())),
            }
        }

        async fn exec_in_pod(&self, _pod: &str, _container: &str, _cmd: &[&str]) -> Result<String> {
            Ok(DF_OUTPUT.to_string())
        }

        async fn desired_replicas(&self) -> Result<HashMap<String, usize>> {
            Ok(self.desired.clone())
        }
    }

    fn broker_pod(index: usize, node: &str) -> PodSpec {
        PodSpec {
            name: format!("broker-{index}"),
            node: node.to_string(),
            ports: vec![6666, 9000],
            containers: vec![ContainerSpec {
                name: "broker".to_string(),
                cpu_request_millis: 1000,
                memory_limit_bytes: 1_073_741_824,
                storage_mount: Some("/data".to_string()),
            }],
        }
    }

    fn broker_usage(index: usize, cpu: i64, memory: i64) -> PodUsage {
        PodUsage {
            pod: format!("broker-{index}"),
            containers: vec![ContainerUsage {
                name: "broker".to_string(),
                cpu_used_millis: cpu,
                memory_used_bytes: memory,
            }],
        }
    }

    #[test]
    fn df_kblock_output_parses_to_bytes() {
        let (total, used) = parse_df_kblocks(DF_OUTPUT).unwrap();
        assert_eq!(total, 10_485_760.0 * 1024.0);
        assert_eq!(used, 9_437_184.0 * 1024.0);
        assert!(parse_df_kblocks("Filesystem\n").is_err());
    }

    #[test]
    fn df_human_output_parses_gigabytes() {
        let output = "Filesystem  Size  Used Avail Use% Mounted on\n\
                      overlay      58G   12G   44G  22% /\n";
        let (total, used, pct) = parse_df_human(output).unwrap();
        assert_eq!(total, 58.0 * 1024.0 * 1024.0 * 1024.0);
        assert_eq!(used, 12.0 * 1024.0 * 1024.0 * 1024.0);
        assert_eq!(pct, 22);
    }

    #[tokio::test]
    async fn pods_classify_from_metrics_and_df() {
        let probe = OrchestratorProbe::new(FakeOrchestrator {
            pods: vec![broker_pod(0, "node-a"), broker_pod(1, "node-b")],
            usage: Ok(vec![
                broker_usage(0, 200, 214_748_364),
                broker_usage(1, 990, 1_063_004_405),
            ]),
            desired: HashMap::from([("broker".to_string(), 2)]),
        });

        let snapshot = probe.system_components().await.unwrap();
        assert!(snapshot.metrics_enabled);
        assert_eq!(snapshot.families.len(), 1);

        let family = &snapshot.families[0];
        assert_eq!(family.name, "broker");
        assert_eq!(family.actual_replicas, 2);
        assert_eq!(family.desired_replicas, 2);
        assert_eq!(family.ports, vec![6666, 9000]);
        assert_eq!(family.hosts, vec!["node-a", "node-b"]);

        // broker-0: cpu 20%, mem 20%, storage 90% -> risky.
        assert_eq!(family.components.risky_components.len(), 1);
        let risky = &family.components.risky_components[0];
        assert_eq!(risky.name, "broker-0");
        assert_eq!(risky.cpu.percentage, 20);
        assert_eq!(risky.storage.percentage, 90);

        // broker-1: cpu 99%, mem 98% -> dangerous.
        assert_eq!(family.components.dangerous_components.len(), 1);
        assert_eq!(family.status, Status::Dangerous);
    }

    #[tokio::test]
    async fn missing_replicas_pad_the_unhealthy_bucket() {
        let probe = OrchestratorProbe::new(FakeOrchestrator {
            pods: vec![broker_pod(0, "node-a")],
            usage: Ok(vec![broker_usage(0, 100, 1000)]),
            desired: HashMap::from([("broker".to_string(), 3)]),
        });

        let snapshot = probe.system_components().await.unwrap();
        let family = &snapshot.families[0];
        assert_eq!(family.actual_replicas, 3);
        assert_eq!(family.components.unhealthy_components.len(), 2);
        assert!(family
            .components
            .unhealthy_components
            .iter()
            .all(|component| component.name == "broker" && !component.healthy));
        assert_eq!(family.status, Status::Unhealthy);
    }

    #[tokio::test]
    async fn absent_metrics_api_degrades_to_healthy_unknown() {
        let probe = OrchestratorProbe::new(FakeOrchestrator {
            pods: vec![broker_pod(0, "node-a")],
            usage: Err(Error::Orchestrator("metrics api gone".to_string())),
            desired: HashMap::new(),
        });

        let snapshot = probe.system_components().await.unwrap();
        assert!(!snapshot.metrics_enabled);
        let family = &snapshot.families[0];
        assert_eq!(family.components.healthy_components.len(), 1);
        let component = &family.components.healthy_components[0];
        assert_eq!(component.cpu, Stat::default());
        assert!(component.healthy);
    }
}
