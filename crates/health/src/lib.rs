//! Health classification for Switchyard broker replicas and sidecars.
//!
//! CPU, memory and storage percentages map onto a four-level status;
//! components bucket by status, pad out to the desired replica count with
//! synthetic unhealthy placeholders and roll up to the worst non-empty
//! bucket.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use serde::{Deserialize, Serialize};

/// Four-level component status, ordered from best to worst.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// All dimensions within normal bounds.
    Healthy,
    /// At least one dimension above 84%.
    Risky,
    /// At least one dimension above 94%.
    Dangerous,
    /// At least one dimension above 99%, or the replica is missing.
    Unhealthy,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Healthy => "healthy",
            Self::Risky => "risky",
            Self::Dangerous => "dangerous",
            Self::Unhealthy => "unhealthy",
        };
        write!(f, "{label}")
    }
}

/// Classifies one replica from its resource percentages.
///
/// Thresholds are checked worst first, so the highest matching severity
/// wins.
#[must_use]
pub const fn classify(cpu: i32, memory: i32, storage: i32) -> Status {
    if cpu > 99 || memory > 99 || storage > 99 {
        Status::Unhealthy
    } else if cpu > 94 || memory > 94 || storage > 94 {
        Status::Dangerous
    } else if cpu > 84 || memory > 84 || storage > 84 {
        Status::Risky
    } else {
        Status::Healthy
    }
}

/// Floors a percentage to two decimal places for display.
///
/// Very small positive values round up to 0.01 so active-but-tiny use never
/// displays as zero.
#[must_use]
pub fn shorten_float(value: f64) -> f64 {
    if value < 0.01 && value > 0.0 {
        return 0.01;
    }
    (value * 100.0).floor() / 100.0
}

/// One resource dimension of a component.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Stat {
    /// Capacity of the dimension, in its native unit.
    pub total: f64,
    /// Current use, same unit as `total`.
    pub current: f64,
    /// Whole-number utilisation, 0..=100.
    pub percentage: i32,
}

impl Stat {
    /// Builds a stat from capacity and use, deriving the percentage.
    #[must_use]
    pub fn from_usage(total: f64, current: f64) -> Self {
        let percentage = if total > 0.0 {
            ((current / total) * 100.0) as i32
        } else {
            0
        };
        Self {
            total: shorten_float(total),
            current: shorten_float(current),
            percentage,
        }
    }
}

/// One broker replica or sidecar instance with its classified status.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SysComponent {
    /// Instance name (pod or process).
    pub name: String,
    /// CPU dimension.
    pub cpu: Stat,
    /// Memory dimension.
    pub memory: Stat,
    /// Storage dimension.
    pub storage: Stat,
    /// Whether the instance is considered live.
    pub healthy: bool,
    /// Classified status.
    pub status: Status,
}

impl SysComponent {
    /// Builds a component, classifying it from its stats.
    #[must_use]
    pub fn classified(name: impl Into<String>, cpu: Stat, memory: Stat, storage: Stat) -> Self {
        let status = classify(cpu.percentage, memory.percentage, storage.percentage);
        Self {
            name: name.into(),
            cpu,
            memory,
            storage,
            healthy: status != Status::Unhealthy,
            status,
        }
    }
}

/// A synthetic zero-stat component standing in for a missing or unprobeable
/// replica.
#[must_use]
pub fn placeholder_component(name: &str, healthy: bool) -> SysComponent {
    let status = if healthy {
        Status::Healthy
    } else {
        Status::Unhealthy
    };
    SysComponent {
        name: name.to_string(),
        cpu: Stat::default(),
        memory: Stat::default(),
        storage: Stat::default(),
        healthy,
        status,
    }
}

/// Components partitioned by status; each component appears in exactly one
/// list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ComponentBuckets {
    /// Components classified unhealthy, plus padding placeholders.
    pub unhealthy_components: Vec<SysComponent>,
    /// Components classified dangerous.
    pub dangerous_components: Vec<SysComponent>,
    /// Components classified risky.
    pub risky_components: Vec<SysComponent>,
    /// Components classified healthy.
    pub healthy_components: Vec<SysComponent>,
}

impl ComponentBuckets {
    /// Buckets each component by its status.
    #[must_use]
    pub fn from_components<I>(components: I) -> Self
    where
        I: IntoIterator<Item = SysComponent>,
    {
        let mut buckets = Self::default();
        for component in components {
            buckets.push(component);
        }
        buckets
    }

    /// Adds one component to the bucket its status selects.
    pub fn push(&mut self, component: SysComponent) {
        match component.status {
            Status::Unhealthy => self.unhealthy_components.push(component),
            Status::Dangerous => self.dangerous_components.push(component),
            Status::Risky => self.risky_components.push(component),
            Status::Healthy => self.healthy_components.push(component),
        }
    }

    /// Number of components across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.unhealthy_components.len()
            + self.dangerous_components.len()
            + self.risky_components.len()
            + self.healthy_components.len()
    }

    /// Whether every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pads the unhealthy bucket with placeholders until `desired` replicas
    /// are accounted for.
    pub fn pad_to_desired(&mut self, name: &str, desired: usize) {
        let missing = desired.saturating_sub(self.len());
        for _ in 0..missing {
            self.unhealthy_components
                .push(placeholder_component(name, false));
        }
    }

    /// The highest-severity status with a non-empty bucket.
    #[must_use]
    pub fn rollup_status(&self) -> Status {
        if !self.unhealthy_components.is_empty() {
            Status::Unhealthy
        } else if !self.dangerous_components.is_empty() {
            Status::Dangerous
        } else if !self.risky_components.is_empty() {
            Status::Risky
        } else {
            Status::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_checked_worst_first() {
        assert_eq!(classify(85, 10, 10), Status::Risky);
        assert_eq!(classify(95, 10, 10), Status::Dangerous);
        assert_eq!(classify(100, 10, 10), Status::Unhealthy);
        assert_eq!(classify(10, 10, 10), Status::Healthy);

        // Boundary values sit below their threshold.
        assert_eq!(classify(84, 84, 84), Status::Healthy);
        assert_eq!(classify(94, 0, 0), Status::Risky);
        assert_eq!(classify(99, 0, 0), Status::Dangerous);
    }

    #[test]
    fn any_dimension_can_raise_the_status() {
        assert_eq!(classify(0, 97, 0), Status::Dangerous);
        assert_eq!(classify(0, 0, 100), Status::Unhealthy);
    }

    #[test]
    fn scaling_a_dimension_down_never_worsens_the_status() {
        let base = classify(100, 96, 86);
        assert_eq!(base, Status::Unhealthy);
        assert!(classify(96, 96, 86) <= base);
        assert!(classify(0, 96, 86) <= classify(96, 96, 86));
        assert!(classify(0, 0, 86) <= classify(0, 96, 86));
    }

    #[test]
    fn tiny_positive_percentages_round_up_to_a_visible_value() {
        assert_eq!(shorten_float(0.005), 0.01);
        assert_eq!(shorten_float(0.0), 0.0);
        assert_eq!(shorten_float(12.349), 12.34);
        assert_eq!(shorten_float(-0.004), -0.01);
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&Status::Dangerous).unwrap(),
            "\"dangerous\""
        );
        assert_eq!(Status::Unhealthy.to_string(), "unhealthy");
    }

    #[test]
    fn missing_replicas_pad_as_synthetic_unhealthy() {
        let mut buckets = ComponentBuckets::from_components(vec![
            placeholder_component("broker-0", true),
            placeholder_component("broker-1", true),
        ]);
        buckets.pad_to_desired("broker", 3);

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets.unhealthy_components.len(), 1);
        let padded = &buckets.unhealthy_components[0];
        assert_eq!(padded.name, "broker");
        assert_eq!(padded.cpu, Stat::default());
        assert!(!padded.healthy);
        assert_eq!(buckets.rollup_status(), Status::Unhealthy);
    }

    #[test]
    fn rollup_is_the_worst_non_empty_bucket() {
        let healthy = SysComponent::classified("a", Stat::default(), Stat::default(), Stat::default());
        let risky = SysComponent::classified(
            "b",
            Stat {
                percentage: 90,
                ..Stat::default()
            },
            Stat::default(),
            Stat::default(),
        );
        let buckets = ComponentBuckets::from_components(vec![healthy.clone(), risky]);
        assert_eq!(buckets.rollup_status(), Status::Risky);

        let only_healthy = ComponentBuckets::from_components(vec![healthy]);
        assert_eq!(only_healthy.rollup_status(), Status::Healthy);
        assert_eq!(ComponentBuckets::default().rollup_status(), Status::Healthy);
    }

    #[test]
    fn rollup_matches_worst_individual_status() {
        let components = vec![
            SysComponent::classified(
                "a",
                Stat {
                    percentage: 96,
                    ..Stat::default()
                },
                Stat::default(),
                Stat::default(),
            ),
            SysComponent::classified(
                "b",
                Stat {
                    percentage: 88,
                    ..Stat::default()
                },
                Stat::default(),
                Stat::default(),
            ),
        ];
        let worst = components
            .iter()
            .map(|component| component.status)
            .max()
            .unwrap();
        let buckets = ComponentBuckets::from_components(components);
        assert_eq!(buckets.rollup_status(), worst);
    }

    #[test]
    fn stats_derive_percentages_from_usage() {
        let stat = Stat::from_usage(200.0, 50.0);
        assert_eq!(stat.percentage, 25);
        assert_eq!(Stat::from_usage(0.0, 10.0).percentage, 0);
    }
}
