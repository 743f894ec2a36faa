//! Helper crate for querying the broker's HTTP monitoring endpoints.
//!
//! The broker exposes the usual server-info endpoint on its monitoring
//! port; the control plane reads the server version and the route count
//! (available replicas = routes + 1) through it.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subset of the broker's `/varz` payload the control plane consumes.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Varz {
    /// Broker server version.
    pub version: String,
    /// Number of routes to sibling brokers.
    #[serde(default)]
    pub routes: u64,
}

/// Server-info queries the control plane consumes.
#[async_trait]
pub trait ClusterTelemetry: Send + Sync {
    /// Fetches the broker's server information.
    async fn varz(&self) -> Result<Varz>;
}

/// Helper for querying the broker's HTTP monitoring endpoints.
#[derive(Clone, Debug)]
pub struct BrokerMonitor {
    client: reqwest::Client,
    base_url: String,
}

impl BrokerMonitor {
    /// Creates a monitor for a broker's monitoring port on localhost.
    #[must_use]
    pub fn new(monitoring_port: u16) -> Self {
        Self::with_base_url(format!("http://localhost:{monitoring_port}"))
    }

    /// Creates a monitor against an explicit base URL.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ClusterTelemetry for BrokerMonitor {
    async fn varz(&self) -> Result<Varz> {
        let body = self
            .client
            .get(format!("{}/varz", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let varz: Varz = serde_json::from_str(&body)?;
        Ok(varz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varz_tolerates_a_missing_route_count() {
        let varz: Varz = serde_json::from_str(r#"{"version":"2.10.1"}"#).unwrap();
        assert_eq!(varz.version, "2.10.1");
        assert_eq!(varz.routes, 0);

        let varz: Varz =
            serde_json::from_str(r#"{"version":"2.10.1","routes":2,"cpu":12.5}"#).unwrap();
        assert_eq!(varz.routes, 2);
    }
}
