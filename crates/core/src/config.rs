//! Environment-driven configuration, loaded once at startup.

use std::env;
use std::str::FromStr;

/// Connection settings for the relational metadata store.
#[derive(Clone, Debug)]
pub struct MetadataDbConfig {
    /// Hostname.
    pub host: String,
    /// Port.
    pub port: u16,
    /// User.
    pub user: String,
    /// Password.
    pub pass: String,
    /// Database name.
    pub name: String,
    /// Whether to connect over TLS.
    pub tls_enabled: bool,
    /// Client key path.
    pub tls_key: String,
    /// Client certificate path.
    pub tls_crt: String,
    /// CA certificate path.
    pub tls_ca: String,
}

/// Deployment configuration of the monitoring core.
#[derive(Clone, Debug)]
pub struct Config {
    /// Set in development environments.
    pub dev_env: String,
    /// Running against a local multi-node cluster.
    pub local_cluster_env: bool,
    /// Set when running under docker.
    pub docker_env: String,
    /// Namespace the product is deployed into.
    pub k8s_namespace: String,
    /// Retention of the syslog stream, in days.
    pub logs_retention_days: u32,
    /// Retention of dead-letter messages, in hours.
    pub poison_msgs_retention_hours: u32,
    /// Age after which messages offload to tiered storage, in seconds.
    pub tiered_storage_time_sec: u32,
    /// Metadata-store connection settings.
    pub metadata_db: MetadataDbConfig,
    /// Dashboard update interval in seconds; also the length of the
    /// aligned throughput window.
    pub ws_updates_interval_sec: usize,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str) -> bool {
    env::var(key).map(|value| value == "true").unwrap_or(false)
}

impl Config {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            dev_env: env_or("DEV_ENV", ""),
            local_cluster_env: env_bool("LOCAL_CLUSTER_ENV"),
            docker_env: env_or("DOCKER_ENV", ""),
            k8s_namespace: env_or("K8S_NAMESPACE", "switchyard"),
            logs_retention_days: env_parse("LOGS_RETENTION_DAYS", 3),
            poison_msgs_retention_hours: env_parse("POISON_MSGS_RETENTION_HOURS", 3),
            tiered_storage_time_sec: env_parse("TIERED_STORAGE_TIME_SEC", 8),
            metadata_db: MetadataDbConfig {
                host: env_or("METADATA_DB_HOST", "localhost"),
                port: env_parse("METADATA_DB_PORT", 5432),
                user: env_or("METADATA_DB_USER", "switchyard"),
                pass: env_or("METADATA_DB_PASS", ""),
                name: env_or("METADATA_DB_NAME", "switchyard"),
                tls_enabled: env_bool("METADATA_DB_TLS_ENABLED"),
                tls_key: env_or("METADATA_DB_TLS_KEY", ""),
                tls_crt: env_or("METADATA_DB_TLS_CRT", ""),
                tls_ca: env_or("METADATA_DB_TLS_CA", ""),
            },
            ws_updates_interval_sec: env_parse("WS_UPDATES_INTERVAL_SEC", 15),
        }
    }

    /// Whether the deployment runs under a cluster orchestrator.
    #[must_use]
    pub fn k8s_env(&self) -> bool {
        !(self.docker_env == "true" || self.local_cluster_env)
    }

    /// Length of the aligned throughput window.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.ws_updates_interval_sec
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dev_env: String::new(),
            local_cluster_env: false,
            docker_env: String::new(),
            k8s_namespace: "switchyard".to_string(),
            logs_retention_days: 3,
            poison_msgs_retention_hours: 3,
            tiered_storage_time_sec: 8,
            metadata_db: MetadataDbConfig {
                host: "localhost".to_string(),
                port: 5432,
                user: "switchyard".to_string(),
                pass: String::new(),
                name: "switchyard".to_string(),
                tls_enabled: false,
                tls_key: String::new(),
                tls_crt: String::new(),
                tls_ca: String::new(),
            },
            ws_updates_interval_sec: 15,
        }
    }
}
