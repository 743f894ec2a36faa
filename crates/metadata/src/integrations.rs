//! Process-wide cache of tenant integrations.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

/// Integration key for tiered storage.
pub const S3_INTEGRATION: &str = "s3";

/// Tenant-keyed set of configured integrations.
///
/// Populated at startup and refreshed by the integrations subsystem; the
/// monitoring core only reads it.
#[derive(Debug, Default)]
pub struct IntegrationsCache {
    by_tenant: RwLock<HashMap<String, HashSet<String>>>,
}

impl IntegrationsCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a tenant's integration set.
    pub fn set_tenant<I, S>(&self, tenant: impl Into<String>, integrations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = integrations.into_iter().map(Into::into).collect();
        self.by_tenant.write().insert(tenant.into(), set);
    }

    /// Whether a tenant has an integration configured.
    #[must_use]
    pub fn tenant_has(&self, tenant: &str, integration: &str) -> bool {
        self.by_tenant
            .read()
            .get(tenant)
            .is_some_and(|set| set.contains(integration))
    }
}
