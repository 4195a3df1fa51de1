//! Process-wide cache of network-discovered metadata

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::provider::MetadataProvider;
use super::types::InstanceDiscoveryMetadataEntry;
use crate::error::Result;

/// Host → metadata learned from successful network discovery
///
/// Cloning yields a handle to the same underlying map, so one instance can be
/// shared by every client in a process. Entries never expire; only
/// [`clear`](Self::clear) removes them. Writes are idempotent, so concurrent
/// discoveries of the same host need no coordination.
#[derive(Debug, Clone, Default)]
pub struct NetworkCacheMetadataProvider {
    entries: Arc<DashMap<String, Arc<InstanceDiscoveryMetadataEntry>>>,
}

impl NetworkCacheMetadataProvider {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entry for `host`
    #[must_use]
    pub fn get(&self, host: &str) -> Option<Arc<InstanceDiscoveryMetadataEntry>> {
        self.entries
            .get(&host.to_lowercase())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Cache `entry` under `host`
    pub fn insert(&self, host: &str, entry: Arc<InstanceDiscoveryMetadataEntry>) {
        self.entries.insert(host.to_lowercase(), entry);
    }

    /// Cache `entry` under every one of its aliases
    pub fn insert_for_aliases(&self, entry: &Arc<InstanceDiscoveryMetadataEntry>) {
        debug!(
            "Caching instance metadata for aliases {:?} (preferred network: {})",
            entry.aliases(),
            entry.preferred_network()
        );
        for alias in entry.aliases() {
            self.entries.insert(alias.clone(), Arc::clone(entry));
        }
    }

    /// Number of cached hosts
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached hosts
    #[must_use]
    pub fn hosts(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl MetadataProvider for NetworkCacheMetadataProvider {
    fn name(&self) -> &'static str {
        "network-cache"
    }

    fn try_get_entry(
        &self,
        host: &str,
        _known_environment_aliases: &[String],
    ) -> Result<Option<Arc<InstanceDiscoveryMetadataEntry>>> {
        Ok(self.get(host))
    }
}
