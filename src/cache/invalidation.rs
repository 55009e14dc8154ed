//! Cache invalidation service.
//!
//! Write paths call one of the convenience methods below after a successful
//! mutation. Invalidation is synchronous and best-effort: it happens inside
//! the same request lifecycle as the write, and removes the collection
//! listing plus any parent-scoped listings the write affected.

use std::sync::Arc;

use metrics::counter;
use tracing::debug;
use uuid::Uuid;

use super::config::CacheConfig;
use super::store::ResponseStore;

const INVENTORY_PREFIX: &str = "/api/v1/inventory";
const PONDS_PREFIX: &str = "/api/v1/ponds";

/// Removes response-cache entries affected by writes.
pub struct CacheInvalidator {
    config: CacheConfig,
    store: Arc<ResponseStore>,
}

impl CacheInvalidator {
    pub fn new(config: CacheConfig, store: Arc<ResponseStore>) -> Self {
        Self { config, store }
    }

    /// An inventory item or ledger row changed: every inventory read
    /// (listings, per-item views, the aggregated projection) is stale.
    pub fn inventory_changed(&self) {
        self.invalidate_prefix(INVENTORY_PREFIX);
    }

    /// A pond changed: pond listings and everything scoped under a pond.
    pub fn pond_changed(&self) {
        self.invalidate_prefix(PONDS_PREFIX);
    }

    /// A reading was recorded under `pond_id`: only that pond's readings
    /// listing is affected.
    pub fn readings_changed(&self, pond_id: Uuid) {
        self.invalidate_prefix(&format!("{PONDS_PREFIX}/{pond_id}/readings"));
    }

    /// Admin/maintenance path: drop every entry unconditionally.
    pub fn purge_all(&self) {
        if !self.config.enabled {
            return;
        }
        self.store.invalidate_all();
        debug!(scope = "all", "cache purged");
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn invalidate_prefix(&self, prefix: &str) {
        if !self.config.enabled {
            debug!(prefix, "cache invalidation skipped: cache disabled");
            return;
        }

        let removed = self.store.invalidate_prefix(prefix);
        counter!("stagno_cache_invalidated_total").increment(removed as u64);
        debug!(prefix, removed, "cache entries invalidated");
    }
}
