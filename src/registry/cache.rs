//! Schema text cache backends

use crate::Result;

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Key → schema text store consulted before the remote schema store
///
/// An `Err` from a backend means the backend itself misbehaved; "not cached"
/// is `Ok(None)`.
#[async_trait]
pub trait SchemaCache: Send + Sync {
    /// Look up a live entry
    async fn get(&self, identifier: &str) -> Result<Option<Arc<str>>>;

    /// Store `schema` under `identifier`, replacing any previous entry
    async fn insert(&self, identifier: &str, schema: Arc<str>) -> Result<()>;
}

/// In-process TTL cache backed by moka
///
/// Entries expire `ttl` after insertion; expired entries are never returned.
pub struct MokaSchemaCache {
    inner: Cache<String, Arc<str>>,
}

impl MokaSchemaCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Approximate number of live entries
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    /// Drop the entry for `identifier`, forcing the next lookup to miss
    pub async fn invalidate(&self, identifier: &str) {
        self.inner.invalidate(identifier).await;
    }
}

#[async_trait]
impl SchemaCache for MokaSchemaCache {
    async fn get(&self, identifier: &str) -> Result<Option<Arc<str>>> {
        Ok(self.inner.get(identifier).await)
    }

    async fn insert(&self, identifier: &str, schema: Arc<str>) -> Result<()> {
        self.inner.insert(identifier.to_string(), schema).await;
        Ok(())
    }
}
