//! Schema registry
//!
//! Resolves an event-type identifier to the schema text its payloads were
//! written with. Lookups go to a TTL cache first and fall back to the remote
//! schema store at `{prefix}/{identifier}.json` on a miss.
//!
//! ## Cache policy
//!
//! - A hit never touches the remote store.
//! - A miss fetches, stores the result with the configured TTL, and returns it.
//! - A failed fetch is surfaced and nothing is cached.
//! - A cache backend error is treated as a miss (logged and counted), so a
//!   degraded cache slows resolution down instead of failing it.
//! - Concurrent misses for one identifier may each fetch; there is no
//!   single-flight barrier.

mod cache;
mod store;
mod telemetry;

pub use cache::{MokaSchemaCache, SchemaCache};
pub use store::{ObjectStoreSchemaStore, SchemaStore};

use crate::{Error, Result};

use object_store::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Schema registry configuration
#[derive(Debug, Clone)]
pub struct SchemaRegistryConfig {
    /// Bucket holding schema documents
    pub bucket: String,
    /// Object key prefix; documents live at `{prefix}/{identifier}.json`
    pub prefix: String,
    /// How long a fetched schema stays cached
    pub ttl: Duration,
    /// Upper bound on cached identifiers
    pub max_entries: u64,
    /// Deadline for one remote fetch
    pub fetch_timeout: Duration,
}

impl Default for SchemaRegistryConfig {
    fn default() -> Self {
        Self {
            bucket: "event-schemas".to_string(),
            prefix: "schemas".to_string(),
            ttl: Duration::from_secs(10 * 60),
            max_entries: 10_000,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

/// Object path of the schema document for `identifier`
pub fn schema_path(prefix: &str, identifier: &str) -> Path {
    Path::from(format!("{}/{}.json", prefix, identifier))
}

/// Snapshot of resolver counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub hits: u64,
    pub misses: u64,
    pub cache_errors: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
}

#[derive(Default)]
struct RegistryStatistics {
    hits: AtomicU64,
    misses: AtomicU64,
    cache_errors: AtomicU64,
    fetches: AtomicU64,
    fetch_failures: AtomicU64,
}

/// Cached event-type → schema text resolution
pub struct SchemaResolver {
    cache: Arc<dyn SchemaCache>,
    store: Arc<dyn SchemaStore>,
    prefix: String,
    fetch_timeout: Duration,
    stats: RegistryStatistics,
}

impl SchemaResolver {
    /// Resolver with an in-process moka cache sized from `config`
    pub fn new(config: &SchemaRegistryConfig, store: Arc<dyn SchemaStore>) -> Self {
        let cache = Arc::new(MokaSchemaCache::new(config.ttl, config.max_entries));
        Self::with_cache(cache, store, config)
    }

    /// Resolver over a caller-provided cache backend
    pub fn with_cache(
        cache: Arc<dyn SchemaCache>,
        store: Arc<dyn SchemaStore>,
        config: &SchemaRegistryConfig,
    ) -> Self {
        Self {
            cache,
            store,
            prefix: config.prefix.trim_end_matches('/').to_string(),
            fetch_timeout: config.fetch_timeout,
            stats: RegistryStatistics::default(),
        }
    }

    /// Schema text for `identifier`
    pub async fn resolve(&self, identifier: &str) -> Result<Arc<str>> {
        match self.cache.get(identifier).await {
            Ok(Some(schema)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                telemetry::record_lookup("hit");
                return Ok(schema);
            }
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                telemetry::record_lookup("miss");
                debug!(event_type = identifier, "Schema cache miss");
            }
            Err(e) => {
                self.stats.cache_errors.fetch_add(1, Ordering::Relaxed);
                telemetry::record_lookup("error");
                warn!(
                    event_type = identifier,
                    error = %e,
                    "Schema cache lookup failed, falling back to schema store"
                );
            }
        }

        let schema = self.fetch(identifier).await?;

        if let Err(e) = self.cache.insert(identifier, schema.clone()).await {
            self.stats.cache_errors.fetch_add(1, Ordering::Relaxed);
            telemetry::record_cache_write_failure();
            warn!(event_type = identifier, error = %e, "Failed to cache fetched schema");
        }

        Ok(schema)
    }

    async fn fetch(&self, identifier: &str) -> Result<Arc<str>> {
        let path = schema_path(&self.prefix, identifier);
        self.stats.fetches.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let fetched = tokio::time::timeout(self.fetch_timeout, self.store.fetch(&path)).await;
        let elapsed = start.elapsed().as_secs_f64();

        let bytes = match fetched {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(source)) => {
                self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                telemetry::record_fetch("error", elapsed);
                return Err(Error::Fetch {
                    path: path.to_string(),
                    source,
                });
            }
            Err(_) => {
                self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                telemetry::record_fetch("timeout", elapsed);
                return Err(Error::Timeout {
                    operation: "schema fetch",
                });
            }
        };
        telemetry::record_fetch("ok", elapsed);

        let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
            Error::Decode(format!("schema document '{}' is not UTF-8: {}", path, e))
        })?;
        debug!(event_type = identifier, path = %path, bytes = text.len(), "Fetched schema");

        Ok(Arc::from(text))
    }

    /// Counter snapshot
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            cache_errors: self.stats.cache_errors.load(Ordering::Relaxed),
            fetches: self.stats.fetches.load(Ordering::Relaxed),
            fetch_failures: self.stats.fetch_failures.load(Ordering::Relaxed),
        }
    }
}
