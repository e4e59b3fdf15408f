//! Remote schema store

use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path;
use object_store::ObjectStore;
use std::fmt;
use std::sync::Arc;

/// Source of truth for schema documents
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Fetch the raw document stored at `path`
    async fn fetch(&self, path: &Path) -> object_store::Result<Bytes>;
}

/// [`SchemaStore`] over any object store (S3 in production, in-memory in dev)
pub struct ObjectStoreSchemaStore {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectStoreSchemaStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for ObjectStoreSchemaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreSchemaStore")
            .field("inner", &self.inner.to_string())
            .finish()
    }
}

#[async_trait]
impl SchemaStore for ObjectStoreSchemaStore {
    async fn fetch(&self, path: &Path) -> object_store::Result<Bytes> {
        self.inner.get(path).await?.bytes().await
    }
}
