//! Environment-driven component wiring
//!
//! The schema bucket lives in S3 (or anything S3-compatible) in production
//! and in process memory for local runs. `STORAGE_BACKEND` picks which.

use crate::{Error, Result};
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Where schema documents are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    S3,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "memory" => Ok(Self::Memory),
            "s3" => Ok(Self::S3),
            other => Err(Error::Config(format!(
                "STORAGE_BACKEND '{other}' is not supported, expected 'memory' or 's3'"
            ))),
        }
    }
}

pub struct ComponentFactory;

impl ComponentFactory {
    /// Object store for the schema bucket.
    ///
    /// `STORAGE_BACKEND` defaults to `memory`. For `s3` the client takes the
    /// usual `AWS_*` variables; `S3_REGION` and `S3_ENDPOINT` override region
    /// and endpoint, the latter also allowing plain HTTP for MinIO.
    pub fn create_object_store(bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let backend: StorageBackend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_default()
            .parse()?;
        Self::object_store_for(backend, bucket)
    }

    fn object_store_for(backend: StorageBackend, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        match backend {
            StorageBackend::Memory => {
                info!("Schema store is in-memory; nothing persists across restarts");
                Ok(Arc::new(InMemory::new()))
            }
            StorageBackend::S3 => Ok(Arc::new(Self::s3(bucket)?)),
        }
    }

    fn s3(bucket: &str) -> Result<object_store::aws::AmazonS3> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(Error::Config(
                "a schema bucket is required for the s3 backend".to_string(),
            ));
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Ok(region) = std::env::var("S3_REGION") {
            builder = builder.with_region(region);
        }
        let endpoint = std::env::var("S3_ENDPOINT").ok();
        if let Some(endpoint) = &endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }

        info!(
            bucket,
            endpoint = endpoint.as_deref().unwrap_or("aws"),
            "Schema store is S3"
        );
        builder
            .build()
            .map_err(|e| Error::Config(format!("cannot build S3 client for '{bucket}': {e}")))
    }
}
