//! Remote object-store backend.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;

use super::{SourceError, SourceReader, WorkingDir};
use crate::config::schema::S3Config;

/// Reads the document from an object store. The object key is the configured
/// path string as-is; the working directory plays no part.
#[derive(Clone)]
pub struct ObjectStoreSource {
    store: Arc<dyn ObjectStore>,
    name: &'static str,
}

impl ObjectStoreSource {
    /// Wrap an already-built store.
    pub fn new(store: Arc<dyn ObjectStore>, name: &'static str) -> Self {
        Self { store, name }
    }

    /// Build an S3 (or S3-compatible) store from operator configuration.
    pub fn s3(cfg: &S3Config) -> Result<Self, SourceError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&cfg.bucket_name)
            .with_region(&cfg.region);

        if let Some(ref key) = cfg.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(ref secret) = cfg.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(ref endpoint) = cfg.endpoint {
            if !endpoint.is_empty() {
                let scheme = if cfg.insecure { "http" } else { "https" };
                let endpoint_url = if endpoint.contains("://") {
                    endpoint.clone()
                } else {
                    format!("{scheme}://{endpoint}")
                };
                builder = builder
                    .with_endpoint(&endpoint_url)
                    .with_allow_http(endpoint_url.starts_with("http://"));
            }
        }

        let store = builder
            .build()
            .map_err(|e| SourceError::Backend(e.to_string()))?;

        tracing::info!(
            bucket = %cfg.bucket_name,
            endpoint = ?cfg.endpoint,
            "Runtime config S3 backend configured"
        );
        Ok(Self::new(Arc::new(store), "s3"))
    }
}

#[async_trait]
impl SourceReader for ObjectStoreSource {
    async fn open(&self, path: &str, _working_dir: &WorkingDir) -> Result<Bytes, SourceError> {
        let location = ObjectPath::from(path);
        let result = self.store.get(&location).await.map_err(|e| map_store_error(path, e))?;
        result.bytes().await.map_err(|e| map_store_error(path, e))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn map_store_error(path: &str, err: object_store::Error) -> SourceError {
    match err {
        object_store::Error::NotFound { .. } => SourceError::NotFound {
            path: path.to_string(),
        },
        other => SourceError::Transient {
            path: path.to_string(),
            reason: other.to_string(),
        },
    }
}
