//! Object storage interface for partitions and rasters (S3 compatible).

use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{Result, StorageError};

/// Connection settings shared by every bucket.
///
/// Unset credentials and endpoint fall back to the standard `AWS_*`
/// environment of the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// S3-compatible endpoint URL; `None` for AWS itself
    pub endpoint: Option<String>,
    /// Region (use "us-east-1" for MinIO)
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Allow HTTP (for local MinIO)
    #[serde(default)]
    pub allow_http: bool,
}

/// Object storage client bound to one bucket.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Create an S3 client for `bucket`.
    pub fn new(config: &ObjectStorageConfig, bucket: &str) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(key) = &config.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Client(e.to_string()))?;

        Ok(Self::from_store(Arc::new(store), bucket))
    }

    /// Wrap an existing store, e.g. `object_store::memory::InMemory`.
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Write bytes to a key in the bucket.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, key = %key))]
    pub async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let location = Path::from(key);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| StorageError::object_store("put", key, e))?;

        Ok(())
    }

    /// Read bytes from a key.
    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let location = Path::from(key);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| StorageError::object_store("get", key, e))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::object_store("get", key, e))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let location = Path::from(key);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::object_store("head", key, e)),
        }
    }

    /// List object keys under a prefix (the whole bucket when empty).
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        use futures::TryStreamExt;

        let prefix_path = Path::from(prefix);
        let mut keys = Vec::new();

        let mut stream = if prefix.is_empty() {
            self.store.list(None)
        } else {
            self.store.list(Some(&prefix_path))
        };
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| StorageError::object_store("list", prefix, e))?
        {
            keys.push(meta.location.to_string());
        }

        Ok(keys)
    }

    /// Upload a local file.
    pub async fn upload_file(&self, local: &FsPath, key: &str) -> Result<()> {
        let data = tokio::fs::read(local).await?;
        self.put(key, Bytes::from(data)).await
    }

    /// Download an object into a local file, creating parent directories.
    pub async fn download_file(&self, key: &str, local: &FsPath) -> Result<()> {
        let data = self.get(key).await?;
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local, &data).await?;
        Ok(())
    }
}
