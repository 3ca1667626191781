//! Resolving bucket names to storage clients.

use object_store::memory::InMemory;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, StorageError};
use crate::object_store::{ObjectStorage, ObjectStorageConfig};

/// Capability to open a client for a named bucket.
pub trait BucketConnector: Send + Sync {
    fn connect(&self, bucket: &str) -> Result<Arc<ObjectStorage>>;
}

/// Opens S3 clients with shared connection settings.
pub struct S3Connector {
    config: ObjectStorageConfig,
}

impl S3Connector {
    pub fn new(config: ObjectStorageConfig) -> Self {
        Self { config }
    }
}

impl BucketConnector for S3Connector {
    fn connect(&self, bucket: &str) -> Result<Arc<ObjectStorage>> {
        Ok(Arc::new(ObjectStorage::new(&self.config, bucket)?))
    }
}

/// Process-local buckets; the same name always yields the same store.
#[derive(Default)]
pub struct InMemoryConnector {
    buckets: Mutex<HashMap<String, Arc<ObjectStorage>>>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketConnector for InMemoryConnector {
    fn connect(&self, bucket: &str) -> Result<Arc<ObjectStorage>> {
        let mut buckets = self
            .buckets
            .lock()
            .map_err(|e| StorageError::Client(e.to_string()))?;
        let storage = buckets
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(ObjectStorage::from_store(Arc::new(InMemory::new()), bucket)));
        Ok(Arc::clone(storage))
    }
}
