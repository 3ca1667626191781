//! Error types for the storage crate.

use thiserror::Error;

/// Errors that can occur reading or writing partitions and objects.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bucket URI \"{0}\": must start with s3://")]
    InvalidUri(String),

    #[error("Failed to create S3 client: {0}")]
    Client(String),

    #[error("Object storage {op} failed for {path}: {reason}")]
    ObjectStore {
        op: &'static str,
        path: String,
        reason: String,
    },

    #[error("Invalid NetCDF partition {path}: {reason}")]
    NetCdf { path: String, reason: String },
}

impl StorageError {
    pub fn object_store(op: &'static str, path: impl Into<String>, err: impl ToString) -> Self {
        Self::ObjectStore {
            op,
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn netcdf(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::NetCdf {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
