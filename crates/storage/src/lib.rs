//! Storage for ICON-2I partitions and artifacts.
//!
//! Provides:
//! - Object storage (S3 or in-memory) behind [`BucketConnector`]
//! - NetCDF encoding of date partitions
//! - [`PartitionStore`] for existence checks, writes and reads of date partitions

pub mod connector;
pub mod error;
pub mod netcdf_file;
pub mod object_store;
pub mod partition;
pub mod uri;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig};
pub use connector::{BucketConnector, InMemoryConnector, S3Connector};
pub use error::{Result, StorageError};
pub use netcdf_file::{read_partition, write_partition, TIME_UNITS};
pub use partition::{FileRef, PartitionStore};
pub use uri::{S3Uri, S3_SCHEME};
