//! Persisting and loading date partitions, locally or in a bucket.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use grid_processor::DatePartition;
use icon_common::dataset::partition_filename;
use icon_common::Variable;

use crate::connector::BucketConnector;
use crate::error::Result;
use crate::netcdf_file::{read_partition, write_partition};
use crate::uri::S3Uri;

/// Where a persisted file lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileRef {
    Local(PathBuf),
    Remote(S3Uri),
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRef::Local(path) => write!(f, "{}", path.display()),
            FileRef::Remote(uri) => write!(f, "{}", uri),
        }
    }
}

impl Serialize for FileRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reads and writes partition files through a [`BucketConnector`].
#[derive(Clone)]
pub struct PartitionStore {
    connector: Arc<dyn BucketConnector>,
}

impl PartitionStore {
    pub fn new(connector: Arc<dyn BucketConnector>) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &Arc<dyn BucketConnector> {
        &self.connector
    }

    /// File names present directly under a bucket location.
    #[instrument(skip(self), fields(location = %location))]
    pub async fn list_names(&self, location: &S3Uri) -> Result<HashSet<String>> {
        let storage = self.connector.connect(&location.bucket)?;
        let keys = storage.list(&location.prefix).await?;
        let names: HashSet<String> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(&location.key("")))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect();
        debug!(count = names.len(), "Listed location");
        Ok(names)
    }

    /// Whether the partition of `variable` on `date` exists at `location`.
    pub async fn exists(&self, variable: Variable, date: NaiveDate, location: &S3Uri) -> Result<bool> {
        let names = self.list_names(location).await?;
        Ok(names.contains(&partition_filename(variable, date)))
    }

    /// Dates among `dates` without a partition at `location`, using one listing.
    pub async fn missing_dates(
        &self,
        variable: Variable,
        dates: &[NaiveDate],
        location: &S3Uri,
    ) -> Result<Vec<NaiveDate>> {
        let names = self.list_names(location).await?;
        Ok(dates
            .iter()
            .copied()
            .filter(|&date| !names.contains(&partition_filename(variable, date)))
            .collect())
    }

    /// Reference to a partition stored at `location`.
    pub fn remote_ref(variable: Variable, date: NaiveDate, location: &S3Uri) -> FileRef {
        FileRef::Remote(location.join(&partition_filename(variable, date)))
    }

    /// Write a partition as NetCDF into `local_dir`, then upload it when a
    /// bucket is given.
    #[instrument(skip(self, partition), fields(key = %partition.key()))]
    pub async fn write(
        &self,
        partition: &DatePartition,
        local_dir: &Path,
        destination: Option<&S3Uri>,
    ) -> Result<FileRef> {
        tokio::fs::create_dir_all(local_dir).await?;
        let local = local_dir.join(partition.filename());
        write_partition(partition, &local)?;

        let reference = match destination {
            Some(location) => {
                let storage = self.connector.connect(&location.bucket)?;
                storage
                    .upload_file(&local, &location.key(&partition.filename()))
                    .await?;
                FileRef::Remote(location.join(&partition.filename()))
            }
            None => FileRef::Local(local),
        };

        info!(
            variable = %partition.variable,
            date = %partition.date,
            steps = partition.len(),
            reference = %reference,
            "Stored partition"
        );
        Ok(reference)
    }

    /// Load a partition, downloading remote files into `workspace` first.
    #[instrument(skip(self), fields(reference = %reference))]
    pub async fn read(&self, reference: &FileRef, workspace: &Path) -> Result<DatePartition> {
        let local = match reference {
            FileRef::Local(path) => path.clone(),
            FileRef::Remote(uri) => {
                let local = workspace.join(uri.file_name());
                let storage = self.connector.connect(&uri.bucket)?;
                storage.download_file(&uri.prefix, &local).await?;
                local
            }
        };
        read_partition(&local)
    }
}
