//! Ingestion path: catalog, download, assembly, partitioning, storage.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use grib2_parser::GribDecoder;
use icon_common::{ForecastRun, Variable};
use storage::{FileRef, PartitionStore, S3Uri};

use crate::assembler::Assembler;
use crate::catalog::{filenames_for, ForecastCatalog};
use crate::error::Result;
use crate::fetch::RawFetcher;
use crate::partitioner::partition_by_date;

/// Options for one ingestion.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub variables: Vec<Variable>,
    /// Runs to ingest; `None` ingests every listed run.
    pub forecast_runs: Option<Vec<ForecastRun>>,
    /// Directory receiving the partition files.
    pub out_dir: PathBuf,
    /// Bucket location the partitions are uploaded to.
    pub bucket_destination: Option<S3Uri>,
}

/// One stored partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedPartition {
    pub variable: Variable,
    pub date: NaiveDate,
    #[serde(rename = "ref")]
    pub reference: FileRef,
}

/// Runs the ingestion path against injected collaborators.
pub struct Ingester {
    catalog: Arc<dyn ForecastCatalog>,
    fetcher: Arc<dyn RawFetcher>,
    decoder: Arc<dyn GribDecoder>,
    store: PartitionStore,
    /// Download directory for raw files.
    workspace: PathBuf,
}

impl Ingester {
    pub fn new(
        catalog: Arc<dyn ForecastCatalog>,
        fetcher: Arc<dyn RawFetcher>,
        decoder: Arc<dyn GribDecoder>,
        store: PartitionStore,
        workspace: PathBuf,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            decoder,
            store,
            workspace,
        }
    }

    pub fn store(&self) -> &PartitionStore {
        &self.store
    }

    pub fn workspace(&self) -> &PathBuf {
        &self.workspace
    }

    /// Filenames to download, oldest run first.
    ///
    /// Without requested runs every listed run is used. Requested runs
    /// missing from the listing are dropped.
    pub async fn resolve_files(&self, requested: Option<&[ForecastRun]>) -> Result<Vec<String>> {
        let Some(requested) = requested else {
            let entries = self.catalog.list_available_runs().await?;
            let runs: Vec<ForecastRun> = entries.iter().map(|e| e.forecast_run).collect();
            return Ok(filenames_for(&entries, &runs));
        };

        let filenames = self.catalog.resolve_filenames(requested).await?;
        let wanted: HashSet<&ForecastRun> = requested.iter().collect();
        if filenames.len() < wanted.len() {
            warn!(
                requested = wanted.len(),
                published = filenames.len(),
                "Some forecast runs are not published, dropping them"
            );
        }
        Ok(filenames)
    }

    /// Download `filenames` into the workspace, one after the other.
    pub async fn download(&self, filenames: &[String]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(filenames.len());
        for filename in filenames {
            paths.push(self.fetcher.fetch(filename, &self.workspace).await?);
        }
        Ok(paths)
    }

    /// Ingest every requested variable and store its date partitions.
    ///
    /// `today` decides which partial days count as stale.
    #[instrument(skip(self, options), fields(variables = options.variables.len()))]
    pub async fn ingest(
        &self,
        options: &IngestOptions,
        today: NaiveDate,
    ) -> Result<Vec<CollectedPartition>> {
        let filenames = self.resolve_files(options.forecast_runs.as_deref()).await?;
        if filenames.is_empty() {
            info!("No published files for the requested runs");
            return Ok(Vec::new());
        }

        let files = self.download(&filenames).await?;
        let assembler = Assembler::new(self.decoder.as_ref());

        let mut collected = Vec::new();
        for &variable in &options.variables {
            let series = assembler.assemble(&files, variable)?;
            for partition in partition_by_date(&series, today) {
                let reference = self
                    .store
                    .write(&partition, &options.out_dir, options.bucket_destination.as_ref())
                    .await?;
                collected.push(CollectedPartition {
                    variable,
                    date: partition.date,
                    reference,
                });
            }
        }

        info!(
            files = files.len(),
            partitions = collected.len(),
            "Ingestion completed"
        );
        Ok(collected)
    }
}
