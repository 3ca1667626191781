//! The two top-level runs: ingestion and retrieval.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use grib2_parser::{GribDecoder, GribFileDecoder};
use icon_common::{HubResult, Status, Variable};
use ingestion::{
    ForecastCatalog, HttpFetcher, IngestOptions, Ingester, IngestionError, MeteohubCatalog,
    RawFetcher,
};
use renderer::{materialize, GeoTiffWriter, RasterWriter};
use retrieval::{Resolver, RetrievalQuery};
use storage::{BucketConnector, FileRef, PartitionStore, S3Connector, S3Uri};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::request::{
    CollectedRaster, IngestRequest, IngestResponse, RetrieveRequest, RetrieveResponse,
};
use crate::validate::{validate_ingest, validate_retrieve, ValidRetrieve};
use crate::workspace::Workspace;

const INGESTION: &str = "ingestion";
const RETRIEVAL: &str = "retrieval";

/// Entry point of both runs.
///
/// Every run validates its request, works inside the scoped workspace and
/// reports failures as a [`HubError`](icon_common::HubError).
pub struct Icon2iHub {
    workspace: Workspace,
    output_dir: PathBuf,
    ingester: Arc<Ingester>,
    resolver: Resolver,
    connector: Arc<dyn BucketConnector>,
    writer: Arc<dyn RasterWriter>,
}

impl Icon2iHub {
    /// Hub talking to the Meteohub API and S3.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = config
            .catalog
            .http_client()
            .map_err(IngestionError::from)?;
        let catalog = Arc::new(MeteohubCatalog::with_client(client.clone(), config.catalog.clone()));
        let fetcher = Arc::new(HttpFetcher::with_client(client, config.catalog.clone()));
        let connector = Arc::new(S3Connector::new(config.storage.clone()));
        Self::with_parts(
            config,
            catalog,
            fetcher,
            Arc::new(GribFileDecoder::new()),
            connector,
            Arc::new(GeoTiffWriter::new()),
        )
    }

    /// Hub over explicit collaborators.
    pub fn with_parts(
        config: PipelineConfig,
        catalog: Arc<dyn ForecastCatalog>,
        fetcher: Arc<dyn RawFetcher>,
        decoder: Arc<dyn GribDecoder>,
        connector: Arc<dyn BucketConnector>,
        writer: Arc<dyn RasterWriter>,
    ) -> Result<Self> {
        let workspace = Workspace::new(&config.workspace)?;
        let ingester = Arc::new(Ingester::new(
            catalog,
            fetcher,
            decoder,
            PartitionStore::new(connector.clone()),
            workspace.path().to_path_buf(),
        ));
        let resolver = Resolver::new(ingester.clone(), workspace.path().to_path_buf());

        Ok(Self {
            workspace,
            output_dir: config.output_dir,
            ingester,
            resolver,
            connector,
            writer,
        })
    }

    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }

    /// Ingest forecast runs into date partitions.
    #[instrument(skip(self, request))]
    pub async fn ingest(&self, request: &IngestRequest, now: DateTime<Utc>) -> HubResult<IngestResponse> {
        let _scope = self
            .workspace
            .scope()
            .map_err(|e| PipelineError::from(e).into_hub_error(INGESTION))?;
        self.run_ingest(request, now)
            .await
            .map_err(|e| report(e, INGESTION))
    }

    /// Retrieve a window of one or more variables as rasters.
    #[instrument(skip(self, request))]
    pub async fn retrieve(&self, request: &RetrieveRequest, now: DateTime<Utc>) -> HubResult<RetrieveResponse> {
        let _scope = self
            .workspace
            .scope()
            .map_err(|e| PipelineError::from(e).into_hub_error(RETRIEVAL))?;
        self.run_retrieve(request, now)
            .await
            .map_err(|e| report(e, RETRIEVAL))
    }

    async fn run_ingest(&self, request: &IngestRequest, now: DateTime<Utc>) -> Result<IngestResponse> {
        let valid = validate_ingest(request)?;
        let out_dir = valid.out_dir.unwrap_or_else(|| self.output_dir.clone());
        tokio::fs::create_dir_all(&out_dir).await?;

        let options = IngestOptions {
            variables: valid.variables,
            forecast_runs: valid.forecast_runs,
            out_dir,
            bucket_destination: valid.bucket_destination,
        };
        let collected = self.ingester.ingest(&options, now.date_naive()).await?;

        info!(partitions = collected.len(), "Ingestion run completed");
        Ok(IngestResponse::ok(collected))
    }

    async fn run_retrieve(&self, request: &RetrieveRequest, now: DateTime<Utc>) -> Result<RetrieveResponse> {
        let valid = validate_retrieve(request, now)?;
        let query = RetrievalQuery {
            variables: valid.variables.clone(),
            lat: valid.lat,
            lon: valid.lon,
            time_start: valid.time_start,
            time_end: valid.time_end,
            bucket_source: valid.bucket_source.clone(),
        };
        let retrieved = self.resolver.retrieve(&query, now.date_naive()).await?;
        let several = retrieved.len() > 1;

        let mut rasters = Vec::with_capacity(retrieved.len());
        for item in &retrieved {
            let output = valid
                .out
                .as_ref()
                .map(|out| if several { per_variable_path(out, item.variable) } else { out.clone() });
            let path = materialize(
                self.writer.as_ref(),
                &item.series,
                output.as_deref(),
                self.workspace.path(),
            )?;
            let reference = self.publish(&path, &valid, output.is_some()).await?;
            rasters.push(CollectedRaster {
                variable: item.variable,
                reference,
            });
        }

        info!(rasters = rasters.len(), "Retrieval run completed");
        let bare_path = valid.bucket_destination.is_none() && valid.out.is_none() && rasters.len() == 1;
        if bare_path {
            if let Some(raster) = rasters.pop() {
                return Ok(RetrieveResponse::Path(raster.reference.to_string()));
            }
        }
        Ok(RetrieveResponse::Collected {
            status: Status::Ok,
            collected_data_info: rasters,
        })
    }

    /// Final location of a written raster.
    ///
    /// Uploaded to the destination bucket when there is one; otherwise
    /// workspace rasters are copied to the output directory so they outlive
    /// the run.
    async fn publish(&self, path: &Path, valid: &ValidRetrieve, explicit_out: bool) -> Result<FileRef> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(destination) = &valid.bucket_destination {
            let storage = self.connector.connect(&destination.bucket)?;
            storage.upload_file(path, &destination.key(&filename)).await?;
            let uri: S3Uri = destination.join(&filename);
            info!(uri = %uri, "Uploaded raster");
            return Ok(FileRef::Remote(uri));
        }
        if explicit_out {
            return Ok(FileRef::Local(path.to_path_buf()));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let kept = self.output_dir.join(&filename);
        tokio::fs::copy(path, &kept).await?;
        Ok(FileRef::Local(kept))
    }
}

/// `out` with the variable code appended to the file stem.
fn per_variable_path(out: &Path, variable: Variable) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out.with_file_name(format!("{}__{}.tif", stem, variable.code()))
}

fn report(err: PipelineError, run: &str) -> icon_common::HubError {
    let hub_error = err.into_hub_error(run);
    warn!(status = %hub_error.status, message = %hub_error.message, "Run failed");
    hub_error
}
