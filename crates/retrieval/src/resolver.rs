//! Serves windowed series from stored partitions, backfilling on a miss.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use grid_processor::{concat, AxisSelector, TimeSelector, TimeSeries, Window};
use icon_common::time::dates_between;
use icon_common::{format_iso, ForecastRun, Variable};
use ingestion::{CollectedPartition, IngestOptions, Ingester};
use storage::{FileRef, PartitionStore, S3Uri};

use crate::error::{RetrievalError, Result};

/// What to retrieve.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub variables: Vec<Variable>,
    pub lat: Option<AxisSelector>,
    pub lon: Option<AxisSelector>,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    /// Bucket location checked for existing partitions.
    pub bucket_source: Option<S3Uri>,
}

impl RetrievalQuery {
    /// Calendar dates covered by the time range, inclusive.
    pub fn dates(&self) -> Vec<NaiveDate> {
        dates_between(self.time_start, self.time_end)
    }

    pub fn window(&self) -> Window {
        Window::time(TimeSelector::Range(self.time_start, self.time_end))
            .with_lat(self.lat)
            .with_lon(self.lon)
    }
}

/// Windowed series of one requested variable.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedSeries {
    pub variable: Variable,
    pub series: TimeSeries,
}

/// Cache/backfill resolver over a [`PartitionStore`].
pub struct Resolver {
    ingester: Arc<Ingester>,
    workspace: PathBuf,
}

impl Resolver {
    pub fn new(ingester: Arc<Ingester>, workspace: PathBuf) -> Self {
        Self {
            ingester,
            workspace,
        }
    }

    fn store(&self) -> &PartitionStore {
        self.ingester.store()
    }

    /// Retrieve every requested variable, in request order.
    ///
    /// A single backfill ingestion covering all variables runs on the first
    /// miss and its partitions serve the remaining variables too. Any
    /// failure aborts the whole retrieval.
    #[instrument(skip(self, query), fields(
        variables = query.variables.len(),
        start = %format_iso(&query.time_start),
        end = %format_iso(&query.time_end)
    ))]
    pub async fn retrieve(&self, query: &RetrievalQuery, today: NaiveDate) -> Result<Vec<RetrievedSeries>> {
        let dates = query.dates();
        let window = query.window();
        let mut backfilled: Option<Vec<CollectedPartition>> = None;
        let mut retrieved = Vec::with_capacity(query.variables.len());

        for &variable in &query.variables {
            let cached = match &query.bucket_source {
                Some(source) => self.cached_refs(variable, &dates, source).await?,
                None => None,
            };

            let refs = match cached {
                Some(refs) => refs,
                None => {
                    if backfilled.is_none() {
                        backfilled = Some(self.backfill(query, &dates, today).await?);
                    }
                    backfilled
                        .iter()
                        .flatten()
                        .filter(|c| c.variable == variable)
                        .map(|c| c.reference.clone())
                        .collect()
                }
            };

            let series = window.apply(&self.load(variable, &refs, query).await?);
            let (steps, rows, cols) = series.shape();
            if steps == 0 || rows == 0 || cols == 0 {
                return Err(no_data(variable, query));
            }
            retrieved.push(RetrievedSeries { variable, series });
        }

        Ok(retrieved)
    }

    /// References of every required partition at `source`, or `None` when
    /// any of them is missing.
    async fn cached_refs(
        &self,
        variable: Variable,
        dates: &[NaiveDate],
        source: &S3Uri,
    ) -> Result<Option<Vec<FileRef>>> {
        let missing = self.store().missing_dates(variable, dates, source).await?;
        if !missing.is_empty() {
            info!(
                variable = %variable,
                missing = missing.len(),
                source = %source,
                "Partitions missing from source"
            );
            return Ok(None);
        }
        debug!(variable = %variable, source = %source, "All partitions cached");
        Ok(Some(
            dates
                .iter()
                .map(|&date| PartitionStore::remote_ref(variable, date, source))
                .collect(),
        ))
    }

    /// Ingest the midnight runs of `dates` for every requested variable.
    async fn backfill(
        &self,
        query: &RetrievalQuery,
        dates: &[NaiveDate],
        today: NaiveDate,
    ) -> Result<Vec<CollectedPartition>> {
        info!(
            variables = query.variables.len(),
            runs = dates.len(),
            "Backfilling partitions"
        );
        let options = IngestOptions {
            variables: query.variables.clone(),
            forecast_runs: Some(dates.iter().map(|&d| ForecastRun::midnight(d)).collect()),
            out_dir: self.workspace.clone(),
            bucket_destination: query.bucket_source.clone(),
        };
        Ok(self.ingester.ingest(&options, today).await?)
    }

    /// Read and merge the partitions of one variable.
    async fn load(&self, variable: Variable, refs: &[FileRef], query: &RetrievalQuery) -> Result<TimeSeries> {
        if refs.is_empty() {
            return Err(no_data(variable, query));
        }
        let mut parts = Vec::with_capacity(refs.len());
        for reference in refs {
            let partition = self.store().read(reference, &self.workspace).await?;
            parts.push(partition.series);
        }
        Ok(concat(parts)?)
    }
}

fn no_data(variable: Variable, query: &RetrievalQuery) -> RetrievalError {
    RetrievalError::NoData {
        variable: variable.code().to_string(),
        start: format_iso(&query.time_start),
        end: format_iso(&query.time_end),
    }
}
