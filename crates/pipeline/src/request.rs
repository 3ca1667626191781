//! Request and response bodies of the two top-level runs.

use serde::{Deserialize, Serialize};

use icon_common::{Status, Variable};
use ingestion::CollectedPartition;
use storage::FileRef;

/// A field given either as a single value or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

/// Inputs of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestRequest {
    /// Variable codes; all variables when absent.
    pub variable: Option<OneOrMany<String>>,
    /// ISO-8601 run timestamps; every listed run when absent.
    pub forecast_run: Option<OneOrMany<String>>,
    /// Directory receiving the partition files.
    #[serde(alias = "out")]
    pub out_dir: Option<String>,
    pub bucket_destination: Option<String>,
}

/// Inputs of a retrieval run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieveRequest {
    pub variable: Option<OneOrMany<String>>,
    /// `[min, max]` slice, or a single latitude for the nearest row.
    pub lat_range: Option<OneOrMany<f64>>,
    #[serde(alias = "lon_range")]
    pub long_range: Option<OneOrMany<f64>>,
    /// Start timestamp, or `[start, end]`.
    pub time_range: Option<OneOrMany<String>>,
    pub out_format: Option<String>,
    pub bucket_source: Option<String>,
    pub bucket_destination: Option<String>,
    /// Raster path, must end in `.tif`.
    pub out: Option<String>,
}

/// Output of a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub status: Status,
    pub collected_data_info: Vec<CollectedPartition>,
}

impl IngestResponse {
    pub fn ok(collected_data_info: Vec<CollectedPartition>) -> Self {
        Self {
            status: Status::Ok,
            collected_data_info,
        }
    }
}

/// One materialized raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedRaster {
    pub variable: Variable,
    #[serde(rename = "ref")]
    pub reference: FileRef,
}

/// Output of a successful retrieval.
///
/// A single raster kept locally without an explicit `out` is reported as
/// its bare path; everything else as a list of references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RetrieveResponse {
    Collected {
        status: Status,
        collected_data_info: Vec<CollectedRaster>,
    },
    Path(String),
}
