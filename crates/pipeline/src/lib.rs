//! Top-level ICON-2I runs.
//!
//! [`Icon2iHub`] exposes the two operations a job adapter calls:
//!
//! - **ingest**: forecast runs to date partitions, locally or in a bucket
//! - **retrieve**: a spatio-temporal window to one multiband raster per
//!   variable, backfilling missing partitions first
//!
//! Requests are validated before any I/O ([`validate`]); each run is scoped
//! to a [`Workspace`] that is emptied when the run ends; failures are
//! reported with the `INVALID` / `ERROR` status taxonomy.

pub mod config;
pub mod error;
mod hub;
pub mod request;
pub mod validate;
pub mod workspace;

// Re-exports
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use hub::Icon2iHub;
pub use request::{
    CollectedRaster, IngestRequest, IngestResponse, OneOrMany, RetrieveRequest, RetrieveResponse,
};
pub use validate::{validate_ingest, validate_retrieve, ValidIngest, ValidRetrieve};
pub use workspace::{Workspace, WorkspaceScope};
