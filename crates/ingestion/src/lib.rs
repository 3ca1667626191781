//! ICON-2I ingestion library.
//!
//! Maps requested forecast runs to published files, downloads them and turns
//! the decoded messages into date-partitioned series:
//!
//! - [`ForecastCatalog`] / [`MeteohubCatalog`]: the remote listing
//! - [`RawFetcher`] / [`HttpFetcher`]: file download
//! - [`Assembler`]: per-variable continuous, de-cumulated series
//! - [`partition_by_date`]: calendar-date split with stale-day discard
//! - [`Ingester`]: the whole path, writing through a `PartitionStore`

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
mod ingester;
pub mod partitioner;

// Re-exports
pub use assembler::{Assembler, LATEST_RUN_STEPS, SUPERSEDED_RUN_STEPS};
pub use catalog::{filenames_for, parse_listing, CatalogEntry, ForecastCatalog, MeteohubCatalog};
pub use config::{CatalogConfig, DEFAULT_BASE_URL};
pub use error::{IngestionError, Result};
pub use fetch::{HttpFetcher, RawFetcher};
pub use ingester::{CollectedPartition, IngestOptions, Ingester};
pub use partitioner::{partition_by_date, STALE_PARTIAL_DAY_STEPS};
