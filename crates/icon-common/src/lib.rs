//! Common types and utilities shared across the ICON-2I hub crates.

pub mod dataset;
pub mod error;
pub mod time;
pub mod variable;

pub use dataset::{partition_filename, raster_filename, DATASET_NAME};
pub use error::{HubError, HubResult, Status};
pub use time::{format_iso, parse_iso, ForecastRun, TimeParseError};
pub use variable::{UnknownVariable, Variable};
