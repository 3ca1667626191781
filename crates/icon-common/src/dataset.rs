//! ICON-2I dataset identity and persisted file naming.

use chrono::{DateTime, NaiveDate, Utc};

use crate::time::format_iso;
use crate::Variable;

/// Name of the published dataset; prefixes every persisted file.
pub const DATASET_NAME: &str = "ICON_2I_SURFACE_PRESSURE_LEVELS";

/// Extension of persisted date partitions.
pub const PARTITION_EXT: &str = "nc";

/// Extension of materialized rasters.
pub const RASTER_EXT: &str = "tif";

/// Canonical key of a date partition: `{dataset}__{variable}__{date}`.
pub fn partition_key(variable: Variable, date: NaiveDate) -> String {
    format!("{}__{}__{}", DATASET_NAME, variable.code(), date.format("%Y-%m-%d"))
}

pub fn partition_filename(variable: Variable, date: NaiveDate) -> String {
    format!("{}.{}", partition_key(variable, date), PARTITION_EXT)
}

/// Raster filename: `{dataset}__{variable}__{first timestamp}.tif`.
pub fn raster_filename(variable: Variable, first_timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}__{}__{}.{}",
        DATASET_NAME,
        variable.code(),
        format_iso(first_timestamp),
        RASTER_EXT
    )
}
