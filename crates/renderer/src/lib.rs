//! Raster materialization for windowed ICON-2I series.
//!
//! - [`RasterArtifact`]: one band per timestep, north-up geotransform,
//!   NaN replaced by the `-9999` nodata value
//! - [`RasterWriter`]: the file-format boundary
//! - [`GeoTiffWriter`]: multiband GeoTIFF with GDAL metadata

pub mod artifact;
pub mod error;
pub mod geotiff;

use std::path::{Path, PathBuf};

use grid_processor::TimeSeries;
use icon_common::{raster_filename, DATASET_NAME};
use tracing::info;

pub use artifact::{GeoTransform, RasterArtifact, NODATA, PROJECTION};
pub use error::{RenderError, Result};
pub use geotiff::GeoTiffWriter;

/// Encodes an artifact into a file.
pub trait RasterWriter: Send + Sync {
    fn write(&self, artifact: &RasterArtifact, path: &Path) -> Result<()>;
}

/// Default location of a raster inside the workspace:
/// `{workspace}/{dataset}/{variable}/{dataset}__{variable}__{first timestamp}.tif`.
pub fn default_raster_path(workspace: &Path, series: &TimeSeries) -> Option<PathBuf> {
    let first = series.time.first()?;
    Some(
        workspace
            .join(DATASET_NAME)
            .join(series.variable.code())
            .join(raster_filename(series.variable, first)),
    )
}

/// Write `series` as a multiband raster and return the file path.
///
/// Without `output` the raster goes to [`default_raster_path`].
pub fn materialize(
    writer: &dyn RasterWriter,
    series: &TimeSeries,
    output: Option<&Path>,
    workspace: &Path,
) -> Result<PathBuf> {
    let artifact = RasterArtifact::from_series(series)?;
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_raster_path(workspace, series).ok_or_else(|| RenderError::EmptyWindow {
            variable: series.variable.code().to_string(),
            axis: "time",
        })?,
    };

    writer.write(&artifact, &path)?;

    info!(
        variable = %series.variable,
        bands = artifact.band_count(),
        path = %path.display(),
        "Materialized raster"
    );
    Ok(path)
}
