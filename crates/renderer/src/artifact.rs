//! In-memory raster built from a windowed series.

use icon_common::{format_iso, Variable};
use grid_processor::TimeSeries;

use crate::error::{RenderError, Result};

/// Value written for grid points without data.
pub const NODATA: f32 = -9999.0;

/// Coordinate reference system of every ICON-2I raster.
pub const PROJECTION: &str = "EPSG:4326";

/// North-up affine transform from pixel to geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub x_min: f64,
    pub pixel_width: f64,
    pub y_max: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Derive the transform of an `nx` by `ny` raster spanning the given
    /// coordinate vectors.
    pub fn from_axes(lat: &[f32], lon: &[f32]) -> Option<Self> {
        let (lat_min, lat_max) = bounds(lat)?;
        let (lon_min, lon_max) = bounds(lon)?;
        let nx = lon.len() as f64;
        let ny = lat.len() as f64;
        Some(Self {
            x_min: lon_min,
            pixel_width: (lon_max - lon_min) / nx,
            y_max: lat_max,
            pixel_height: (lat_max - lat_min) / ny,
        })
    }

    /// GDAL ordering: `(x_min, px_w, 0, y_max, 0, -px_h)`.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.x_min,
            self.pixel_width,
            0.0,
            self.y_max,
            0.0,
            -self.pixel_height,
        ]
    }
}

fn bounds(values: &[f32]) -> Option<(f64, f64)> {
    let mut iter = values.iter().map(|&v| v as f64);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// One multiband raster: a band per timestep, rows ordered north to south.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterArtifact {
    pub variable: Variable,
    pub geotransform: GeoTransform,
    pub projection: &'static str,
    pub width: usize,
    pub height: usize,
    pub bands: Vec<Vec<f32>>,
    pub band_timestamps: Vec<String>,
    /// Dataset-level metadata items.
    pub metadata: Vec<(String, String)>,
}

impl RasterArtifact {
    /// Build the raster of a normalised series (latitude ascending).
    ///
    /// Rows are flipped so the first row is the northernmost latitude and
    /// NaN values become [`NODATA`].
    pub fn from_series(series: &TimeSeries) -> Result<Self> {
        let empty = |axis| RenderError::EmptyWindow {
            variable: series.variable.code().to_string(),
            axis,
        };
        if series.time.is_empty() {
            return Err(empty("time"));
        }
        let geotransform = GeoTransform::from_axes(&series.lat, &series.lon)
            .ok_or_else(|| empty(if series.lat.is_empty() { "lat" } else { "lon" }))?;

        let (_, ny, nx) = series.shape();
        let north_first = series.lat.first() < series.lat.last();

        let bands = (0..series.len())
            .map(|t| {
                let frame = series.frame(t);
                let mut band = Vec::with_capacity(ny * nx);
                for row in 0..ny {
                    let y = if north_first { ny - 1 - row } else { row };
                    band.extend(
                        frame[y * nx..(y + 1) * nx]
                            .iter()
                            .map(|&v| if v.is_nan() { NODATA } else { v }),
                    );
                }
                band
            })
            .collect();

        Ok(Self {
            variable: series.variable,
            geotransform,
            projection: PROJECTION,
            width: nx,
            height: ny,
            bands,
            band_timestamps: series.time.iter().map(format_iso).collect(),
            metadata: vec![
                ("type".to_string(), String::new()),
                ("unit".to_string(), String::new()),
            ],
        })
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn first_timestamp(&self) -> Option<&str> {
        self.band_timestamps.first().map(String::as_str)
    }
}
