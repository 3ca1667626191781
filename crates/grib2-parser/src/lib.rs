//! GRIB2 decoding for ICON-2I forecast files.
//!
//! A file is decoded into [`RawGrid`]s, one per message whose display name
//! matches the requested variable. The [`GribDecoder`] trait is the seam the
//! assembler depends on so it can be driven by fakes in tests.

pub mod decoder;
pub mod error;
pub mod tables;

use chrono::{DateTime, Utc};
use std::path::Path;

pub use decoder::GribFileDecoder;
pub use error::{Grib2Error, Result};
pub use tables::Grib2Tables;

/// Value the publisher writes for grid points without data.
pub const MISSING_VALUE: f32 = 9999.0;

/// One decoded GRIB2 message on a regular lat/lon grid.
///
/// `values` is row-major `[lat, lon]` in the order the coordinates are
/// given, which is the scan order of the file (not necessarily ascending).
#[derive(Debug, Clone, PartialEq)]
pub struct RawGrid {
    /// Display name of the parameter, e.g. "Total Precipitation".
    pub name: String,
    pub valid_time: DateTime<Utc>,
    pub lats: Vec<f32>,
    pub lons: Vec<f32>,
    pub values: Vec<f32>,
}

impl RawGrid {
    /// True when the coordinate vectors account for every value.
    pub fn is_consistent(&self) -> bool {
        self.lats.len() * self.lons.len() == self.values.len()
    }
}

/// Capability to decode a raw forecast file.
pub trait GribDecoder: Send + Sync {
    /// Decode every message of `path` whose display name is `name`, in file order.
    fn decode(&self, path: &Path, name: &str) -> Result<Vec<RawGrid>>;
}
