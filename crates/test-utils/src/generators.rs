//! Synthetic grid data shaped like ICON-2I messages.

use chrono::{DateTime, Duration, Utc};

use grib2_parser::RawGrid;
use grid_processor::TimeSeries;
use icon_common::Variable;

/// Latitudes of a small test grid, north to south like the published files.
pub fn test_lats(ny: usize) -> Vec<f32> {
    (0..ny).rev().map(|i| 44.0 + i as f32 * 0.025).collect()
}

/// Longitudes of a small test grid, west to east.
pub fn test_lons(nx: usize) -> Vec<f32> {
    (0..nx).map(|i| 11.0 + i as f32 * 0.025).collect()
}

/// Creates a test grid with predictable values.
///
/// Each cell value is `base + col * 10 + row`, row-major.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(3, 2, 100.0);
/// assert_eq!(grid, vec![100.0, 110.0, 120.0, 101.0, 111.0, 121.0]);
/// ```
pub fn create_test_grid(width: usize, height: usize, base: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(base + (col * 10 + row) as f32);
        }
    }
    data
}

/// Value of `variable` at forecast step `step` (hours since the run).
///
/// Total precipitation is a running total growing by 0.5 per hour, as the
/// publisher emits it; the other variables are smooth, step dependent fields.
pub fn synthetic_value(variable: Variable, step: usize) -> f32 {
    let s = step as f32;
    match variable {
        Variable::TotalPrecipitation => 0.5 * s,
        Variable::Temperature => 280.0 + s * 0.1,
        Variable::DewpointTemperature => 275.0 + s * 0.1,
        Variable::TemperatureG => 282.0 + s * 0.1,
        Variable::UWindComponent => 3.0,
        Variable::VWindComponent => 4.0,
        Variable::TotalCloudCover => (s * 5.0) % 100.0,
        Variable::SnowDepthWaterEquivalent => 0.0,
        Variable::PressureReducedToMsl => 101_325.0 - s,
        Variable::WindSpeed | Variable::WindDirection => f32::NAN,
    }
}

/// `steps` hourly messages of one decoded variable starting at `start`.
pub fn raw_grids(
    variable: Variable,
    start: DateTime<Utc>,
    steps: usize,
    lats: &[f32],
    lons: &[f32],
) -> Vec<RawGrid> {
    let name = variable.display_name().unwrap_or_default();
    (0..steps)
        .map(|step| RawGrid {
            name: name.to_string(),
            valid_time: start + Duration::hours(step as i64),
            lats: lats.to_vec(),
            lons: lons.to_vec(),
            values: vec![synthetic_value(variable, step); lats.len() * lons.len()],
        })
        .collect()
}

/// Hourly series with values from [`create_test_grid`], offset by step.
pub fn hourly_series(
    variable: Variable,
    start: DateTime<Utc>,
    steps: usize,
    ny: usize,
    nx: usize,
) -> TimeSeries {
    let mut lats = test_lats(ny);
    lats.reverse();
    let mut series = TimeSeries::empty(variable, lats, test_lons(nx));
    for step in 0..steps {
        let frame = create_test_grid(nx, ny, step as f32 * 100.0);
        // frame length always matches the axes built above
        let _ = series.push_frame(start + Duration::hours(step as i64), &frame);
    }
    series
}
