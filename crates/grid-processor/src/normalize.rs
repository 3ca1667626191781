//! Coordinate rounding, ordering and concatenation.

use std::cmp::Ordering;
use tracing::debug;

use crate::error::{GridError, Result};
use crate::series::TimeSeries;

/// Decimal places kept on lat/lon so partition grids compare equal.
const COORDINATE_DECIMALS: i32 = 6;

/// Round a coordinate to 6 decimals, stored as f32.
pub fn round_coordinate(value: f32) -> f32 {
    let scale = 10f64.powi(COORDINATE_DECIMALS);
    ((value as f64 * scale).round() / scale) as f32
}

/// Indices that sort `values` ascending.
fn argsort<T: PartialOrd>(values: &[T]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
    });
    idx
}

/// Round coordinates and order the series by `(time, lat, lon)`.
///
/// Duplicate timestamps keep the occurrence that comes last, so a newer
/// forecast run overrides an older one for the same valid time.
pub fn normalize(series: TimeSeries) -> TimeSeries {
    let mut series = series;
    series.lat.iter_mut().for_each(|v| *v = round_coordinate(*v));
    series.lon.iter_mut().for_each(|v| *v = round_coordinate(*v));

    // Stable sort keeps equal timestamps in input order; keep the last of each run.
    let sorted = argsort(&series.time);
    let mut t_idx: Vec<usize> = Vec::with_capacity(sorted.len());
    for t in sorted {
        match t_idx.last() {
            Some(&prev) if series.time[prev] == series.time[t] => {
                if let Some(last) = t_idx.last_mut() {
                    *last = t;
                }
            }
            _ => t_idx.push(t),
        }
    }
    let y_idx = argsort(&series.lat);
    let x_idx = argsort(&series.lon);

    let already_ordered = t_idx.len() == series.time.len()
        && t_idx.iter().enumerate().all(|(i, &t)| i == t)
        && y_idx.iter().enumerate().all(|(i, &y)| i == y)
        && x_idx.iter().enumerate().all(|(i, &x)| i == x);
    if already_ordered {
        return series;
    }

    debug!(
        variable = %series.variable,
        dropped_duplicates = series.time.len() - t_idx.len(),
        "Reordered series"
    );
    series.select(&t_idx, &y_idx, &x_idx)
}

/// Concatenate series of one variable along time, then normalise.
///
/// All parts must share the same grid once rounded.
pub fn concat(parts: Vec<TimeSeries>) -> Result<TimeSeries> {
    let mut parts = parts.into_iter().map(normalize);
    let mut merged = parts.next().ok_or(GridError::Empty)?;

    for part in parts {
        if part.variable != merged.variable {
            return Err(GridError::VariableMismatch {
                left: merged.variable.to_string(),
                right: part.variable.to_string(),
            });
        }
        if !merged.same_grid(&part) {
            return Err(GridError::grid_mismatch(format!(
                "{} grid {}x{} does not match {}x{}",
                part.variable,
                part.lat.len(),
                part.lon.len(),
                merged.lat.len(),
                merged.lon.len()
            )));
        }
        merged.time.extend(part.time);
        merged.data.extend(part.data);
    }

    Ok(normalize(merged))
}
