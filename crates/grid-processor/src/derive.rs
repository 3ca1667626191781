//! Wind speed and direction from the 10 m wind components.

use icon_common::Variable;

use crate::error::{GridError, Result};
use crate::series::TimeSeries;

/// Wind speed `sqrt(u² + v²)`.
pub fn wind_speed(u: f32, v: f32) -> f32 {
    u.hypot(v)
}

/// Meteorological direction the wind blows from, degrees in [0, 360).
pub fn wind_direction(u: f32, v: f32) -> f32 {
    let degrees = 270.0 - v.atan2(u).to_degrees();
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Build a derived variable from normalised u/v component series.
pub fn derive_wind(variable: Variable, u: &TimeSeries, v: &TimeSeries) -> Result<TimeSeries> {
    let op: fn(f32, f32) -> f32 = match variable {
        Variable::WindSpeed => wind_speed,
        Variable::WindDirection => wind_direction,
        other => {
            return Err(GridError::VariableMismatch {
                left: other.to_string(),
                right: "wind components".to_string(),
            })
        }
    };
    if u.time != v.time || !u.same_grid(v) {
        return Err(GridError::grid_mismatch(
            "u and v wind components are not aligned",
        ));
    }
    let data = u
        .data
        .iter()
        .zip(&v.data)
        .map(|(&u, &v)| op(u, v))
        .collect();
    TimeSeries::new(variable, u.time.clone(), u.lat.clone(), u.lon.clone(), data)
}
