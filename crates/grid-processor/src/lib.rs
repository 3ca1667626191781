//! Time-indexed gridded series for ICON-2I variables.
//!
//! A [`TimeSeries`] is a dense `[time, lat, lon]` cube stored as a flat
//! row-major `Vec<f32>` where NaN means no data. This crate holds the numeric
//! operations shared by ingestion and retrieval:
//!
//! - **Decumulation** of running totals into per-step increments
//! - **Normalisation**: coordinate rounding and `(time, lat, lon)` ordering
//! - **Concatenation** of series along the time axis
//! - **Windowing** by inclusive range or nearest neighbour on each axis
//! - **Derived fields** (wind speed and direction from the wind components)

pub mod decumulate;
pub mod derive;
pub mod error;
pub mod normalize;
pub mod partition;
pub mod series;
pub mod window;

// Re-export commonly used types at crate root
pub use decumulate::{clamp_negative, decumulate};
pub use derive::{derive_wind, wind_direction, wind_speed};
pub use error::{GridError, Result};
pub use normalize::{concat, normalize, round_coordinate};
pub use partition::DatePartition;
pub use series::TimeSeries;
pub use window::{AxisSelector, TimeSelector, Window};
