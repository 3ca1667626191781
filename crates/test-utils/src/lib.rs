//! Shared test utilities for the icon2i-hub workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Fakes for the catalog, fetcher and decoder capabilities
//! - Synthetic ICON-2I runs and grid generators
//! - A GRIB2 message builder for driving the real file decoder
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{published_runs, FakeCatalog};
//! ```

pub mod fakes;
pub mod fixtures;
pub mod generators;
pub mod grib;

// Re-export commonly used items at the crate root
pub use fakes::*;
pub use fixtures::*;
pub use generators::*;
pub use grib::*;

/// Approximate equality for grid values and coordinates, compared as f64.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(series.lat[0], 44.0_f32, 1e-6_f32);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Asserts that every non-NaN value of a slice is `>= 0`.
#[macro_export]
macro_rules! assert_non_negative {
    ($values:expr) => {{
        for (i, v) in $values.iter().enumerate() {
            if !v.is_nan() && *v < 0.0 {
                panic!("assertion failed: value {} at index {} is negative", v, i);
            }
        }
    }};
}
