//! Error types for grid processing.

use thiserror::Error;

/// Errors that can occur while building or combining grid series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Data length does not match the coordinate axes.
    #[error("data has {actual} values, axes require {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Two series or grids are not on the same lat/lon grid.
    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    /// Two series carry different variables.
    #[error("cannot combine {left} with {right}")]
    VariableMismatch { left: String, right: String },

    /// Nothing to combine.
    #[error("no series to combine")]
    Empty,
}

impl GridError {
    pub fn grid_mismatch(msg: impl Into<String>) -> Self {
        Self::GridMismatch(msg.into())
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridError>;
