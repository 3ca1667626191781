//! Error types for raster materialization.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("File I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot materialize {variable}: window has no {axis} values")]
    EmptyWindow {
        variable: String,
        axis: &'static str,
    },

    #[error("Band {band} has {actual} values, expected {expected}")]
    BandSize {
        band: usize,
        expected: usize,
        actual: usize,
    },

    #[error("TIFF encoding failed: {0}")]
    Tiff(String),
}

impl From<tiff::TiffError> for RenderError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Tiff(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RenderError>;
