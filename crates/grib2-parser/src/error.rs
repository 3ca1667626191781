//! Error types for GRIB2 decoding.

use thiserror::Error;

/// Errors that can occur while decoding a GRIB2 file.
#[derive(Error, Debug)]
pub enum Grib2Error {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse GRIB2 data: {0}")]
    Parse(String),

    #[error("Failed to unpack message {index}: {reason}")]
    Unpack { index: usize, reason: String },

    #[error("Unsupported grid in message {index}: {reason}")]
    UnsupportedGrid { index: usize, reason: String },

    #[error("Invalid message time in message {index}: {reason}")]
    InvalidTime { index: usize, reason: String },
}

impl Grib2Error {
    pub fn unpack(index: usize, reason: impl ToString) -> Self {
        Self::Unpack {
            index,
            reason: reason.to_string(),
        }
    }

    pub fn unsupported_grid(index: usize, reason: impl ToString) -> Self {
        Self::UnsupportedGrid {
            index,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_time(index: usize, reason: impl ToString) -> Self {
        Self::InvalidTime {
            index,
            reason: reason.to_string(),
        }
    }
}

/// Result type for GRIB2 decoding.
pub type Result<T> = std::result::Result<T, Grib2Error>;
