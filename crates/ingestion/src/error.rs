//! Error types for the ingestion crate.

use thiserror::Error;

use grib2_parser::Grib2Error;
use grid_processor::GridError;
use icon_common::Variable;
use storage::StorageError;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request to {url} returned {status}")]
    CatalogStatus { url: String, status: u16 },

    #[error("Failed to parse catalog listing: {0}")]
    CatalogParse(String),

    #[error("Failed to download \"{filename}\": {reason}")]
    Download { filename: String, reason: String },

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to decode GRIB2 data: {0}")]
    Decode(#[from] Grib2Error),

    #[error("Failed to assemble series: {0}")]
    Grid(#[from] GridError),

    #[error("No \"{name}\" messages found for {variable} in {path}")]
    NoMessages {
        variable: Variable,
        name: String,
        path: String,
    },

    #[error("No files to assemble {variable} from")]
    NoFiles { variable: Variable },

    #[error("Refusing to download \"{0}\": not a plain file name")]
    InvalidFilename(String),

    #[error("Failed to store partition: {0}")]
    Storage(#[from] StorageError),
}

impl IngestionError {
    pub fn download(filename: impl Into<String>, reason: impl ToString) -> Self {
        Self::Download {
            filename: filename.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
