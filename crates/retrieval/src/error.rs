//! Error types for retrieval.

use thiserror::Error;

use grid_processor::GridError;
use ingestion::IngestionError;
use storage::StorageError;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Backfill ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("No data available for {variable} between {start} and {end}")]
    NoData {
        variable: String,
        start: String,
        end: String,
    },
}

/// Result type for retrieval.
pub type Result<T> = std::result::Result<T, RetrievalError>;
