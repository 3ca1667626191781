//! Error types for top-level runs.

use thiserror::Error;

use icon_common::HubError;
use ingestion::IngestionError;
use renderer::RenderError;
use retrieval::RetrievalError;
use storage::StorageError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Rejected request, detected before any I/O.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("File I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Status-carrying error reported for a run; `run` names it in the
    /// context of non-validation failures.
    pub fn into_hub_error(self, run: &str) -> HubError {
        match self {
            PipelineError::Invalid(message) => HubError::invalid(message),
            other => HubError::error(format!("Error during ICON-2I {} run: {}", run, other)),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
