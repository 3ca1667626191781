//! Status taxonomy shared by every top-level run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using HubError.
pub type HubResult<T> = Result<T, HubError>;

/// Outcome class of a run, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    /// Malformed or out-of-range input, detected before any I/O.
    Invalid,
    /// Authorization failure at the job adapter.
    Denied,
    /// Catalog, download, decode, storage or raster failure.
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Invalid => "INVALID",
            Status::Denied => "DENIED",
            Status::Error => "ERROR",
        }
    }

    /// Get the HTTP status code for this status.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Invalid => 400,
            Status::Denied => 403,
            Status::Error => 500,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error carrying a taxonomy status and a human readable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct HubError {
    pub status: Status,
    pub message: String,
}

impl HubError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(Status::Invalid, message)
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(Status::Denied, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, message)
    }

    /// JSON body reported to callers for a failed run.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status,
            "message": self.message,
        })
    }
}
