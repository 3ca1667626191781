//! Hub service configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use ingestion::{CatalogConfig, DEFAULT_BASE_URL};
use pipeline::PipelineConfig;
use storage::ObjectStorageConfig;

/// Default port of the job adapter.
pub const DEFAULT_PORT: u16 = 8080;

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Secret every job request must carry; without one all jobs are denied.
    #[serde(default)]
    pub token: Option<String>,

    /// Port of the HTTP job adapter
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl HubConfig {
    /// Load from a YAML file when given, from the environment otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml(path),
            None => Ok(Self::from_env()),
        }
    }

    pub fn from_yaml(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Configuration from environment variables, with defaults.
    pub fn from_env() -> Self {
        let catalog = CatalogConfig {
            base_url: env::var("ICON2I_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_secs: env::var("ICON2I_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
        };

        let storage = ObjectStorageConfig {
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").ok(),
            access_key_id: env::var("S3_ACCESS_KEY").ok(),
            secret_access_key: env::var("S3_SECRET_KEY").ok(),
            allow_http: env::var("S3_ALLOW_HTTP")
                .map(|v| v == "true")
                .unwrap_or(false),
        };

        let pipeline = PipelineConfig {
            workspace: env::var("ICON2I_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PipelineConfig::default_workspace()),
            output_dir: env::var("ICON2I_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            catalog,
            storage,
        };

        Self {
            pipeline,
            token: env::var("ICON2I_TOKEN").ok().filter(|t| !t.is_empty()),
            port: env::var("STATUS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}
