//! Construction-time configuration of the hub.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use icon_common::DATASET_NAME;
use ingestion::CatalogConfig;
use storage::ObjectStorageConfig;

/// Everything an [`Icon2iHub`](crate::Icon2iHub) needs besides requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scoped working directory, emptied after every run.
    pub workspace: PathBuf,
    /// Where partitions and rasters land when a request names no location.
    pub output_dir: PathBuf,
    pub catalog: CatalogConfig,
    pub storage: ObjectStorageConfig,
}

impl PipelineConfig {
    pub fn default_workspace() -> PathBuf {
        PathBuf::from(format!("./{}__workspace", DATASET_NAME))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace: Self::default_workspace(),
            output_dir: PathBuf::from("."),
            catalog: CatalogConfig::default(),
            storage: ObjectStorageConfig::default(),
        }
    }
}
