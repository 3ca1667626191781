//! Remote API settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use icon_common::DATASET_NAME;

/// Default Meteohub API root.
pub const DEFAULT_BASE_URL: &str = "https://meteohub.agenziaitaliameteo.it/api";

/// Connection settings for the publisher API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 600,
        }
    }
}

impl CatalogConfig {
    /// Listing of the currently published ICON-2I files.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/datasets/{}/opendata",
            self.base_url.trim_end_matches('/'),
            DATASET_NAME
        )
    }

    /// Download URL of one published file.
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/opendata/{}", self.base_url.trim_end_matches('/'), filename)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the shared HTTP client.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .connect_timeout(Duration::from_secs(30))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = CatalogConfig {
            base_url: "https://example.org/api/".to_string(),
            ..CatalogConfig::default()
        };
        assert_eq!(
            config.listing_url(),
            "https://example.org/api/datasets/ICON_2I_SURFACE_PRESSURE_LEVELS/opendata"
        );
        assert_eq!(
            config.file_url("icon_2I_2025022600.grib"),
            "https://example.org/api/opendata/icon_2I_2025022600.grib"
        );
    }
}
