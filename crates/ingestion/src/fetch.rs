//! Raw forecast file download.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

use crate::config::CatalogConfig;
use crate::error::{IngestionError, Result};

/// Capability to download one published file into a directory.
#[async_trait]
pub trait RawFetcher: Send + Sync {
    /// Download `filename` into `dest_dir`, returning the local path.
    async fn fetch(&self, filename: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// `filename` when it names a file directly inside a directory.
///
/// Listing filenames are remote input: anything with a directory component
/// (`../x`, `/abs/x`, `a/b`) would land outside the download directory.
pub fn plain_filename(filename: &str) -> Result<&str> {
    match Path::new(filename).file_name().and_then(|name| name.to_str()) {
        Some(name) if name == filename => Ok(name),
        _ => Err(IngestionError::InvalidFilename(filename.to_string())),
    }
}

/// Fetcher streaming files from the Meteohub open-data API.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl HttpFetcher {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self { client, config })
    }

    pub fn with_client(client: reqwest::Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl RawFetcher for HttpFetcher {
    #[instrument(skip(self), fields(dest = %dest_dir.display()))]
    async fn fetch(&self, filename: &str, dest_dir: &Path) -> Result<PathBuf> {
        let filename = plain_filename(filename)?;
        let url = self.config.file_url(filename);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestionError::download(filename, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestionError::download(
                filename,
                format!("HTTP error: {}", status),
            ));
        }

        fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(filename);
        let mut file = File::create(&path).await?;

        let mut stream = response.bytes_stream();
        let mut bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| IngestionError::download(filename, e))?;
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;

        info!(path = %path.display(), bytes = bytes, "Download completed");
        Ok(path)
    }
}
