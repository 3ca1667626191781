//! In-process stand-ins for the network and decoding capabilities.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use grib2_parser::{GribDecoder, RawGrid};
use ingestion::{CatalogEntry, ForecastCatalog, IngestionError, RawFetcher};

/// Catalog returning a fixed listing and counting calls.
#[derive(Default)]
pub struct FakeCatalog {
    entries: Vec<CatalogEntry>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Catalog whose remote answers 503.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Number of listing requests served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastCatalog for FakeCatalog {
    async fn list_available_runs(&self) -> ingestion::Result<Vec<CatalogEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(IngestionError::CatalogStatus {
                url: "fake://listing".to_string(),
                status: 503,
            });
        }
        Ok(self.entries.clone())
    }
}

/// Fetcher writing an empty placeholder file and recording what was fetched.
#[derive(Default)]
pub struct FakeFetcher {
    fetched: Mutex<Vec<String>>,
    failing: Vec<String>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher failing for the given filenames.
    pub fn failing_on(filenames: &[&str]) -> Self {
        Self {
            failing: filenames.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.fetched().len()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RawFetcher for FakeFetcher {
    async fn fetch(&self, filename: &str, dest_dir: &Path) -> ingestion::Result<PathBuf> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(filename.to_string());
        }
        if self.failing.iter().any(|f| f == filename) {
            return Err(IngestionError::download(filename, "HTTP error: 404 Not Found"));
        }
        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(filename);
        tokio::fs::write(&path, b"").await?;
        Ok(path)
    }
}

/// Decoder serving canned messages keyed by file name.
#[derive(Default)]
pub struct FakeDecoder {
    files: HashMap<String, Vec<RawGrid>>,
    calls: AtomicUsize,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add messages to the file called `filename`.
    pub fn with_grids(mut self, filename: &str, grids: Vec<RawGrid>) -> Self {
        self.files
            .entry(filename.to_string())
            .or_default()
            .extend(grids);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GribDecoder for FakeDecoder {
    fn decode(&self, path: &Path, name: &str) -> grib2_parser::Result<Vec<RawGrid>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Ok(self
            .files
            .get(key)
            .map(|grids| grids.iter().filter(|g| g.name == name).cloned().collect())
            .unwrap_or_default())
    }
}
