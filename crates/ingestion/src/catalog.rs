//! Catalog client for the published forecast runs.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use icon_common::ForecastRun;

use crate::config::CatalogConfig;
use crate::error::{IngestionError, Result};

/// One downloadable file of the remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub forecast_run: ForecastRun,
    pub filename: String,
}

/// Raw listing item; fields other than these are ignored.
#[derive(Debug, Deserialize)]
struct ListingItem {
    date: String,
    run: String,
    filename: String,
}

/// Filenames of `runs` in `entries`, oldest run first.
///
/// Runs absent from the listing are skipped.
pub fn filenames_for(entries: &[CatalogEntry], runs: &[ForecastRun]) -> Vec<String> {
    let wanted: HashSet<&ForecastRun> = runs.iter().collect();
    let mut selected: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|e| wanted.contains(&e.forecast_run))
        .collect();
    selected.sort_by_key(|e| e.forecast_run);
    selected.into_iter().map(|e| e.filename.clone()).collect()
}

/// Parse a listing body into entries.
pub fn parse_listing(body: &str) -> Result<Vec<CatalogEntry>> {
    let items: Vec<ListingItem> =
        serde_json::from_str(body).map_err(|e| IngestionError::CatalogParse(e.to_string()))?;

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        match ForecastRun::from_date_and_run(&item.date, &item.run) {
            Ok(forecast_run) => entries.push(CatalogEntry {
                forecast_run,
                filename: item.filename,
            }),
            Err(e) => warn!(
                filename = %item.filename,
                error = %e,
                "Skipping listing entry with unusable run"
            ),
        }
    }
    Ok(entries)
}

/// Source of truth for which forecast runs are published.
#[async_trait]
pub trait ForecastCatalog: Send + Sync {
    /// Fetch the current listing. Fails rather than returning an empty listing
    /// when the remote cannot be read.
    async fn list_available_runs(&self) -> Result<Vec<CatalogEntry>>;

    /// Filenames of the listed runs among `runs`, oldest first.
    async fn resolve_filenames(&self, runs: &[ForecastRun]) -> Result<Vec<String>> {
        let entries = self.list_available_runs().await?;
        Ok(filenames_for(&entries, runs))
    }

    /// True when every run in `runs` is listed.
    async fn is_available(&self, runs: &[ForecastRun]) -> Result<bool> {
        let entries = self.list_available_runs().await?;
        let listed: HashSet<ForecastRun> = entries.iter().map(|e| e.forecast_run).collect();
        Ok(runs.iter().all(|r| listed.contains(r)))
    }
}

/// Catalog backed by the Meteohub open-data API.
pub struct MeteohubCatalog {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl MeteohubCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self { client, config })
    }

    pub fn with_client(client: reqwest::Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ForecastCatalog for MeteohubCatalog {
    #[instrument(skip(self))]
    async fn list_available_runs(&self) -> Result<Vec<CatalogEntry>> {
        let url = self.config.listing_url();
        debug!(url = %url, "Requesting forecast listing");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestionError::CatalogStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let entries = parse_listing(&body)?;
        info!(entries = entries.len(), "Fetched forecast listing");
        Ok(entries)
    }
}
