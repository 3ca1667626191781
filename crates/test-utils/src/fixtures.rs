//! Synthetic publisher state: a listing plus the decoded content of its files.

use std::sync::Arc;

use icon_common::{ForecastRun, Variable};
use ingestion::CatalogEntry;

use crate::fakes::{FakeCatalog, FakeDecoder};
use crate::generators::{raw_grids, test_lats, test_lons};

/// Published file name of a run, in the publisher's style.
pub fn run_filename(run: &ForecastRun) -> String {
    format!(
        "icon_2I_{}.grib",
        run.reference_time().format("%Y%m%d%H")
    )
}

/// A fake publisher with full 72-step files on a `ny` x `nx` grid.
pub struct PublishedRuns {
    pub runs: Vec<ForecastRun>,
    pub catalog: Arc<FakeCatalog>,
    pub decoder: Arc<FakeDecoder>,
}

/// Publish `runs` (any order) with every decoded variable.
pub fn published_runs(runs: &[&str], ny: usize, nx: usize) -> PublishedRuns {
    let runs: Vec<ForecastRun> = runs
        .iter()
        .filter_map(|r| ForecastRun::parse(r).ok())
        .collect();
    let (lats, lons) = (test_lats(ny), test_lons(nx));

    let mut entries = Vec::new();
    let mut decoder = FakeDecoder::new();
    for run in &runs {
        let filename = run_filename(run);
        for variable in Variable::ALL.iter().filter(|v| !v.is_derived()) {
            decoder = decoder.with_grids(
                &filename,
                raw_grids(*variable, run.reference_time(), 72, &lats, &lons),
            );
        }
        entries.push(CatalogEntry {
            forecast_run: *run,
            filename,
        });
    }

    PublishedRuns {
        runs,
        catalog: Arc::new(FakeCatalog::new(entries)),
        decoder: Arc::new(decoder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grib2_parser::GribDecoder;
    use ingestion::ForecastCatalog;
    use std::path::Path;

    #[tokio::test]
    async fn test_published_runs() {
        let published = published_runs(&["2025-02-26T00:00:00", "2025-02-26T12:00:00"], 2, 3);
        assert_eq!(published.runs.len(), 2);

        let entries = published.catalog.list_available_runs().await.unwrap();
        assert_eq!(entries[0].filename, "icon_2I_2025022600.grib");
        assert_eq!(published.catalog.calls(), 1);

        let grids = published
            .decoder
            .decode(Path::new("/ws/icon_2I_2025022612.grib"), "Total Precipitation")
            .unwrap();
        assert_eq!(grids.len(), 72);
        assert_eq!(grids[0].valid_time, published.runs[1].reference_time());
    }
}
