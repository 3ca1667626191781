//! End-to-end ingestion against fake catalog, fetcher and decoder.

use chrono::NaiveDate;
use std::sync::Arc;

use icon_common::{ForecastRun, Variable};
use ingestion::{IngestOptions, Ingester, IngestionError};
use storage::{FileRef, InMemoryConnector, PartitionStore, S3Uri};
use test_utils::{assert_non_negative, published_runs, FakeCatalog, FakeDecoder, FakeFetcher, PublishedRuns};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ingester(published: &PublishedRuns, fetcher: Arc<FakeFetcher>, workspace: &std::path::Path) -> Ingester {
    Ingester::new(
        published.catalog.clone(),
        fetcher,
        published.decoder.clone(),
        PartitionStore::new(Arc::new(InMemoryConnector::new())),
        workspace.to_path_buf(),
    )
}

fn options(variables: Vec<Variable>, runs: Option<Vec<&str>>, out_dir: &std::path::Path) -> IngestOptions {
    IngestOptions {
        variables,
        forecast_runs: runs.map(|runs| {
            runs.iter()
                .map(|r| ForecastRun::parse(r).unwrap())
                .collect()
        }),
        out_dir: out_dir.to_path_buf(),
        bucket_destination: None,
    }
}

#[tokio::test]
async fn test_two_runs_make_daily_partitions() {
    let workspace = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00", "2025-02-26T12:00:00"], 2, 3);
    let fetcher = Arc::new(FakeFetcher::new());
    let ingester = ingester(&published, fetcher.clone(), workspace.path());

    let collected = ingester
        .ingest(
            &options(vec![Variable::TotalPrecipitation], None, out.path()),
            date(2025, 2, 26),
        )
        .await
        .unwrap();

    // 12 steps of the 00 run, then 72 steps of the 12 run
    let dates: Vec<_> = collected.iter().map(|c| c.date).collect();
    assert_eq!(
        dates,
        vec![date(2025, 2, 26), date(2025, 2, 27), date(2025, 2, 28), date(2025, 3, 1)]
    );
    assert_eq!(fetcher.fetched(), vec!["icon_2I_2025022600.grib", "icon_2I_2025022612.grib"]);
    assert!(collected.iter().all(|c| matches!(c.reference, FileRef::Local(_))));

    let store = ingester.store();
    let first = store.read(&collected[0].reference, workspace.path()).await.unwrap();
    assert_eq!(first.len(), 24);
    // running totals become hourly increments, restarting with the 12 run
    assert_eq!(first.series.get(0, 0, 0), Some(0.0));
    assert_eq!(first.series.get(5, 1, 2), Some(0.5));
    assert_eq!(first.series.get(12, 0, 0), Some(0.0));
    assert_eq!(first.series.get(13, 0, 0), Some(0.5));
    assert_non_negative!(first.series.data);

    let last = store.read(&collected[3].reference, workspace.path()).await.unwrap();
    assert_eq!(last.len(), 12);
}

#[tokio::test]
async fn test_stale_trailing_day_dropped_later() {
    let workspace = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T12:00:00"], 1, 1);
    let ingester = ingester(&published, Arc::new(FakeFetcher::new()), workspace.path());

    let collected = ingester
        .ingest(
            &options(vec![Variable::Temperature], None, out.path()),
            date(2025, 3, 5),
        )
        .await
        .unwrap();
    // 26th and 1st March only carry 12 steps each and lie in the past
    let dates: Vec<_> = collected.iter().map(|c| c.date).collect();
    assert_eq!(dates, vec![date(2025, 2, 27), date(2025, 2, 28)]);
}

#[tokio::test]
async fn test_unlisted_runs_are_dropped() {
    let workspace = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 1, 1);
    let fetcher = Arc::new(FakeFetcher::new());
    let ingester = ingester(&published, fetcher.clone(), workspace.path());

    let collected = ingester
        .ingest(
            &options(
                vec![Variable::Temperature],
                Some(vec!["2025-02-20T00:00:00", "2025-02-26T00:00:00"]),
                out.path(),
            ),
            date(2025, 2, 26),
        )
        .await
        .unwrap();
    assert!(!collected.is_empty());
    assert_eq!(fetcher.fetched(), vec!["icon_2I_2025022600.grib"]);

    let none = ingester
        .ingest(
            &options(vec![Variable::Temperature], Some(vec!["2025-02-20T00:00:00"]), out.path()),
            date(2025, 2, 26),
        )
        .await
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_bucket_destination_returns_uris() {
    let workspace = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 1, 2);
    let ingester = ingester(&published, Arc::new(FakeFetcher::new()), workspace.path());

    let mut opts = options(vec![Variable::WindSpeed], None, out.path());
    opts.bucket_destination = Some(S3Uri::parse("s3://bucket/icon").unwrap());
    let collected = ingester.ingest(&opts, date(2025, 2, 26)).await.unwrap();

    assert_eq!(
        collected[0].reference.to_string(),
        "s3://bucket/icon/ICON_2I_SURFACE_PRESSURE_LEVELS__wind_speed__2025-02-26.nc"
    );
    let partition = ingester
        .store()
        .read(&collected[0].reference, workspace.path())
        .await
        .unwrap();
    // u = 3, v = 4 everywhere
    assert_eq!(partition.series.get(0, 0, 1), Some(5.0));
}

#[tokio::test]
async fn test_catalog_failure_is_an_error() {
    let workspace = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let published = PublishedRuns {
        runs: Vec::new(),
        catalog: Arc::new(FakeCatalog::unavailable()),
        decoder: Arc::new(FakeDecoder::new()),
    };
    let ingester = ingester(&published, Arc::new(FakeFetcher::new()), workspace.path());

    let err = ingester
        .ingest(&options(vec![Variable::Temperature], None, out.path()), date(2025, 2, 26))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::CatalogStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_download_failure_is_an_error() {
    let workspace = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 1, 1);
    let fetcher = Arc::new(FakeFetcher::failing_on(&["icon_2I_2025022600.grib"]));
    let ingester = ingester(&published, fetcher, workspace.path());

    let err = ingester
        .ingest(&options(vec![Variable::Temperature], None, out.path()), date(2025, 2, 26))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::Download { .. }));
}
