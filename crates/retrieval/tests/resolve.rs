//! Cache and backfill behaviour of the resolver against fake collaborators.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;
use std::sync::Arc;

use grid_processor::AxisSelector;
use icon_common::{parse_iso, Variable};
use ingestion::Ingester;
use retrieval::{Resolver, RetrievalError, RetrievalQuery};
use storage::{InMemoryConnector, PartitionStore, S3Uri};
use test_utils::{
    assert_approx_eq, published_runs, FakeCatalog, FakeDecoder, FakeFetcher, PublishedRuns,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 26).unwrap()
}

fn t(s: &str) -> DateTime<Utc> {
    parse_iso(s).unwrap()
}

fn resolver(published: &PublishedRuns, fetcher: Arc<FakeFetcher>, workspace: &Path) -> Resolver {
    let ingester = Ingester::new(
        published.catalog.clone(),
        fetcher,
        published.decoder.clone(),
        PartitionStore::new(Arc::new(InMemoryConnector::new())),
        workspace.to_path_buf(),
    );
    Resolver::new(Arc::new(ingester), workspace.to_path_buf())
}

fn query(variables: Vec<Variable>, bucket_source: Option<&str>) -> RetrievalQuery {
    RetrievalQuery {
        variables,
        lat: None,
        lon: None,
        time_start: t("2025-02-26T00:00:00"),
        time_end: t("2025-02-26T06:00:00"),
        bucket_source: bucket_source.map(|b| S3Uri::parse(b).unwrap()),
    }
}

#[tokio::test]
async fn test_without_source_runs_ingestion_and_windows() {
    let workspace = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 2, 3);
    let fetcher = Arc::new(FakeFetcher::new());
    let resolver = resolver(&published, fetcher.clone(), workspace.path());

    let retrieved = resolver
        .retrieve(&query(vec![Variable::TotalPrecipitation], None), today())
        .await
        .unwrap();

    assert_eq!(published.catalog.calls(), 1);
    assert_eq!(fetcher.fetched(), vec!["icon_2I_2025022600.grib"]);

    assert_eq!(retrieved.len(), 1);
    let series = &retrieved[0].series;
    assert_eq!(series.shape(), (7, 2, 3));
    assert_eq!(series.time.first(), Some(&t("2025-02-26T00:00:00")));
    assert_eq!(series.time.last(), Some(&t("2025-02-26T06:00:00")));
    assert!(series.lat.windows(2).all(|w| w[0] < w[1]));
    // Hourly increments of the running total
    assert_eq!(series.get(0, 0, 0), Some(0.0));
    assert_eq!(series.get(6, 1, 2), Some(0.5));
}

#[tokio::test]
async fn test_cached_partitions_skip_ingestion() {
    let workspace = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 2, 3);
    let fetcher = Arc::new(FakeFetcher::new());
    let resolver = resolver(&published, fetcher.clone(), workspace.path());
    let q = query(vec![Variable::TotalPrecipitation], Some("s3://hub/icon2i"));

    // First call populates the source bucket
    let first = resolver.retrieve(&q, today()).await.unwrap();
    assert_eq!(published.catalog.calls(), 1);
    assert_eq!(fetcher.calls(), 1);
    let decoded = published.decoder.calls();

    let second = resolver.retrieve(&q, today()).await.unwrap();
    assert_eq!(published.catalog.calls(), 1);
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(published.decoder.calls(), decoded);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_one_backfill_serves_every_variable() {
    let workspace = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 1, 2);
    let fetcher = Arc::new(FakeFetcher::new());
    let resolver = resolver(&published, fetcher.clone(), workspace.path());

    let retrieved = resolver
        .retrieve(
            &query(
                vec![Variable::Temperature, Variable::WindSpeed],
                Some("s3://hub/icon2i"),
            ),
            today(),
        )
        .await
        .unwrap();

    assert_eq!(published.catalog.calls(), 1);
    assert_eq!(fetcher.calls(), 1);
    let variables: Vec<_> = retrieved.iter().map(|r| r.variable).collect();
    assert_eq!(variables, vec![Variable::Temperature, Variable::WindSpeed]);
    let speed = &retrieved[1].series;
    assert_eq!(speed.len(), 7);
    assert!(speed.data.iter().all(|&v| (v - 5.0).abs() < 1e-6));
}

#[tokio::test]
async fn test_partial_miss_backfills_all_variables() {
    let workspace = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 1, 1);
    let fetcher = Arc::new(FakeFetcher::new());
    let resolver = resolver(&published, fetcher.clone(), workspace.path());

    resolver
        .retrieve(&query(vec![Variable::TotalPrecipitation], Some("s3://hub/icon2i")), today())
        .await
        .unwrap();
    assert_eq!(published.catalog.calls(), 1);

    // Precipitation is cached, temperature is not
    let retrieved = resolver
        .retrieve(
            &query(
                vec![Variable::TotalPrecipitation, Variable::Temperature],
                Some("s3://hub/icon2i"),
            ),
            today(),
        )
        .await
        .unwrap();
    assert_eq!(published.catalog.calls(), 2);
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(retrieved.len(), 2);
    assert_approx_eq!(retrieved[1].series.get(0, 0, 0).unwrap(), 280.0_f32, 1e-4_f32);
}

#[tokio::test]
async fn test_spatial_window() {
    let workspace = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 2, 3);
    let resolver = resolver(&published, Arc::new(FakeFetcher::new()), workspace.path());

    let mut q = query(vec![Variable::Temperature], None);
    q.lat = Some(AxisSelector::Nearest(44.01));
    q.lon = Some(AxisSelector::Range(10.99, 11.03));
    let retrieved = resolver.retrieve(&q, today()).await.unwrap();

    let series = &retrieved[0].series;
    assert_eq!(series.shape(), (7, 1, 2));
    assert_approx_eq!(series.lat[0], 44.0_f32, 1e-6_f32);
}

#[tokio::test]
async fn test_backfill_failure_aborts_retrieval() {
    let workspace = tempfile::tempdir().unwrap();
    let published = PublishedRuns {
        runs: Vec::new(),
        catalog: Arc::new(FakeCatalog::unavailable()),
        decoder: Arc::new(FakeDecoder::new()),
    };
    let resolver = resolver(&published, Arc::new(FakeFetcher::new()), workspace.path());

    let err = resolver
        .retrieve(&query(vec![Variable::Temperature], None), today())
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::Ingestion(_)));
}

#[tokio::test]
async fn test_unpublished_dates_have_no_data() {
    let workspace = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-20T00:00:00"], 1, 1);
    let fetcher = Arc::new(FakeFetcher::new());
    let resolver = resolver(&published, fetcher.clone(), workspace.path());

    let err = resolver
        .retrieve(&query(vec![Variable::Temperature], None), today())
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::NoData { .. }));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_window_outside_grid_has_no_data() {
    let workspace = tempfile::tempdir().unwrap();
    let published = published_runs(&["2025-02-26T00:00:00"], 2, 3);
    let resolver = resolver(&published, Arc::new(FakeFetcher::new()), workspace.path());

    let mut q = query(vec![Variable::Temperature], None);
    q.lat = Some(AxisSelector::Range(60.0, 61.0));
    let err = resolver.retrieve(&q, today()).await.unwrap_err();

    assert!(matches!(err, RetrievalError::NoData { ref variable, .. } if variable == "temperature"));
}
