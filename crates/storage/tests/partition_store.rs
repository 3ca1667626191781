//! Partition store behaviour against local directories and in-memory buckets.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use grid_processor::{DatePartition, TimeSeries};
use icon_common::Variable;
use storage::{FileRef, InMemoryConnector, PartitionStore, S3Uri};

fn partition(variable: Variable, day: u32, steps: i64) -> DatePartition {
    let t0 = Utc.with_ymd_and_hms(2025, 2, day, 0, 0, 0).unwrap();
    let time: Vec<_> = (0..steps).map(|h| t0 + Duration::hours(h)).collect();
    let data = (0..steps as usize * 4).map(|v| v as f32).collect();
    let series = TimeSeries::new(variable, time, vec![44.0, 45.0], vec![10.0, 11.0], data).unwrap();
    DatePartition::new(t0.date_naive(), series)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
}

#[tokio::test]
async fn test_local_write_returns_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = PartitionStore::new(Arc::new(InMemoryConnector::new()));

    let p = partition(Variable::Temperature, 26, 24);
    let reference = store.write(&p, dir.path(), None).await.unwrap();

    let expected = dir
        .path()
        .join("ICON_2I_SURFACE_PRESSURE_LEVELS__temperature__2025-02-26.nc");
    assert_eq!(reference, FileRef::Local(expected.clone()));
    // NetCDF-4 files are HDF5 containers
    let bytes = std::fs::read(&expected).unwrap();
    assert_eq!(&bytes[..4], b"\x89HDF");

    let back = store.read(&reference, dir.path()).await.unwrap();
    assert_eq!(back, p);
}

#[tokio::test]
async fn test_bucket_write_exists_and_read() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let store = PartitionStore::new(Arc::new(InMemoryConnector::new()));
    let location = S3Uri::parse("s3://bucket/icon2i").unwrap();

    assert!(!store
        .exists(Variable::TotalPrecipitation, date(26), &location)
        .await
        .unwrap());

    let p = partition(Variable::TotalPrecipitation, 26, 12);
    let reference = store.write(&p, dir.path(), Some(&location)).await.unwrap();
    assert_eq!(
        reference.to_string(),
        "s3://bucket/icon2i/ICON_2I_SURFACE_PRESSURE_LEVELS__total_precipitation__2025-02-26.nc"
    );
    assert_eq!(
        reference,
        PartitionStore::remote_ref(Variable::TotalPrecipitation, date(26), &location)
    );

    assert!(store
        .exists(Variable::TotalPrecipitation, date(26), &location)
        .await
        .unwrap());
    let missing = store
        .missing_dates(Variable::TotalPrecipitation, &[date(26), date(27)], &location)
        .await
        .unwrap();
    assert_eq!(missing, vec![date(27)]);

    let back = store.read(&reference, workspace.path()).await.unwrap();
    assert_eq!(back.series.len(), 12);
    assert_eq!(back.series.data, p.series.data);
}

#[tokio::test]
async fn test_rewrite_overwrites_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(InMemoryConnector::new());
    let store = PartitionStore::new(connector.clone());
    let location = S3Uri::parse("s3://bucket").unwrap();

    let first = store
        .write(&partition(Variable::Temperature, 26, 12), dir.path(), Some(&location))
        .await
        .unwrap();
    let second = store
        .write(&partition(Variable::Temperature, 26, 24), dir.path(), Some(&location))
        .await
        .unwrap();
    assert_eq!(first, second);

    let names = store.list_names(&location).await.unwrap();
    assert_eq!(names.len(), 1);
    let back = store.read(&second, dir.path()).await.unwrap();
    assert_eq!(back.len(), 24);
}
