//! `GribFileDecoder` over real GRIB2 messages.

use chrono::{TimeZone, Utc};

use grib2_parser::tables::surface_types::GROUND;
use grib2_parser::{GribDecoder, GribFileDecoder};
use test_utils::{assert_approx_eq, write_grib_file, Grib2Builder};

fn values(base: f32) -> Vec<f32> {
    (0..6).map(|i| base + i as f32).collect()
}

#[test]
fn test_selects_messages_by_name_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon_2I_2025022612.grib");
    let run = Grib2Builder::icon_2i().with_reference_time(2025, 2, 26, 12);
    write_grib_file(
        &path,
        &[
            run.clone().with_values(values(280.0)).build(),
            run.clone()
                .with_parameter(2, 2)
                .with_surface(103, 10)
                .with_values(values(3.0))
                .build(),
            run.clone()
                .with_forecast_hour(1)
                .with_values(values(281.0))
                .build(),
        ],
    )
    .unwrap();

    let decoder = GribFileDecoder::new();
    let grids = decoder.decode(&path, "2 metre temperature").unwrap();

    assert_eq!(grids.len(), 2);
    assert_eq!(
        grids[0].valid_time,
        Utc.with_ymd_and_hms(2025, 2, 26, 12, 0, 0).unwrap()
    );
    assert_eq!(
        grids[1].valid_time,
        Utc.with_ymd_and_hms(2025, 2, 26, 13, 0, 0).unwrap()
    );
    assert!(grids.iter().all(|g| g.name == "2 metre temperature"));
    assert!(grids.iter().all(|g| g.is_consistent()));

    // North to south, west to east, as scanned
    let grid = &grids[1];
    assert_eq!(grid.lats.len(), 2);
    assert_approx_eq!(grid.lats[0], 46.0_f32, 1e-5_f32);
    assert_approx_eq!(grid.lats[1], 45.5_f32, 1e-5_f32);
    assert_eq!(grid.lons.len(), 3);
    assert_approx_eq!(grid.lons[0], 10.0_f32, 1e-5_f32);
    assert_approx_eq!(grid.lons[2], 11.0_f32, 1e-5_f32);
    assert_eq!(grid.values, values(281.0));

    let wind = decoder.decode(&path, "10 metre U wind component").unwrap();
    assert_eq!(wind.len(), 1);
    assert_eq!(wind[0].values, values(3.0));
}

#[test]
fn test_surface_type_decides_temperature_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon.grib");
    write_grib_file(
        &path,
        &[Grib2Builder::icon_2i()
            .with_surface(GROUND, 0)
            .with_values(values(275.0))
            .build()],
    )
    .unwrap();

    let decoder = GribFileDecoder::new();
    assert!(decoder.decode(&path, "2 metre temperature").unwrap().is_empty());
    let ground = decoder.decode(&path, "Temperature (G)").unwrap();
    assert_eq!(ground.len(), 1);
    assert_eq!(ground[0].values, values(275.0));
}

#[test]
fn test_longitudes_past_180_are_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon.grib");
    write_grib_file(
        &path,
        &[Grib2Builder::icon_2i().with_origin(46.0, 350.0).build()],
    )
    .unwrap();

    let grids = GribFileDecoder::new()
        .decode(&path, "2 metre temperature")
        .unwrap();
    let lons = &grids[0].lons;
    assert_approx_eq!(lons[0], -10.0_f32, 1e-5_f32);
    assert_approx_eq!(lons[1], -9.5_f32, 1e-5_f32);
    assert_approx_eq!(lons[2], -9.0_f32, 1e-5_f32);
}

#[test]
fn test_error_page_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon_2I_2025022612.grib");
    std::fs::write(&path, b"<html><body>503 Service Unavailable</body></html>").unwrap();

    let err = GribFileDecoder::new()
        .decode(&path, "2 metre temperature")
        .unwrap_err();
    assert!(matches!(err, grib2_parser::Grib2Error::Parse(_)));
}
