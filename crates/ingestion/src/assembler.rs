//! Assembly of one variable's continuous series from decoded forecast files.

use chrono::Duration;
use std::path::PathBuf;
use tracing::{debug, info};

use grib2_parser::{GribDecoder, RawGrid, MISSING_VALUE};
use grid_processor::{clamp_negative, concat, decumulate, derive_wind, GridError, TimeSeries};
use icon_common::Variable;

use crate::error::{IngestionError, Result};

/// Steps kept from a file that is followed by a newer run.
pub const SUPERSEDED_RUN_STEPS: usize = 12;

/// Steps kept from the newest file (the full published horizon).
pub const LATEST_RUN_STEPS: usize = 72;

/// Builds continuous series from raw files through a [`GribDecoder`].
pub struct Assembler<'a> {
    decoder: &'a dyn GribDecoder,
}

impl<'a> Assembler<'a> {
    pub fn new(decoder: &'a dyn GribDecoder) -> Self {
        Self { decoder }
    }

    /// Assemble `variable` from `files`, ordered oldest run first.
    ///
    /// Derived variables are computed from their assembled components.
    pub fn assemble(&self, files: &[PathBuf], variable: Variable) -> Result<TimeSeries> {
        if let Some((u, v)) = variable.components() {
            let u = self.assemble_decoded(files, u)?;
            let v = self.assemble_decoded(files, v)?;
            return Ok(derive_wind(variable, &u, &v)?);
        }
        self.assemble_decoded(files, variable)
    }

    fn assemble_decoded(&self, files: &[PathBuf], variable: Variable) -> Result<TimeSeries> {
        let name = variable.display_name().ok_or_else(|| {
            GridError::VariableMismatch {
                left: variable.to_string(),
                right: "decoded messages".to_string(),
            }
        })?;

        if files.is_empty() {
            return Err(IngestionError::NoFiles { variable });
        }

        let mut parts = Vec::with_capacity(files.len());
        for (i, path) in files.iter().enumerate() {
            let limit = if i + 1 < files.len() {
                SUPERSEDED_RUN_STEPS
            } else {
                LATEST_RUN_STEPS
            };

            let grids: Vec<RawGrid> = self
                .decoder
                .decode(path, name)?
                .into_iter()
                .filter(|g| g.name == name)
                .take(limit)
                .collect();
            if grids.is_empty() {
                return Err(IngestionError::NoMessages {
                    variable,
                    name: name.to_string(),
                    path: path.display().to_string(),
                });
            }

            let series = file_series(variable, grids)?;
            debug!(
                variable = %variable,
                path = %path.display(),
                steps = series.len(),
                "Assembled file"
            );
            parts.push(series);
        }

        let mut series = concat(parts)?;
        if variable.is_cumulative() {
            clamp_negative(&mut series);
        }

        info!(
            variable = %variable,
            steps = series.len(),
            ny = series.lat.len(),
            nx = series.lon.len(),
            "Assembled series"
        );
        Ok(series)
    }
}

/// Stack one file's grids into a series.
///
/// Step `i` is valid at the first message's valid time plus `i` hours.
fn file_series(variable: Variable, grids: Vec<RawGrid>) -> Result<TimeSeries> {
    let Some(first) = grids.first() else {
        return Ok(TimeSeries::empty(variable, Vec::new(), Vec::new()));
    };
    let start = first.valid_time;
    let mut series = TimeSeries::empty(variable, first.lats.clone(), first.lons.clone());

    for (i, grid) in grids.iter().enumerate() {
        if grid.lats != series.lat || grid.lons != series.lon {
            return Err(GridError::grid_mismatch(format!(
                "message {} of {} is on a {}x{} grid, expected {}x{}",
                i,
                variable,
                grid.lats.len(),
                grid.lons.len(),
                series.lat.len(),
                series.lon.len()
            ))
            .into());
        }
        let frame: Vec<f32> = grid
            .values
            .iter()
            .map(|&v| if v == MISSING_VALUE { f32::NAN } else { v })
            .collect();
        series.push_frame(start + Duration::hours(i as i64), &frame)?;
    }

    if variable.is_cumulative() {
        decumulate(&mut series);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::path::Path;

    /// Decoder serving canned grids per file name.
    struct CannedDecoder(HashMap<String, Vec<RawGrid>>);

    impl GribDecoder for CannedDecoder {
        fn decode(&self, path: &Path, _name: &str) -> grib2_parser::Result<Vec<RawGrid>> {
            let key = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            Ok(self.0.get(key).cloned().unwrap_or_default())
        }
    }

    fn run(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, day, hour, 0, 0).unwrap()
    }

    fn grids(name: &str, start: DateTime<Utc>, values: &[f32]) -> Vec<RawGrid> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| RawGrid {
                name: name.to_string(),
                valid_time: start + Duration::hours(i as i64),
                lats: vec![46.0, 45.0],
                lons: vec![10.0],
                values: vec![v, v * 2.0],
            })
            .collect()
    }

    #[test]
    fn test_superseded_file_is_truncated() {
        let running: Vec<f32> = (0..30).map(|i| i as f32).collect();
        let mut files = HashMap::new();
        files.insert("a".to_string(), grids("Total Precipitation", run(26, 0), &running));
        files.insert("b".to_string(), grids("Total Precipitation", run(26, 12), &running[..20]));
        let decoder = CannedDecoder(files);

        let series = Assembler::new(&decoder)
            .assemble(&[PathBuf::from("a"), PathBuf::from("b")], Variable::TotalPrecipitation)
            .unwrap();

        assert_eq!(series.len(), 12 + 20);
        assert_eq!(series.time[0], run(26, 0));
        assert_eq!(series.time[12], run(26, 12));
        // latitude sorted ascending: row 0 is 45.0, holding the doubled values
        assert_eq!(series.lat, vec![45.0, 46.0]);
        assert_eq!(series.get(0, 0, 0), Some(0.0));
        assert_eq!(series.get(1, 0, 0), Some(2.0));
        assert_eq!(series.get(1, 1, 0), Some(1.0));
        // each file restarts its running total
        assert_eq!(series.get(12, 1, 0), Some(0.0));
        assert_eq!(series.get(13, 1, 0), Some(1.0));
    }

    #[test]
    fn test_sentinel_becomes_nan_and_not_decumulated() {
        let mut files = HashMap::new();
        files.insert(
            "a".to_string(),
            grids("2 metre temperature", run(26, 0), &[280.0, MISSING_VALUE, 279.0]),
        );
        let decoder = CannedDecoder(files);

        let series = Assembler::new(&decoder)
            .assemble(&[PathBuf::from("a")], Variable::Temperature)
            .unwrap();
        assert_eq!(series.get(0, 1, 0), Some(280.0));
        assert!(series.get(1, 1, 0).unwrap().is_nan());
        assert_eq!(series.get(2, 1, 0), Some(279.0));
    }

    #[test]
    fn test_file_without_messages_is_an_error() {
        let mut files = HashMap::new();
        files.insert(
            "a".to_string(),
            grids("2 metre temperature", run(26, 0), &[280.0, 281.0]),
        );
        let decoder = CannedDecoder(files);

        let err = Assembler::new(&decoder)
            .assemble(&[PathBuf::from("a"), PathBuf::from("b")], Variable::Temperature)
            .unwrap_err();
        assert!(
            matches!(err, IngestionError::NoMessages { ref path, .. } if path == "b"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_no_files_is_an_error() {
        let decoder = CannedDecoder(HashMap::new());
        let err = Assembler::new(&decoder)
            .assemble(&[], Variable::Temperature)
            .unwrap_err();
        assert!(matches!(err, IngestionError::NoFiles { .. }));
    }
}
