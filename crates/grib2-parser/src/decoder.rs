//! [`GribDecoder`] backed by the `grib` crate.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{Grib2Error, Result};
use crate::tables::Grib2Tables;
use crate::{GribDecoder, RawGrid};

/// Decodes regular lat/lon GRIB2 files from disk.
#[derive(Debug, Clone)]
pub struct GribFileDecoder {
    tables: Grib2Tables,
}

impl Default for GribFileDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GribFileDecoder {
    /// Decoder using the ICON-2I parameter names.
    pub fn new() -> Self {
        Self::with_tables(Grib2Tables::icon_2i())
    }

    pub fn with_tables(tables: Grib2Tables) -> Self {
        Self { tables }
    }
}

impl GribDecoder for GribFileDecoder {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn decode(&self, path: &Path, name: &str) -> Result<Vec<RawGrid>> {
        let reader = BufReader::new(File::open(path)?);
        let grib2 = grib::from_reader(reader).map_err(|e| Grib2Error::Parse(e.to_string()))?;

        let mut grids = Vec::new();
        let mut messages = 0;
        for (index, (_, submsg)) in grib2.iter().enumerate() {
            messages += 1;
            let discipline = submsg.indicator().discipline;
            let prod_def = submsg.prod_def();
            let (Some(category), Some(number)) =
                (prod_def.parameter_category(), prod_def.parameter_number())
            else {
                continue;
            };
            let surface_type = prod_def
                .fixed_surfaces()
                .map(|(first, _)| first.surface_type);

            let message_name =
                self.tables
                    .get_parameter_name(discipline, category, number, surface_type);
            if message_name != name {
                continue;
            }

            let valid_time = submsg
                .temporal_info()
                .forecast_time_target
                .ok_or_else(|| Grib2Error::invalid_time(index, "no forecast target time"))?;

            let (nx, ny) = submsg
                .grid_shape()
                .map_err(|e| Grib2Error::unsupported_grid(index, e))?;
            let points: Vec<(f32, f32)> = submsg
                .latlons()
                .map_err(|e| Grib2Error::unsupported_grid(index, e))?
                .collect();
            if nx == 0 || points.len() != nx * ny {
                return Err(Grib2Error::unsupported_grid(
                    index,
                    format!("{} grid points for a {}x{} grid", points.len(), nx, ny),
                ));
            }
            let lons = points[..nx]
                .iter()
                .map(|&(_, lon)| normalize_longitude(lon))
                .collect();
            let lats = points.iter().step_by(nx).map(|&(lat, _)| lat).collect();

            let values: Vec<f32> = grib::Grib2SubmessageDecoder::from(submsg)
                .map_err(|e| Grib2Error::unpack(index, e))?
                .dispatch()
                .map_err(|e| Grib2Error::unpack(index, e))?
                .collect();
            if values.len() != nx * ny {
                return Err(Grib2Error::unpack(
                    index,
                    format!("expected {} values, got {}", nx * ny, values.len()),
                ));
            }

            debug!(
                index = index,
                name = %message_name,
                valid_time = %valid_time,
                nx = nx,
                ny = ny,
                "Decoded message"
            );

            grids.push(RawGrid {
                name: message_name,
                valid_time,
                lats,
                lons,
                values,
            });
        }

        // A download that is not GRIB at all (an error page, a truncated body)
        // parses to zero messages
        if messages == 0 {
            return Err(Grib2Error::Parse(format!(
                "no GRIB2 messages in {}",
                path.display()
            )));
        }

        Ok(grids)
    }
}

/// Map 0..360 longitudes onto -180..180.
fn normalize_longitude(lon: f32) -> f32 {
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}
