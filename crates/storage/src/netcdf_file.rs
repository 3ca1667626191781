//! NetCDF encoding of a date partition.
//!
//! One file holds one variable on one calendar date:
//!
//! - coordinate variables `time` (seconds since the Unix epoch), `lat`, `lon`
//! - a data variable named after the variable code, dimensioned `(time, lat, lon)`
//! - global attributes `dataset`, `variable` and `date`
//!
//! The netcdf library works on paths, so partitions are always staged on disk.

use chrono::{DateTime, NaiveDate};
use std::path::Path;
use tracing::debug;

use grid_processor::{DatePartition, TimeSeries};
use icon_common::{Variable, DATASET_NAME};

use crate::error::{Result, StorageError};

/// CF units of the `time` coordinate.
pub const TIME_UNITS: &str = "seconds since 1970-01-01 00:00:00";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write `partition` to a new NetCDF file at `path`, replacing any existing file.
pub fn write_partition(partition: &DatePartition, path: &Path) -> Result<()> {
    let name = path.display().to_string();
    let nc = |e: netcdf::Error| StorageError::netcdf(&name, e);
    let series = &partition.series;
    let seconds: Vec<i64> = series.time.iter().map(|t| t.timestamp()).collect();

    let mut file = netcdf::create(path).map_err(nc)?;
    file.add_attribute("dataset", DATASET_NAME).map_err(nc)?;
    file.add_attribute("variable", series.variable.code())
        .map_err(nc)?;
    file.add_attribute("date", partition.date.format(DATE_FORMAT).to_string())
        .map_err(nc)?;

    file.add_dimension("time", seconds.len()).map_err(nc)?;
    file.add_dimension("lat", series.lat.len()).map_err(nc)?;
    file.add_dimension("lon", series.lon.len()).map_err(nc)?;

    {
        let mut time = file.add_variable::<i64>("time", &["time"]).map_err(nc)?;
        time.put_attribute("units", TIME_UNITS).map_err(nc)?;
        time.put_values(&seconds, ..).map_err(nc)?;
    }
    {
        let mut lat = file.add_variable::<f32>("lat", &["lat"]).map_err(nc)?;
        lat.put_attribute("units", "degrees_north").map_err(nc)?;
        lat.put_values(&series.lat, ..).map_err(nc)?;
    }
    {
        let mut lon = file.add_variable::<f32>("lon", &["lon"]).map_err(nc)?;
        lon.put_attribute("units", "degrees_east").map_err(nc)?;
        lon.put_values(&series.lon, ..).map_err(nc)?;
    }
    {
        let mut data = file
            .add_variable::<f32>(series.variable.code(), &["time", "lat", "lon"])
            .map_err(nc)?;
        data.set_fill_value(f32::NAN).map_err(nc)?;
        data.put_values(&series.data, ..).map_err(nc)?;
    }

    debug!(path = %name, steps = seconds.len(), "Wrote NetCDF partition");
    Ok(())
}

/// Read a partition written by [`write_partition`].
pub fn read_partition(path: &Path) -> Result<DatePartition> {
    let name = path.display().to_string();
    let nc = |e: netcdf::Error| StorageError::netcdf(&name, e);

    let file = netcdf::open(path).map_err(nc)?;

    let variable: Variable = text_attribute(&file, "variable", &name)?
        .parse()
        .map_err(|e| StorageError::netcdf(&name, e))?;
    let date = NaiveDate::parse_from_str(&text_attribute(&file, "date", &name)?, DATE_FORMAT)
        .map_err(|e| StorageError::netcdf(&name, e))?;

    let seconds = variable_of(&file, "time", &name)?
        .get_values::<i64, _>(..)
        .map_err(nc)?;
    let time = seconds
        .into_iter()
        .map(|s| {
            DateTime::from_timestamp(s, 0)
                .ok_or_else(|| StorageError::netcdf(&name, format!("time {} out of range", s)))
        })
        .collect::<Result<Vec<_>>>()?;
    let lat = variable_of(&file, "lat", &name)?
        .get_values::<f32, _>(..)
        .map_err(nc)?;
    let lon = variable_of(&file, "lon", &name)?
        .get_values::<f32, _>(..)
        .map_err(nc)?;
    let data = variable_of(&file, variable.code(), &name)?
        .get_values::<f32, _>(..)
        .map_err(nc)?;

    let series = TimeSeries::new(variable, time, lat, lon, data)
        .map_err(|e| StorageError::netcdf(&name, e))?;
    Ok(DatePartition::new(date, series))
}

fn variable_of<'f>(file: &'f netcdf::File, var: &str, name: &str) -> Result<netcdf::Variable<'f>> {
    file.variable(var)
        .ok_or_else(|| StorageError::netcdf(name, format!("missing variable \"{}\"", var)))
}

fn text_attribute(file: &netcdf::File, attr: &str, name: &str) -> Result<String> {
    match file.attribute(attr).map(|a| a.value()) {
        Some(Ok(netcdf::AttributeValue::Str(value))) => Ok(value),
        _ => Err(StorageError::netcdf(
            name,
            format!("missing text attribute \"{}\"", attr),
        )),
    }
}
