//! Request validation, run before any pipeline I/O.

use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;

use grid_processor::AxisSelector;
use icon_common::time::floor_to_five_minutes;
use icon_common::{parse_iso, ForecastRun, TimeParseError, Variable};
use storage::S3Uri;

use crate::error::{PipelineError, Result};
use crate::request::{IngestRequest, OneOrMany, RetrieveRequest};

/// Only forecast windows this recent can be retrieved.
pub const MAX_WINDOW_AGE_HOURS: i64 = 48;

/// Raster formats a retrieval can produce.
pub const OUT_FORMATS: [&str; 1] = ["tif"];

/// Checked ingestion inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidIngest {
    pub variables: Vec<Variable>,
    pub forecast_runs: Option<Vec<ForecastRun>>,
    pub out_dir: Option<PathBuf>,
    pub bucket_destination: Option<S3Uri>,
}

/// Checked retrieval inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRetrieve {
    pub variables: Vec<Variable>,
    pub lat: Option<AxisSelector>,
    pub lon: Option<AxisSelector>,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub out_format: String,
    /// Defaults to `bucket_destination`.
    pub bucket_source: Option<S3Uri>,
    pub bucket_destination: Option<S3Uri>,
    pub out: Option<PathBuf>,
}

pub fn validate_ingest(request: &IngestRequest) -> Result<ValidIngest> {
    let variables = variables(request.variable.as_ref())?;

    let forecast_runs = match &request.forecast_run {
        None => None,
        Some(runs) => Some(
            runs.clone()
                .into_vec()
                .iter()
                .map(|run| forecast_run(run))
                .collect::<Result<Vec<_>>>()?,
        ),
    };

    Ok(ValidIngest {
        variables,
        forecast_runs,
        out_dir: request.out_dir.as_ref().map(PathBuf::from),
        bucket_destination: bucket("bucket_destination", request.bucket_destination.as_deref())?,
    })
}

/// Validate a retrieval; `now` anchors the 48 hour limit.
pub fn validate_retrieve(request: &RetrieveRequest, now: DateTime<Utc>) -> Result<ValidRetrieve> {
    let variables = variables(request.variable.as_ref())?;
    let lat = axis("lat_range", request.lat_range.as_ref(), 90.0)?;
    let lon = axis("long_range", request.long_range.as_ref(), 180.0)?;
    let (time_start, time_end) = time_range(request.time_range.as_ref(), now)?;

    let out_format = match request.out_format.as_deref() {
        None => OUT_FORMATS[0].to_string(),
        Some(format) if OUT_FORMATS.contains(&format) => format.to_string(),
        Some(_) => {
            return Err(PipelineError::invalid(format!(
                "out_format must be one of {:?}",
                OUT_FORMATS
            )))
        }
    };

    let bucket_destination = bucket("bucket_destination", request.bucket_destination.as_deref())?;
    let bucket_source = match bucket("bucket_source", request.bucket_source.as_deref())? {
        Some(source) => Some(source),
        None => bucket_destination.clone(),
    };

    let out = match request.out.as_deref() {
        Some(out) if !out.ends_with(".tif") => {
            return Err(PipelineError::invalid("out must end with \".tif\""))
        }
        out => out.map(PathBuf::from),
    };

    Ok(ValidRetrieve {
        variables,
        lat,
        lon,
        time_start,
        time_end,
        out_format,
        bucket_source,
        bucket_destination,
        out,
    })
}

/// Requested variables, or all of them.
fn variables(requested: Option<&OneOrMany<String>>) -> Result<Vec<Variable>> {
    let Some(requested) = requested else {
        return Ok(Variable::ALL.to_vec());
    };
    let codes = requested.clone().into_vec();
    if codes.is_empty() {
        return Err(PipelineError::invalid("variable must not be an empty list"));
    }
    let mut variables = Vec::with_capacity(codes.len());
    for code in codes {
        let variable = code
            .parse::<Variable>()
            .map_err(|e| PipelineError::invalid(e.to_string()))?;
        if !variables.contains(&variable) {
            variables.push(variable);
        }
    }
    Ok(variables)
}

fn forecast_run(run: &str) -> Result<ForecastRun> {
    ForecastRun::parse(run).map_err(|e| match e {
        TimeParseError::InvalidFormat(_) => PipelineError::invalid(format!(
            "Invalid forecast run \"{}\". Must be a valid ISO format date string",
            run
        )),
        not_a_run => PipelineError::invalid(not_a_run.to_string()),
    })
}

fn bucket(name: &str, value: Option<&str>) -> Result<Option<S3Uri>> {
    value
        .map(|uri| {
            S3Uri::parse(uri)
                .map_err(|_| PipelineError::invalid(format!("{} must start with \"s3://\"", name)))
        })
        .transpose()
}

/// A `[min, max]` range or a single nearest-neighbour coordinate within
/// `[-limit, limit]`.
fn axis(name: &str, value: Option<&OneOrMany<f64>>, limit: f64) -> Result<Option<AxisSelector>> {
    let in_bounds = |v: f64| v.is_finite() && (-limit..=limit).contains(&v);
    let out_of_range = || {
        PipelineError::invalid(format!(
            "{} elements must be in the range [-{}, {}]",
            name, limit, limit
        ))
    };

    match value {
        None => Ok(None),
        Some(OneOrMany::One(point)) => {
            if !in_bounds(*point) {
                return Err(out_of_range());
            }
            Ok(Some(AxisSelector::Nearest(*point)))
        }
        Some(OneOrMany::Many(range)) => {
            let &[min, max] = range.as_slice() else {
                return Err(PipelineError::invalid(format!(
                    "{} must be a list of 2 elements",
                    name
                )));
            };
            if !in_bounds(min) || !in_bounds(max) {
                return Err(out_of_range());
            }
            if min > max {
                return Err(PipelineError::invalid(format!(
                    "{}[0] must be less than {}[1]",
                    name, name
                )));
            }
            Ok(Some(AxisSelector::Range(min, max)))
        }
    }
}

/// Start and end of the window, floored to 5 minutes.
///
/// A missing end is one hour after the start.
fn time_range(
    value: Option<&OneOrMany<String>>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let parts = value.map(|v| v.clone().into_vec()).unwrap_or_default();
    if parts.len() > 2 {
        return Err(PipelineError::invalid(
            "time_range must be a timestamp or a list of 2 timestamps",
        ));
    }
    let mut parts = parts.iter();
    let start = parts
        .next()
        .ok_or_else(|| PipelineError::invalid("Cannot process without a time value"))?;
    let start = parse_iso(start).map_err(|_| {
        PipelineError::invalid("time_start must be a valid datetime iso-format string")
    })?;
    let end = parts
        .next()
        .map(|end| {
            parse_iso(end).map_err(|_| {
                PipelineError::invalid("time_end must be a valid datetime iso-format string")
            })
        })
        .transpose()?;

    if let Some(end) = end {
        if start > end {
            return Err(PipelineError::invalid("time_start must be less than time_end"));
        }
    }

    let start = floor_to_five_minutes(start);
    let end = match end {
        Some(end) => floor_to_five_minutes(end),
        None => start + Duration::hours(1),
    };
    if end < now - Duration::hours(MAX_WINDOW_AGE_HOURS) {
        return Err(PipelineError::invalid(
            "Time range must be within the last 48 hours",
        ));
    }
    Ok((start, end))
}
