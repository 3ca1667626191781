//! Time handling for forecast runs and request windows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-8601 layout used for every timestamp we emit.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Invalid forecast run \"{0}\". Must be a valid 12h interval")]
    NotARunHour(String),
}

/// Parse an ISO-8601 string.
///
/// Accepts RFC 3339 (offset converted to UTC), naive date-times (taken as
/// UTC, fractional seconds allowed) and bare dates (midnight).
pub fn parse_iso(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, layout) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.format(ISO_FORMAT).to_string()
}

/// Round a timestamp down to the previous 5-minute mark.
pub fn floor_to_five_minutes(dt: DateTime<Utc>) -> DateTime<Utc> {
    let minute = (dt.minute() / 5) * 5;
    dt.with_minute(minute)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// Every calendar date between `start` and `end`, inclusive.
pub fn dates_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut date = start.date_naive();
    let last = end.date_naive();
    while date <= last {
        dates.push(date);
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    dates
}

/// Reference timestamp of one published model run (00:00 or 12:00 UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForecastRun(DateTime<Utc>);

impl ForecastRun {
    /// Cycle hours published for ICON-2I.
    pub const RUN_HOURS: [u32; 2] = [0, 12];

    /// Accepts only timestamps exactly on a 00/12 UTC boundary.
    pub fn new(reference_time: DateTime<Utc>) -> Result<Self, TimeParseError> {
        let on_boundary = Self::RUN_HOURS.contains(&reference_time.hour())
            && reference_time.minute() == 0
            && reference_time.second() == 0
            && reference_time.nanosecond() == 0;
        if on_boundary {
            Ok(Self(reference_time))
        } else {
            Err(TimeParseError::NotARunHour(format_iso(&reference_time)))
        }
    }

    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        Self::new(parse_iso(s)?)
    }

    /// Combine a listing's `date` and `run` fields (e.g. "2025-02-26", "12:00").
    pub fn from_date_and_run(date: &str, run: &str) -> Result<Self, TimeParseError> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| TimeParseError::InvalidFormat(date.to_string()))?;
        let time = ["%H:%M:%S", "%H:%M", "%H"]
            .iter()
            .find_map(|layout| NaiveTime::parse_from_str(run.trim(), layout).ok())
            .ok_or_else(|| TimeParseError::InvalidFormat(run.to_string()))?;
        Self::new(Utc.from_utc_datetime(&date.and_time(time)))
    }

    /// Midnight run of a calendar date.
    pub fn midnight(date: NaiveDate) -> Self {
        Self(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl fmt::Display for ForecastRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_iso(&self.0))
    }
}
