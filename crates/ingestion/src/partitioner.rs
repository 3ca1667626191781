//! Splitting a series into calendar-date partitions.

use chrono::NaiveDate;
use tracing::debug;

use grid_processor::{DatePartition, TimeSeries};

/// Step count of a partial day left behind by a superseded run.
pub const STALE_PARTIAL_DAY_STEPS: usize = 12;

/// One partition per calendar date of `series`, in date order.
///
/// A partition dated before `today` with exactly 12 steps is the leftover of
/// an older run and is dropped.
pub fn partition_by_date(series: &TimeSeries, today: NaiveDate) -> Vec<DatePartition> {
    series
        .dates()
        .into_iter()
        .map(|date| DatePartition::new(date, series.select_date(date)))
        .filter(|p| {
            let stale = p.date < today && p.len() == STALE_PARTIAL_DAY_STEPS;
            if stale {
                debug!(
                    variable = %p.variable,
                    date = %p.date,
                    steps = p.len(),
                    "Discarding stale partial day"
                );
            }
            !stale
        })
        .collect()
}
