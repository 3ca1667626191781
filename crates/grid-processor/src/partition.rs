//! Per-calendar-date slices of a series.

use chrono::NaiveDate;
use icon_common::dataset::{partition_filename, partition_key};
use icon_common::Variable;

use crate::series::TimeSeries;

/// The timesteps of one variable falling on one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DatePartition {
    pub variable: Variable,
    pub date: NaiveDate,
    pub series: TimeSeries,
}

impl DatePartition {
    pub fn new(date: NaiveDate, series: TimeSeries) -> Self {
        Self {
            variable: series.variable,
            date,
            series,
        }
    }

    /// `{dataset}__{variable}__{date}`
    pub fn key(&self) -> String {
        partition_key(self.variable, self.date)
    }

    pub fn filename(&self) -> String {
        partition_filename(self.variable, self.date)
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
