//! The `TimeSeries` cube.

use chrono::{DateTime, NaiveDate, Utc};
use icon_common::Variable;

use crate::error::{GridError, Result};

/// A `[time, lat, lon]` cube for one variable.
///
/// `data` is row-major with `lon` varying fastest. NaN marks grid points
/// without data.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub variable: Variable,
    pub time: Vec<DateTime<Utc>>,
    pub lat: Vec<f32>,
    pub lon: Vec<f32>,
    pub data: Vec<f32>,
}

impl TimeSeries {
    /// Create a series, checking that `data` matches the axes.
    pub fn new(
        variable: Variable,
        time: Vec<DateTime<Utc>>,
        lat: Vec<f32>,
        lon: Vec<f32>,
        data: Vec<f32>,
    ) -> Result<Self> {
        let expected = time.len() * lat.len() * lon.len();
        if data.len() != expected {
            return Err(GridError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            variable,
            time,
            lat,
            lon,
            data,
        })
    }

    /// A series with no timesteps on the given grid.
    pub fn empty(variable: Variable, lat: Vec<f32>, lon: Vec<f32>) -> Self {
        Self {
            variable,
            time: Vec::new(),
            lat,
            lon,
            data: Vec::new(),
        }
    }

    /// (time, lat, lon) dimensions.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.lat.len(), self.lon.len())
    }

    /// Number of values in one timestep.
    pub fn frame_len(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Values of timestep `t`.
    pub fn frame(&self, t: usize) -> &[f32] {
        let n = self.frame_len();
        &self.data[t * n..(t + 1) * n]
    }

    /// Value at `(t, y, x)`, or `None` when out of bounds.
    pub fn get(&self, t: usize, y: usize, x: usize) -> Option<f32> {
        if t >= self.time.len() || y >= self.lat.len() || x >= self.lon.len() {
            return None;
        }
        Some(self.data[(t * self.lat.len() + y) * self.lon.len() + x])
    }

    /// Append one timestep.
    pub fn push_frame(&mut self, time: DateTime<Utc>, frame: &[f32]) -> Result<()> {
        if frame.len() != self.frame_len() {
            return Err(GridError::ShapeMismatch {
                expected: self.frame_len(),
                actual: frame.len(),
            });
        }
        self.time.push(time);
        self.data.extend_from_slice(frame);
        Ok(())
    }

    /// Gather a new series from index lists on each axis.
    ///
    /// Indices may repeat or be reordered; they must be in bounds.
    pub fn select(&self, t_idx: &[usize], y_idx: &[usize], x_idx: &[usize]) -> Self {
        let (_, ny, nx) = self.shape();
        let mut data = Vec::with_capacity(t_idx.len() * y_idx.len() * x_idx.len());
        for &t in t_idx {
            for &y in y_idx {
                let row = (t * ny + y) * nx;
                data.extend(x_idx.iter().map(|&x| self.data[row + x]));
            }
        }
        Self {
            variable: self.variable,
            time: t_idx.iter().map(|&t| self.time[t]).collect(),
            lat: y_idx.iter().map(|&y| self.lat[y]).collect(),
            lon: x_idx.iter().map(|&x| self.lon[x]).collect(),
            data,
        }
    }

    /// Timesteps whose calendar date is `date`.
    pub fn select_date(&self, date: NaiveDate) -> Self {
        let t_idx: Vec<usize> = (0..self.time.len())
            .filter(|&t| self.time[t].date_naive() == date)
            .collect();
        let y_idx: Vec<usize> = (0..self.lat.len()).collect();
        let x_idx: Vec<usize> = (0..self.lon.len()).collect();
        self.select(&t_idx, &y_idx, &x_idx)
    }

    /// Distinct calendar dates in time order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        for t in &self.time {
            let date = t.date_naive();
            if !dates.contains(&date) {
                dates.push(date);
            }
        }
        dates
    }

    /// Same lat/lon axes (exact comparison, after normalisation).
    pub fn same_grid(&self, other: &TimeSeries) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample() -> TimeSeries {
        let t0 = Utc.with_ymd_and_hms(2025, 2, 26, 22, 0, 0).unwrap();
        let time = (0..4).map(|i| t0 + Duration::hours(i)).collect();
        let data = (0..4 * 2 * 3).map(|v| v as f32).collect();
        TimeSeries::new(
            Variable::Temperature,
            time,
            vec![45.0, 46.0],
            vec![10.0, 11.0, 12.0],
            data,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_shape() {
        let err = TimeSeries::new(Variable::Temperature, vec![], vec![1.0], vec![1.0], vec![0.0])
            .unwrap_err();
        assert_eq!(
            err,
            GridError::ShapeMismatch {
                expected: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn test_indexing() {
        let series = sample();
        assert_eq!(series.shape(), (4, 2, 3));
        assert_eq!(series.get(0, 0, 0), Some(0.0));
        assert_eq!(series.get(1, 1, 2), Some(11.0));
        assert_eq!(series.get(4, 0, 0), None);
        assert_eq!(series.frame(2), &[12.0, 13.0, 14.0, 15.0, 16.0, 17.0]);
    }

    #[test]
    fn test_select_reorders() {
        let series = sample();
        let sub = series.select(&[1], &[1, 0], &[2]);
        assert_eq!(sub.shape(), (1, 2, 1));
        assert_eq!(sub.lat, vec![46.0, 45.0]);
        assert_eq!(sub.data, vec![11.0, 8.0]);
    }

    #[test]
    fn test_dates_and_select_date() {
        let series = sample();
        let dates = series.dates();
        assert_eq!(dates.len(), 2);

        let first = series.select_date(dates[0]);
        assert_eq!(first.len(), 2);
        let second = series.select_date(dates[1]);
        assert_eq!(second.len(), 2);
        assert_eq!(second.get(0, 0, 0), Some(12.0));
    }

    #[test]
    fn test_push_frame() {
        let mut series = TimeSeries::empty(Variable::Temperature, vec![1.0], vec![1.0, 2.0]);
        let t = Utc.with_ymd_and_hms(2025, 2, 26, 0, 0, 0).unwrap();
        series.push_frame(t, &[1.0, 2.0]).unwrap();
        assert!(series.push_frame(t, &[1.0]).is_err());
        assert_eq!(series.len(), 1);
    }
}
