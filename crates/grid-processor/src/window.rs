//! Spatial and temporal windowing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::round_coordinate;
use crate::series::TimeSeries;

/// Selection on a lat or lon axis.
///
/// Deserializes from `[min, max]` (inclusive slice) or a bare number
/// (nearest grid point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSelector {
    Range(f64, f64),
    Nearest(f64),
}

/// Selection on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSelector {
    Range(DateTime<Utc>, DateTime<Utc>),
    Nearest(DateTime<Utc>),
}

impl AxisSelector {
    /// Indices of `axis` (ascending) selected by this selector.
    pub fn indices(&self, axis: &[f32]) -> Vec<usize> {
        match *self {
            AxisSelector::Range(min, max) => {
                let (min, max) = (round_coordinate(min as f32), round_coordinate(max as f32));
                (0..axis.len())
                    .filter(|&i| axis[i] >= min && axis[i] <= max)
                    .collect()
            }
            AxisSelector::Nearest(target) => nearest(axis.len(), |i| (axis[i] as f64 - target).abs()),
        }
    }
}

impl TimeSelector {
    pub fn indices(&self, axis: &[DateTime<Utc>]) -> Vec<usize> {
        match *self {
            TimeSelector::Range(start, end) => (0..axis.len())
                .filter(|&i| axis[i] >= start && axis[i] <= end)
                .collect(),
            TimeSelector::Nearest(target) => nearest(axis.len(), |i| {
                (axis[i] - target).num_milliseconds().unsigned_abs() as f64
            }),
        }
    }
}

/// Index with the smallest distance, first one on ties.
fn nearest(len: usize, distance: impl Fn(usize) -> f64) -> Vec<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 0..len {
        let d = distance(i);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| vec![i]).unwrap_or_default()
}

/// Optional selectors on each axis. A missing selector keeps the whole axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Window {
    pub lat: Option<AxisSelector>,
    pub lon: Option<AxisSelector>,
    pub time: Option<TimeSelector>,
}

impl Window {
    /// Window on time only.
    pub fn time(selector: TimeSelector) -> Self {
        Self {
            time: Some(selector),
            ..Self::default()
        }
    }

    pub fn with_lat(mut self, selector: Option<AxisSelector>) -> Self {
        self.lat = selector;
        self
    }

    pub fn with_lon(mut self, selector: Option<AxisSelector>) -> Self {
        self.lon = selector;
        self
    }

    /// Apply to a normalised series. Nearest selections keep a length-1 axis.
    pub fn apply(&self, series: &TimeSeries) -> TimeSeries {
        let t_idx = match &self.time {
            Some(selector) => selector.indices(&series.time),
            None => (0..series.time.len()).collect(),
        };
        let y_idx = match &self.lat {
            Some(selector) => selector.indices(&series.lat),
            None => (0..series.lat.len()).collect(),
        };
        let x_idx = match &self.lon {
            Some(selector) => selector.indices(&series.lon),
            None => (0..series.lon.len()).collect(),
        };
        series.select(&t_idx, &y_idx, &x_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use icon_common::Variable;

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 26, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    fn cube() -> TimeSeries {
        let lat = vec![44.0, 44.5, 45.0, 45.5];
        let lon = vec![10.0, 10.5, 11.0];
        let time: Vec<_> = (0..24).map(t).collect();
        let data = (0..24 * 4 * 3).map(|v| v as f32).collect();
        TimeSeries::new(Variable::Temperature, time, lat, lon, data).unwrap()
    }

    #[test]
    fn test_range_is_inclusive() {
        let lat = [44.0, 44.5, 45.0, 45.5];
        assert_eq!(AxisSelector::Range(44.5, 45.0).indices(&lat), vec![1, 2]);
        assert_eq!(AxisSelector::Range(46.0, 47.0).indices(&lat), Vec::<usize>::new());
    }

    #[test]
    fn test_nearest() {
        let lat = [44.0, 44.5, 45.0, 45.5];
        assert_eq!(AxisSelector::Nearest(44.7).indices(&lat), vec![1]);
        assert_eq!(AxisSelector::Nearest(90.0).indices(&lat), vec![3]);
        assert_eq!(AxisSelector::Nearest(0.0).indices(&[]), Vec::<usize>::new());

        let times: Vec<_> = (0..4).map(t).collect();
        let target = t(2) + Duration::minutes(20);
        assert_eq!(TimeSelector::Nearest(target).indices(&times), vec![2]);
    }

    #[test]
    fn test_window_six_hours() {
        let series = cube();
        let window = Window::time(TimeSelector::Range(t(0), t(6)))
            .with_lat(Some(AxisSelector::Range(44.5, 45.5)))
            .with_lon(Some(AxisSelector::Nearest(10.9)));
        let out = window.apply(&series);
        assert_eq!(out.shape(), (7, 3, 1));
        assert_eq!(out.time.first(), Some(&t(0)));
        assert_eq!(out.time.last(), Some(&t(6)));
        assert_eq!(out.lon, vec![11.0]);
        assert_eq!(out.get(1, 0, 0), series.get(1, 1, 2));
    }

    #[test]
    fn test_window_is_idempotent() {
        let series = cube();
        let windows = [
            Window::time(TimeSelector::Range(t(3), t(9)))
                .with_lat(Some(AxisSelector::Range(44.2, 45.1))),
            Window::time(TimeSelector::Nearest(t(5)))
                .with_lon(Some(AxisSelector::Nearest(10.4))),
            Window::default(),
        ];
        for window in windows {
            let once = window.apply(&series);
            let twice = window.apply(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_selector_deserialization() {
        let range: AxisSelector = serde_json::from_str("[44.0, 45.0]").unwrap();
        assert_eq!(range, AxisSelector::Range(44.0, 45.0));
        let point: AxisSelector = serde_json::from_str("44.5").unwrap();
        assert_eq!(point, AxisSelector::Nearest(44.5));
    }
}
