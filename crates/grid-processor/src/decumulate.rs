//! Running-total to per-step conversion.

use tracing::debug;

use crate::series::TimeSeries;

/// Replace running totals by first differences along the time axis.
///
/// `out[0] = A[0]`, `out[i] = A[i] - A[i-1]`. Works in place from the last
/// step backwards so every difference sees the original previous step.
pub fn decumulate(series: &mut TimeSeries) {
    let n = series.frame_len();
    if n == 0 {
        return;
    }
    for t in (1..series.len()).rev() {
        let (head, tail) = series.data.split_at_mut(t * n);
        let previous = &head[(t - 1) * n..];
        for (value, prev) in tail[..n].iter_mut().zip(previous) {
            *value -= *prev;
        }
    }
    debug!(variable = %series.variable, steps = series.len(), "Decumulated series");
}

/// Set negative values to zero, leaving NaN untouched.
pub fn clamp_negative(series: &mut TimeSeries) {
    for value in series.data.iter_mut() {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
}
