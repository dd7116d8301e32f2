//! Rolling standard deviation.
//!
//! Sample standard deviation (divides by n-1) over the trailing n values.
//! Warmup: first (n-1) values are undefined; an undefined input restarts
//! the window, so a gap needs n fresh values before output resumes.

use crate::domain::indicator::{rolling_apply, Column, RollingWindow};

pub fn calculate_stddev(values: &[Option<f64>], period: usize) -> Column {
    if period < 2 {
        return vec![None; values.len()];
    }
    rolling_apply(values.iter().copied(), period, RollingWindow::sample_std)
}
