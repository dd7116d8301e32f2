//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(V[i-n+1..=i]) over any value column (close, volume).
//! Warmup: first (n-1) points are undefined.

use crate::domain::indicator::{rolling_apply, Column, RollingWindow};

pub fn calculate_sma(values: &[f64], period: usize) -> Column {
    rolling_apply(values.iter().copied().map(Some), period, RollingWindow::mean)
}
