//! Bollinger Bands.
//!
//! - Middle: SMA(n) of close
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation (divides by n-1).
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::{finite, Column, RollingWindow};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: Column,
    pub upper: Column,
    pub lower: Column,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, stddev_mult_x100: u32) -> BollingerBands {
    let mut bands = BollingerBands {
        middle: Vec::with_capacity(closes.len()),
        upper: Vec::with_capacity(closes.len()),
        lower: Vec::with_capacity(closes.len()),
    };

    if period < 2 {
        bands.middle.resize(closes.len(), None);
        bands.upper.resize(closes.len(), None);
        bands.lower.resize(closes.len(), None);
        return bands;
    }

    let mult = stddev_mult_x100 as f64 / 100.0;
    let mut window = RollingWindow::new(period);

    for &close in closes {
        window.push(close);
        let point = match (window.is_full(), window.mean(), window.sample_std()) {
            (true, Some(middle), Some(std)) => (
                finite(middle),
                finite(middle + mult * std),
                finite(middle - mult * std),
            ),
            _ => (None, None, None),
        };
        bands.middle.push(point.0);
        bands.upper.push(point.1);
        bands.lower.push(point.2);
    }

    bands
}
