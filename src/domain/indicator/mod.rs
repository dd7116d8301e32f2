//! Technical indicator implementations.
//!
//! Every indicator produces a [`Column`]: one `Option<f64>` per input bar,
//! `None` until the trailing window holds enough points. Rolling statistics
//! share the [`RollingWindow`] accumulator so that each new point costs O(1).

pub mod bollinger;
pub mod ema;
pub mod returns;
pub mod rsi;
pub mod sma;
pub mod stddev;

use std::fmt;

/// Values aligned index-for-index with the source series.
pub type Column = Vec<Option<f64>>;

/// Named columns of the extended series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorColumn {
    Ma20,
    Ma50,
    Ema20,
    DailyReturn,
    Volatility,
    VolumeMa20,
    VolumeRatio,
    Rsi,
    BbMiddle,
    BbUpper,
    BbLower,
}

impl IndicatorColumn {
    pub const ALL: [IndicatorColumn; 11] = [
        IndicatorColumn::Ma20,
        IndicatorColumn::Ma50,
        IndicatorColumn::Ema20,
        IndicatorColumn::DailyReturn,
        IndicatorColumn::Volatility,
        IndicatorColumn::VolumeMa20,
        IndicatorColumn::VolumeRatio,
        IndicatorColumn::Rsi,
        IndicatorColumn::BbMiddle,
        IndicatorColumn::BbUpper,
        IndicatorColumn::BbLower,
    ];

    /// Columns that must all be defined for a row to be indicator-complete.
    pub const REQUIRED: [IndicatorColumn; 9] = [
        IndicatorColumn::Ma20,
        IndicatorColumn::Ma50,
        IndicatorColumn::Rsi,
        IndicatorColumn::BbMiddle,
        IndicatorColumn::BbUpper,
        IndicatorColumn::BbLower,
        IndicatorColumn::Volatility,
        IndicatorColumn::VolumeMa20,
        IndicatorColumn::VolumeRatio,
    ];
}

impl fmt::Display for IndicatorColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorColumn::Ma20 => "MA20",
            IndicatorColumn::Ma50 => "MA50",
            IndicatorColumn::Ema20 => "EMA20",
            IndicatorColumn::DailyReturn => "Daily_Return",
            IndicatorColumn::Volatility => "Volatility",
            IndicatorColumn::VolumeMa20 => "Volume_MA20",
            IndicatorColumn::VolumeRatio => "Volume_Ratio",
            IndicatorColumn::Rsi => "RSI",
            IndicatorColumn::BbMiddle => "BB_Middle",
            IndicatorColumn::BbUpper => "BB_Upper",
            IndicatorColumn::BbLower => "BB_Lower",
        };
        f.write_str(name)
    }
}

/// Fixed-capacity ring of the most recent values with a sliding mean and
/// sum of squared deviations (Welford update on insert and eviction).
/// The running moments are recomputed from the buffer once per full
/// revolution so rounding drift stays bounded. A window holding a single
/// repeated value reports that value and zero spread exactly.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: Vec<f64>,
    pos: usize,
    len: usize,
    mean: f64,
    m2: f64,
    /// Length of the trailing run of values equal to the newest one.
    run: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling window capacity must be positive");
        Self {
            buf: vec![0.0; capacity],
            pos: 0,
            len: 0,
            mean: 0.0,
            m2: 0.0,
            run: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    pub fn push(&mut self, value: f64) {
        let cap = self.buf.len();
        let newest = self.buf[(self.pos + cap - 1) % cap];
        self.run = if self.len > 0 && newest == value {
            self.run + 1
        } else {
            1
        };

        if self.len < cap {
            self.len += 1;
            let delta = value - self.mean;
            self.mean += delta / self.len as f64;
            self.m2 += delta * (value - self.mean);
        } else {
            let evicted = self.buf[self.pos];
            let old_mean = self.mean;
            self.mean += (value - evicted) / cap as f64;
            self.m2 += (value - evicted) * (value - self.mean + evicted - old_mean);
            if self.m2 < 0.0 {
                self.m2 = 0.0;
            }
        }
        self.buf[self.pos] = value;
        self.pos = (self.pos + 1) % cap;
        if self.run >= self.len {
            self.mean = value;
            self.m2 = 0.0;
        } else if self.pos == 0 && self.is_full() {
            self.resync();
        }
    }

    fn resync(&mut self) {
        let n = self.buf.len() as f64;
        self.mean = self.buf.iter().sum::<f64>() / n;
        self.m2 = self.buf.iter().map(|v| (v - self.mean).powi(2)).sum();
    }

    pub fn clear(&mut self) {
        self.pos = 0;
        self.len = 0;
        self.mean = 0.0;
        self.m2 = 0.0;
        self.run = 0;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.len > 0).then_some(self.mean)
    }

    /// Sample (n-1) standard deviation.
    pub fn sample_std(&self) -> Option<f64> {
        (self.len > 1).then(|| (self.m2 / (self.len - 1) as f64).sqrt())
    }
}

/// Slide a window of `period` over `values`, emitting `stat` once the window
/// is full. An undefined input restarts the window.
pub fn rolling_apply<I, F>(values: I, period: usize, stat: F) -> Column
where
    I: IntoIterator<Item = Option<f64>>,
    F: Fn(&RollingWindow) -> Option<f64>,
{
    if period == 0 {
        return values.into_iter().map(|_| None).collect();
    }

    let mut window = RollingWindow::new(period);
    values
        .into_iter()
        .map(|value| match value.filter(|v| v.is_finite()) {
            Some(v) => {
                window.push(v);
                if window.is_full() { stat(&window) } else { None }
            }
            None => {
                window.clear();
                None
            }
        })
        .collect()
}

/// Drop non-finite results so they read as undefined downstream.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn indicator_column_display() {
        assert_eq!(IndicatorColumn::Ma20.to_string(), "MA20");
        assert_eq!(IndicatorColumn::VolumeMa20.to_string(), "Volume_MA20");
        assert_eq!(IndicatorColumn::BbUpper.to_string(), "BB_Upper");
    }

    #[test]
    fn required_columns_exclude_ema_and_return() {
        assert!(!IndicatorColumn::REQUIRED.contains(&IndicatorColumn::Ema20));
        assert!(!IndicatorColumn::REQUIRED.contains(&IndicatorColumn::DailyReturn));
    }

    #[test]
    fn window_fills_then_slides() {
        let mut w = RollingWindow::new(3);
        assert!(w.is_empty());
        w.push(1.0);
        w.push(2.0);
        assert!(!w.is_full());
        w.push(3.0);
        assert!(w.is_full());
        assert_relative_eq!(w.mean().unwrap(), 2.0);
        w.push(10.0);
        assert_eq!(w.len(), 3);
        assert_relative_eq!(w.mean().unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn window_sample_std_matches_direct_computation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0, 3.0, 1.0];
        let mut w = RollingWindow::new(8);
        for v in values {
            w.push(v);
        }
        let tail = &values[2..];
        let mean = tail.iter().sum::<f64>() / 8.0;
        let var = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 7.0;
        assert_relative_eq!(w.sample_std().unwrap(), var.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn window_constant_values_have_zero_std() {
        let mut w = RollingWindow::new(5);
        for _ in 0..12 {
            w.push(100.0);
        }
        assert_eq!(w.sample_std(), Some(0.0));
        assert_eq!(w.mean(), Some(100.0));
    }

    #[test]
    fn window_constant_after_movement_is_exact() {
        let mut w = RollingWindow::new(5);
        for v in [0.1, 0.7, 0.3, 1.9, 0.2, 0.6, 1.3] {
            w.push(v);
        }
        for _ in 0..4 {
            w.push(0.0);
        }
        assert!(w.sample_std().unwrap() > 0.0);

        w.push(0.0);
        assert_eq!(w.mean(), Some(0.0));
        assert_eq!(w.sample_std(), Some(0.0));

        for _ in 0..5 {
            w.push(101.37);
        }
        assert_eq!(w.mean(), Some(101.37));
        assert_eq!(w.sample_std(), Some(0.0));
    }

    #[test]
    fn window_run_restarts_on_new_value() {
        let mut w = RollingWindow::new(3);
        for v in [2.0, 2.0, 2.0, 5.0] {
            w.push(v);
        }
        assert_relative_eq!(w.mean().unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(w.sample_std().unwrap(), 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn window_clear_resets() {
        let mut w = RollingWindow::new(2);
        w.push(1.0);
        w.push(2.0);
        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.mean(), None);
        assert_eq!(w.capacity(), 2);
    }

    #[test]
    fn rolling_apply_restarts_after_gap() {
        let values = vec![Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)];
        let out = rolling_apply(values, 2, RollingWindow::mean);
        assert_eq!(out, vec![None, Some(1.5), None, None, Some(3.5)]);
    }

    #[test]
    fn rolling_apply_zero_period_is_undefined() {
        let out = rolling_apply(vec![Some(1.0), Some(2.0)], 0, RollingWindow::mean);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn finite_filters_infinities() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NEG_INFINITY), None);
        assert_eq!(finite(f64::NAN), None);
    }
}
