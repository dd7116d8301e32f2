//! Chart-pattern detection over the most recent bars.
//!
//! Only a coarse double-bottom check is performed: two or more local minima
//! of the low within the window. Amplitude and symmetry are not considered.

use crate::domain::error::Stage;
use crate::domain::extended_series::ExtendedSeries;
use crate::domain::label::label_enum;
use serde::Serialize;

pub const PATTERN_WINDOW: usize = 20;
pub const MIN_PATTERN_ROWS: usize = 10;

label_enum! {
    PatternQuality {
        Moderate => "MODERATE",
        Low => "LOW",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub double_bottom: bool,
    pub double_top: bool,
    pub trend_line_break: bool,
    pub support_level: Option<f64>,
    pub resistance_level: Option<f64>,
    pub pattern_quality: PatternQuality,
}

impl Default for PatternReport {
    fn default() -> Self {
        Self {
            double_bottom: false,
            double_top: false,
            trend_line_break: false,
            support_level: None,
            resistance_level: None,
            pattern_quality: PatternQuality::Low,
        }
    }
}

/// Indices `i` with `lows[i] < lows[i-1]` and `lows[i] < lows[i+1]`.
pub fn local_minima(lows: &[f64]) -> Vec<usize> {
    lows.windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] < w[0] && w[1] < w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

pub fn detect_patterns(series: &ExtendedSeries) -> PatternReport {
    let recent = series.tail(PATTERN_WINDOW);
    let mut report = PatternReport::default();

    if recent.len() >= MIN_PATTERN_ROWS {
        let lows: Vec<f64> = recent.iter().map(|b| b.low).collect();
        if local_minima(&lows).len() >= 2 {
            report.double_bottom = true;
            report.pattern_quality = PatternQuality::Moderate;
        }
    }

    tracing::info!(
        stage = %Stage::Pattern,
        window = recent.len(),
        double_bottom = report.double_bottom,
        "pattern analysis completed"
    );
    report
}
