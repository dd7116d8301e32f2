//! Trend, momentum and risk classification.
//!
//! Each report reduces the last two indicator-complete rows of an
//! [`ExtendedSeries`] to qualitative states. Ties resolve to the second
//! label (e.g. a close equal to MA50 is `BEARISH`).

use crate::domain::error::{AnalysisError, Stage};
use crate::domain::extended_series::{ExtendedSeries, IndicatorRow, RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::domain::label::{label_enum, Direction};
use serde::Serialize;

pub const HIGH_VOLUME_FACTOR: f64 = 1.5;
pub const LOW_VOLUME_FACTOR: f64 = 0.5;
pub const HIGH_VOLATILITY_FACTOR: f64 = 1.2;
pub const LOW_VOLATILITY_FACTOR: f64 = 0.8;

label_enum! {
    TrendDirection {
        Bullish => "BULLISH",
        Bearish => "BEARISH",
    }
}

label_enum! {
    RsiStatus {
        Overbought => "OVERBOUGHT",
        Oversold => "OVERSOLD",
        Neutral => "NEUTRAL",
    }
}

label_enum! {
    VolumeTrend {
        High => "HIGH",
        Low => "LOW",
        Normal => "NORMAL",
    }
}

label_enum! {
    PriceVolumeAlignment {
        Confirmed => "CONFIRMED",
        Divergent => "DIVERGENT",
    }
}

label_enum! {
    VolatilityLevel {
        High => "HIGH",
        Low => "LOW",
        Moderate => "MODERATE",
    }
}

label_enum! {
    BandPosition {
        UpperBand => "UPPER_BAND",
        LowerBand => "LOWER_BAND",
        Middle => "MIDDLE",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub direction: TrendDirection,
    /// Percent deviation of close from MA50.
    pub strength: f64,
    pub ma_crossover: TrendDirection,
    pub price_momentum: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomentumReport {
    pub rsi_status: RsiStatus,
    pub rsi_value: f64,
    pub rsi_trend: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub volume_trend: VolumeTrend,
    pub volume_direction: Direction,
    /// Percent change against the previous row; undefined when that volume is zero.
    pub volume_change: Option<f64>,
    pub price_volume_alignment: PriceVolumeAlignment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub volatility_level: VolatilityLevel,
    pub volatility_direction: Direction,
    /// Position of close within the band width; outside [0, 1] when a band is pierced.
    pub bb_position: Option<f64>,
    pub price_vs_bands: BandPosition,
    pub volume_analysis: VolumeAnalysis,
}

pub fn classify_trend(previous: &IndicatorRow, current: &IndicatorRow) -> TrendReport {
    TrendReport {
        direction: if current.close > current.ma50 {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        },
        strength: (current.close - current.ma50).abs() / current.ma50 * 100.0,
        ma_crossover: if current.ma20 > current.ma50 {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        },
        price_momentum: Direction::of(current.close, previous.close),
    }
}

pub fn classify_rsi(rsi: f64) -> RsiStatus {
    if rsi > RSI_OVERBOUGHT {
        RsiStatus::Overbought
    } else if rsi < RSI_OVERSOLD {
        RsiStatus::Oversold
    } else {
        RsiStatus::Neutral
    }
}

pub fn classify_momentum(previous: &IndicatorRow, current: &IndicatorRow) -> MomentumReport {
    MomentumReport {
        rsi_status: classify_rsi(current.rsi),
        rsi_value: current.rsi,
        rsi_trend: Direction::of(current.rsi, previous.rsi),
    }
}

pub fn classify_volume(previous: &IndicatorRow, current: &IndicatorRow) -> VolumeAnalysis {
    let volume_trend = if current.volume > current.volume_ma20 * HIGH_VOLUME_FACTOR {
        VolumeTrend::High
    } else if current.volume < current.volume_ma20 * LOW_VOLUME_FACTOR {
        VolumeTrend::Low
    } else {
        VolumeTrend::Normal
    };

    let volume_change = (previous.volume != 0.0)
        .then(|| (current.volume - previous.volume) / previous.volume * 100.0);

    let price_up = current.close > previous.close;
    let price_down = current.close < previous.close;
    let confirmed = (price_up && current.volume > current.volume_ma20)
        || (price_down && current.volume < current.volume_ma20);

    VolumeAnalysis {
        volume_trend,
        volume_direction: Direction::of(current.volume, previous.volume),
        volume_change,
        price_volume_alignment: if confirmed {
            PriceVolumeAlignment::Confirmed
        } else {
            PriceVolumeAlignment::Divergent
        },
    }
}

pub fn classify_volatility(current: f64, mean: f64) -> VolatilityLevel {
    if current > mean * HIGH_VOLATILITY_FACTOR {
        VolatilityLevel::High
    } else if current < mean * LOW_VOLATILITY_FACTOR {
        VolatilityLevel::Low
    } else {
        VolatilityLevel::Moderate
    }
}

pub fn classify_bands(row: &IndicatorRow) -> (Option<f64>, BandPosition) {
    let width = row.bb_upper - row.bb_lower;
    let position = (width > 0.0).then(|| (row.close - row.bb_lower) / width);

    let band = if row.close >= row.bb_upper {
        BandPosition::UpperBand
    } else if row.close <= row.bb_lower {
        BandPosition::LowerBand
    } else {
        BandPosition::Middle
    };
    (position, band)
}

pub fn classify_risk(
    previous: &IndicatorRow,
    current: &IndicatorRow,
    mean_volatility: f64,
) -> RiskReport {
    let (bb_position, price_vs_bands) = classify_bands(current);
    RiskReport {
        volatility_level: classify_volatility(current.volatility, mean_volatility),
        volatility_direction: Direction::of(current.volatility, previous.volatility),
        bb_position,
        price_vs_bands,
        volume_analysis: classify_volume(previous, current),
    }
}

fn latest_pair(
    series: &ExtendedSeries,
    stage: Stage,
) -> Result<(IndicatorRow, IndicatorRow), AnalysisError> {
    series.latest_pair().ok_or_else(|| {
        AnalysisError::InsufficientHistory {
            stage,
            rows: series.complete_row_count(),
            minimum: 2,
        }
        .logged(stage)
    })
}

pub fn analyze_trend(series: &ExtendedSeries) -> Result<TrendReport, AnalysisError> {
    let (previous, current) = latest_pair(series, Stage::Trend)?;
    let report = classify_trend(&previous, &current);
    tracing::info!(
        stage = %Stage::Trend,
        direction = %report.direction,
        "trend analysis completed"
    );
    Ok(report)
}

pub fn analyze_momentum(series: &ExtendedSeries) -> Result<MomentumReport, AnalysisError> {
    let (previous, current) = latest_pair(series, Stage::Momentum)?;
    let report = classify_momentum(&previous, &current);
    tracing::info!(
        stage = %Stage::Momentum,
        rsi_status = %report.rsi_status,
        rsi = report.rsi_value,
        "momentum analysis completed"
    );
    Ok(report)
}

pub fn analyze_risk(series: &ExtendedSeries) -> Result<RiskReport, AnalysisError> {
    let (previous, current) = latest_pair(series, Stage::Risk)?;
    // A complete row implies at least one defined volatility value.
    let mean = series.mean_volatility().unwrap_or(current.volatility);
    let report = classify_risk(&previous, &current, mean);
    tracing::info!(
        stage = %Stage::Risk,
        volatility = %report.volatility_level,
        bands = %report.price_vs_bands,
        "risk analysis completed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn row(close: f64) -> IndicatorRow {
        IndicatorRow {
            index: 0,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
            ma20: 100.0,
            ma50: 100.0,
            ema20: None,
            rsi: 50.0,
            bb_middle: 100.0,
            bb_upper: 110.0,
            bb_lower: 90.0,
            volatility: 0.01,
            volume_ma20: 1000.0,
            volume_ratio: 1.0,
        }
    }

    #[test]
    fn trend_bullish_above_ma50() {
        let previous = row(104.0);
        let mut current = row(105.0);
        current.ma20 = 102.0;

        let report = classify_trend(&previous, &current);
        assert_eq!(report.direction, TrendDirection::Bullish);
        assert_eq!(report.ma_crossover, TrendDirection::Bullish);
        assert_eq!(report.price_momentum, Direction::Increasing);
        assert_relative_eq!(report.strength, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn trend_bearish_at_or_below_ma50() {
        let report = classify_trend(&row(101.0), &row(100.0));
        assert_eq!(report.direction, TrendDirection::Bearish);
        assert_eq!(report.ma_crossover, TrendDirection::Bearish);
        assert_eq!(report.price_momentum, Direction::Decreasing);
        assert_relative_eq!(report.strength, 0.0);
    }

    #[test]
    fn rsi_thresholds_are_exclusive() {
        assert_eq!(classify_rsi(70.0), RsiStatus::Neutral);
        assert_eq!(classify_rsi(70.1), RsiStatus::Overbought);
        assert_eq!(classify_rsi(30.0), RsiStatus::Neutral);
        assert_eq!(classify_rsi(29.9), RsiStatus::Oversold);
    }

    #[test]
    fn momentum_trend_follows_rsi() {
        let mut previous = row(100.0);
        let mut current = row(100.0);
        previous.rsi = 45.0;
        current.rsi = 75.0;

        let report = classify_momentum(&previous, &current);
        assert_eq!(report.rsi_status, RsiStatus::Overbought);
        assert_eq!(report.rsi_trend, Direction::Increasing);
        assert_eq!(report.rsi_value, 75.0);
    }

    #[test]
    fn volume_trend_bands() {
        let previous = row(100.0);
        let mut current = row(100.0);

        current.volume = 1600.0;
        assert_eq!(classify_volume(&previous, &current).volume_trend, VolumeTrend::High);
        current.volume = 400.0;
        assert_eq!(classify_volume(&previous, &current).volume_trend, VolumeTrend::Low);
        current.volume = 1500.0;
        assert_eq!(classify_volume(&previous, &current).volume_trend, VolumeTrend::Normal);
    }

    #[test]
    fn volume_change_percent() {
        let previous = row(100.0);
        let mut current = row(100.0);
        current.volume = 1250.0;

        let analysis = classify_volume(&previous, &current);
        assert_relative_eq!(analysis.volume_change.unwrap(), 25.0, epsilon = 1e-12);
        assert_eq!(analysis.volume_direction, Direction::Increasing);
    }

    #[test]
    fn volume_change_undefined_after_zero_volume() {
        let mut previous = row(100.0);
        previous.volume = 0.0;
        assert_eq!(classify_volume(&previous, &row(100.0)).volume_change, None);
    }

    #[test]
    fn alignment_confirmed_when_volume_supports_move() {
        let previous = row(100.0);
        let mut up = row(101.0);
        up.volume = 1200.0;
        assert_eq!(
            classify_volume(&previous, &up).price_volume_alignment,
            PriceVolumeAlignment::Confirmed
        );

        let mut down = row(99.0);
        down.volume = 800.0;
        assert_eq!(
            classify_volume(&previous, &down).price_volume_alignment,
            PriceVolumeAlignment::Confirmed
        );
    }

    #[test]
    fn alignment_divergent_otherwise() {
        let previous = row(100.0);
        let mut up_on_light_volume = row(101.0);
        up_on_light_volume.volume = 800.0;
        assert_eq!(
            classify_volume(&previous, &up_on_light_volume).price_volume_alignment,
            PriceVolumeAlignment::Divergent
        );

        let mut flat = row(100.0);
        flat.volume = 2000.0;
        assert_eq!(
            classify_volume(&previous, &flat).price_volume_alignment,
            PriceVolumeAlignment::Divergent
        );
    }

    #[test]
    fn volatility_levels() {
        assert_eq!(classify_volatility(0.013, 0.01), VolatilityLevel::High);
        assert_eq!(classify_volatility(0.007, 0.01), VolatilityLevel::Low);
        assert_eq!(classify_volatility(0.01, 0.01), VolatilityLevel::Moderate);
        assert_eq!(classify_volatility(0.0, 0.0), VolatilityLevel::Moderate);
    }

    #[test]
    fn band_position_and_fraction() {
        let (position, band) = classify_bands(&row(105.0));
        assert_relative_eq!(position.unwrap(), 0.75);
        assert_eq!(band, BandPosition::Middle);

        let (position, band) = classify_bands(&row(112.0));
        assert!(position.unwrap() > 1.0);
        assert_eq!(band, BandPosition::UpperBand);

        let (_, band) = classify_bands(&row(90.0));
        assert_eq!(band, BandPosition::LowerBand);
    }

    #[test]
    fn band_position_undefined_for_collapsed_bands() {
        let mut flat = row(100.0);
        flat.bb_upper = 100.0;
        flat.bb_lower = 100.0;
        let (position, band) = classify_bands(&flat);
        assert_eq!(position, None);
        assert_eq!(band, BandPosition::UpperBand);
    }

    #[test]
    fn risk_combines_components() {
        let previous = row(100.0);
        let mut current = row(100.0);
        current.volatility = 0.02;

        let report = classify_risk(&previous, &current, 0.01);
        assert_eq!(report.volatility_level, VolatilityLevel::High);
        assert_eq!(report.volatility_direction, Direction::Increasing);
        assert_eq!(report.price_vs_bands, BandPosition::Middle);
    }

    #[test]
    fn labels_render_upper_case() {
        assert_eq!(TrendDirection::Bullish.to_string(), "BULLISH");
        assert_eq!(BandPosition::UpperBand.to_string(), "UPPER_BAND");
        assert_eq!(
            serde_json::to_string(&VolatilityLevel::Moderate).unwrap(),
            "\"MODERATE\""
        );
    }
}
