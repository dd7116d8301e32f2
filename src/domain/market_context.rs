//! Broader market context: multi-horizon trend strength, yearly price
//! levels and how current volatility compares with the series history.

use crate::domain::error::{AnalysisError, Stage};
use crate::domain::extended_series::ExtendedSeries;
use crate::domain::label::{label_enum, Direction};
use crate::domain::ohlcv::OhlcvBar;
use serde::Serialize;

pub const SHORT_TERM_WINDOW: usize = 5;
pub const MEDIUM_TERM_WINDOW: usize = 20;
pub const LONG_TERM_WINDOW: usize = 50;
/// Trading days in a year.
pub const YEAR_WINDOW: usize = 252;

const SIDEWAYS_BAND: f64 = 2.0;
const STRONG_MOVE: f64 = 5.0;

label_enum! {
    TrendStrength {
        StrongUp => "STRONG_UP",
        ModerateUp => "MODERATE_UP",
        Sideways => "SIDEWAYS",
        ModerateDown => "MODERATE_DOWN",
        StrongDown => "STRONG_DOWN",
    }
}

impl TrendStrength {
    pub fn from_change(percent: f64) -> Self {
        if percent.abs() < SIDEWAYS_BAND {
            TrendStrength::Sideways
        } else if percent > STRONG_MOVE {
            TrendStrength::StrongUp
        } else if percent > 0.0 {
            TrendStrength::ModerateUp
        } else if percent < -STRONG_MOVE {
            TrendStrength::StrongDown
        } else {
            TrendStrength::ModerateDown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendStrengthReport {
    pub short_term: Option<TrendStrength>,
    pub medium_term: Option<TrendStrength>,
    pub long_term: Option<TrendStrength>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceLevels {
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub distance_from_high: Option<f64>,
    pub distance_from_low: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityContext {
    pub current_vs_historical: Option<f64>,
    pub trend: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketContext {
    pub trend_strength: TrendStrengthReport,
    pub price_levels: PriceLevels,
    pub volatility_context: VolatilityContext,
}

/// Percent change of close across the trailing `window` bars (or all bars
/// if fewer). `None` when the starting close is zero or the slice is empty.
pub fn trend_change(bars: &[OhlcvBar], window: usize) -> Option<f64> {
    let recent = &bars[bars.len().saturating_sub(window)..];
    let first = recent.first()?.close;
    let last = recent.last()?.close;
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

pub fn trend_strength(bars: &[OhlcvBar], window: usize) -> Option<TrendStrength> {
    trend_change(bars, window).map(TrendStrength::from_change)
}

/// Highest high and lowest low over the last [`YEAR_WINDOW`] bars, with the
/// latest close's percent distance from each. Undefined with less than a
/// full year of history.
pub fn price_levels(bars: &[OhlcvBar]) -> PriceLevels {
    if bars.len() < YEAR_WINDOW {
        return PriceLevels {
            year_high: None,
            year_low: None,
            distance_from_high: None,
            distance_from_low: None,
        };
    }

    let year = &bars[bars.len() - YEAR_WINDOW..];
    let high = year.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = year.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let price = year[year.len() - 1].close;

    PriceLevels {
        year_high: Some(high),
        year_low: Some(low),
        distance_from_high: (price != 0.0).then(|| (high - price) / price * 100.0),
        distance_from_low: (low != 0.0).then(|| (price - low) / low * 100.0),
    }
}

pub fn volatility_context(series: &ExtendedSeries) -> VolatilityContext {
    let Some((previous, current)) = series.latest_pair() else {
        return VolatilityContext {
            current_vs_historical: None,
            trend: None,
        };
    };
    VolatilityContext {
        current_vs_historical: series
            .mean_volatility()
            .filter(|mean| *mean != 0.0)
            .map(|mean| current.volatility / mean),
        trend: Some(Direction::of(current.volatility, previous.volatility)),
    }
}

pub fn analyze_market_context(series: &ExtendedSeries) -> Result<MarketContext, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::InsufficientHistory {
            stage: Stage::MarketContext,
            rows: 0,
            minimum: 1,
        }
        .logged(Stage::MarketContext));
    }

    let bars = &series.bars;
    let context = MarketContext {
        trend_strength: TrendStrengthReport {
            short_term: trend_strength(bars, SHORT_TERM_WINDOW),
            medium_term: trend_strength(bars, MEDIUM_TERM_WINDOW),
            long_term: trend_strength(bars, LONG_TERM_WINDOW),
        },
        price_levels: price_levels(bars),
        volatility_context: volatility_context(series),
    };

    tracing::info!(
        stage = %Stage::MarketContext,
        has_year_levels = context.price_levels.year_high.is_some(),
        "market context analysis completed"
    );
    Ok(context)
}
