//! Extended series: the OHLCV bars plus every derived indicator column.
//!
//! [`compute_indicators`] validates the raw series, enforces the minimum
//! history policy and appends the fixed indicator set. Columns are aligned
//! index-for-index with the bars; the bars themselves are never modified.

use crate::domain::error::{AnalysisError, Stage};
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::returns::calculate_returns;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::{finite, Column, IndicatorColumn};
use crate::domain::ohlcv::{closes, volumes, OhlcvBar};
use crate::domain::validation::check_series;
use chrono::NaiveDate;

pub const MIN_HISTORY: usize = 50;
pub const SHORT_MA_PERIOD: usize = 20;
pub const LONG_MA_PERIOD: usize = 50;
pub const EMA_PERIOD: usize = 20;
pub const VOLATILITY_PERIOD: usize = 20;
pub const VOLUME_MA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULT_X100: u32 = 200;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedSeries {
    pub bars: Vec<OhlcvBar>,
    pub ma20: Column,
    pub ma50: Column,
    pub ema20: Column,
    pub daily_return: Column,
    pub volatility: Column,
    pub volume_ma20: Column,
    pub volume_ratio: Column,
    pub rsi: Column,
    pub bb_middle: Column,
    pub bb_upper: Column,
    pub bb_lower: Column,
    pub above_ma50: Vec<Option<bool>>,
    pub rsi_overbought: Vec<Option<bool>>,
    pub rsi_oversold: Vec<Option<bool>>,
}

/// A single indicator-complete row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub index: usize,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub ema20: Option<f64>,
    pub rsi: f64,
    pub bb_middle: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub volatility: f64,
    pub volume_ma20: f64,
    pub volume_ratio: f64,
}

impl ExtendedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn column(&self, column: IndicatorColumn) -> &[Option<f64>] {
        match column {
            IndicatorColumn::Ma20 => &self.ma20,
            IndicatorColumn::Ma50 => &self.ma50,
            IndicatorColumn::Ema20 => &self.ema20,
            IndicatorColumn::DailyReturn => &self.daily_return,
            IndicatorColumn::Volatility => &self.volatility,
            IndicatorColumn::VolumeMa20 => &self.volume_ma20,
            IndicatorColumn::VolumeRatio => &self.volume_ratio,
            IndicatorColumn::Rsi => &self.rsi,
            IndicatorColumn::BbMiddle => &self.bb_middle,
            IndicatorColumn::BbUpper => &self.bb_upper,
            IndicatorColumn::BbLower => &self.bb_lower,
        }
    }

    pub fn is_complete(&self, index: usize) -> bool {
        index < self.len()
            && IndicatorColumn::REQUIRED
                .iter()
                .all(|&c| self.column(c)[index].is_some())
    }

    /// The row at `index`, if every required indicator is defined there.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        let bar = self.bars.get(index)?;
        Some(IndicatorRow {
            index,
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ma20: self.ma20[index]?,
            ma50: self.ma50[index]?,
            ema20: self.ema20[index],
            rsi: self.rsi[index]?,
            bb_middle: self.bb_middle[index]?,
            bb_upper: self.bb_upper[index]?,
            bb_lower: self.bb_lower[index]?,
            volatility: self.volatility[index]?,
            volume_ma20: self.volume_ma20[index]?,
            volume_ratio: self.volume_ratio[index]?,
        })
    }

    pub fn complete_rows(&self) -> impl DoubleEndedIterator<Item = IndicatorRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    pub fn complete_row_count(&self) -> usize {
        self.complete_rows().count()
    }

    /// The last two indicator-complete rows as `(previous, current)`.
    pub fn latest_pair(&self) -> Option<(IndicatorRow, IndicatorRow)> {
        let mut rows = self.complete_rows().rev();
        let current = rows.next()?;
        let previous = rows.next()?;
        Some((previous, current))
    }

    /// Mean of every defined volatility value.
    pub fn mean_volatility(&self) -> Option<f64> {
        let (sum, count) = self
            .volatility
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    pub fn last_bar(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn tail(&self, n: usize) -> &[OhlcvBar] {
        &self.bars[self.len().saturating_sub(n)..]
    }
}

pub fn compute_indicators(bars: &[OhlcvBar]) -> Result<ExtendedSeries, AnalysisError> {
    check_series(bars).map_err(|issue| AnalysisError::from(issue).logged(Stage::Indicators))?;

    if bars.len() < MIN_HISTORY {
        return Err(AnalysisError::InsufficientHistory {
            stage: Stage::Indicators,
            rows: bars.len(),
            minimum: MIN_HISTORY,
        }
        .logged(Stage::Indicators));
    }

    let close = closes(bars);
    let volume = volumes(bars);

    let ma20 = calculate_sma(&close, SHORT_MA_PERIOD);
    let ma50 = calculate_sma(&close, LONG_MA_PERIOD);
    let ema20 = calculate_ema(&close, EMA_PERIOD);
    let daily_return = calculate_returns(&close);
    let volatility = calculate_stddev(&daily_return, VOLATILITY_PERIOD);
    let volume_ma20 = calculate_sma(&volume, VOLUME_MA_PERIOD);
    let volume_ratio = volume
        .iter()
        .zip(&volume_ma20)
        .map(|(v, ma)| ma.and_then(|ma| finite(v / ma)))
        .collect();
    let rsi = calculate_rsi(&close, RSI_PERIOD);
    let bands = calculate_bollinger(&close, BOLLINGER_PERIOD, BOLLINGER_MULT_X100);

    let above_ma50 = close
        .iter()
        .zip(&ma50)
        .map(|(c, ma)| ma.map(|ma| *c > ma))
        .collect();
    let rsi_overbought = rsi.iter().map(|r| r.map(|r| r > RSI_OVERBOUGHT)).collect();
    let rsi_oversold = rsi.iter().map(|r| r.map(|r| r < RSI_OVERSOLD)).collect();

    let series = ExtendedSeries {
        bars: bars.to_vec(),
        ma20,
        ma50,
        ema20,
        daily_return,
        volatility,
        volume_ma20,
        volume_ratio,
        rsi,
        bb_middle: bands.middle,
        bb_upper: bands.upper,
        bb_lower: bands.lower,
        above_ma50,
        rsi_overbought,
        rsi_oversold,
    };

    let complete = series.complete_row_count();
    if complete == 0 {
        return Err(AnalysisError::NoValidIndicatorRows.logged(Stage::Indicators));
    }

    tracing::info!(
        stage = %Stage::Indicators,
        rows = series.len(),
        complete_rows = complete,
        "technical indicators computed"
    );
    Ok(series)
}
