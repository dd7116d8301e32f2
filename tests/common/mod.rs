#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use stocksignal::domain::error::SignalError;
use stocksignal::domain::extended_series::ExtendedSeries;
pub use stocksignal::domain::ohlcv::OhlcvBar;
use stocksignal::ports::data_port::DataPort;
use stocksignal::ports::series_store::{SeriesStore, StoreKey};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignalError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) => Ok(bars
                .iter()
                .filter(|b| b.date >= start_date && b.date <= end_date)
                .cloned()
                .collect()),
            None => Err(SignalError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Records what was saved instead of writing anywhere.
#[derive(Default)]
pub struct RecordingStore {
    pub raw: RefCell<Vec<(StoreKey, usize)>>,
    pub extended: RefCell<Vec<(StoreKey, usize)>>,
    pub fail: bool,
}

impl SeriesStore for RecordingStore {
    fn save_raw(&self, key: &StoreKey, bars: &[OhlcvBar]) -> Result<String, SignalError> {
        if self.fail {
            return Err(SignalError::Store {
                reason: "store offline".into(),
            });
        }
        self.raw.borrow_mut().push((key.clone(), bars.len()));
        Ok(format!("memory://raw/{key}"))
    }

    fn save_extended(
        &self,
        key: &StoreKey,
        series: &ExtendedSeries,
    ) -> Result<String, SignalError> {
        if self.fail {
            return Err(SignalError::Store {
                reason: "store offline".into(),
            });
        }
        self.extended.borrow_mut().push((key.clone(), series.len()));
        Ok(format!("memory://processed/{key}"))
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn start_date() -> NaiveDate {
    date("2024-01-01")
}

pub fn make_bar(date: NaiveDate, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar {
        date,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

/// One bar per calendar day starting at [`start_date`].
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            make_bar(
                start_date() + chrono::Duration::days(i as i64),
                close,
                10_000.0 + (i % 5) as f64 * 250.0,
            )
        })
        .collect()
}

/// `close[i] = 100 + 0.5·i`.
pub fn uptrend(n: usize) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + 0.5 * i as f64).collect();
    bars_from_closes(&closes)
}

pub fn flat(n: usize) -> Vec<OhlcvBar> {
    bars_from_closes(&vec![100.0; n])
}

/// Choppy for the first `n - rally` bars, then compounding 2% per day.
pub fn rally(n: usize, rally: usize) -> Vec<OhlcvBar> {
    let mut closes: Vec<f64> = (0..n - rally)
        .map(|i| 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 })
        .collect();
    let mut last = *closes.last().unwrap_or(&100.0);
    for _ in 0..rally {
        last *= 1.02;
        closes.push(last);
    }
    bars_from_closes(&closes)
}

/// Deterministic oscillating series with a mild drift.
pub fn wavy(n: usize) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..n)
        .map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0 + i as f64 * 0.05)
        .collect();
    bars_from_closes(&closes)
}

/// `moving` bars of irregular movement, then `flat` bars repeating the last close.
pub fn moves_then_flat(moving: usize, flat: usize) -> Vec<OhlcvBar> {
    let mut closes: Vec<f64> = (0..moving)
        .map(|i| 100.0 + (i as f64 * 1.37).sin() * 4.3 + (i as f64 * 0.29).cos() * 1.1)
        .collect();
    let last = *closes.last().unwrap_or(&100.0);
    closes.extend(std::iter::repeat(last).take(flat));
    bars_from_closes(&closes)
}

pub fn write_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
