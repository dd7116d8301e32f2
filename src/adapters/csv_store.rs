//! Filesystem series store writing CSV partitions.
//!
//! Raw series go to `{root}/raw/stock_data/{SYMBOL}/{YYYY}/{MM}/data.csv`,
//! extended series to the same layout under `processed/`. An existing file
//! for the same key is replaced.

use crate::domain::error::SignalError;
use crate::domain::extended_series::ExtendedSeries;
use crate::domain::indicator::IndicatorColumn;
use crate::domain::ohlcv::{OhlcvBar, OhlcvField};
use crate::ports::series_store::{SeriesStore, StoreKey};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const RAW_PREFIX: &str = "raw";
const PROCESSED_PREFIX: &str = "processed";

pub struct CsvSeriesStore {
    root: PathBuf,
}

impl CsvSeriesStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path_for(&self, prefix: &str, key: &StoreKey) -> PathBuf {
        self.root
            .join(prefix)
            .join("stock_data")
            .join(&key.symbol)
            .join(key.year.to_string())
            .join(format!("{:02}", key.month))
            .join("data.csv")
    }

    fn create(&self, path: &Path) -> Result<fs::File, SignalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SignalError::Store {
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }
        fs::File::create(path).map_err(|e| SignalError::Store {
            reason: format!("failed to create {}: {}", path.display(), e),
        })
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: Option<bool>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn store_err(e: impl std::fmt::Display) -> SignalError {
    SignalError::Store {
        reason: format!("CSV write error: {}", e),
    }
}

fn bar_fields(bar: &OhlcvBar) -> Vec<String> {
    std::iter::once(bar.date.to_string())
        .chain(OhlcvField::ALL.iter().map(|&f| bar.field(f).to_string()))
        .collect()
}

fn bar_header() -> Vec<String> {
    std::iter::once("date".to_string())
        .chain(OhlcvField::ALL.iter().map(|f| f.to_string()))
        .collect()
}

pub fn write_raw_csv<W: Write>(out: W, bars: &[OhlcvBar]) -> Result<(), SignalError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(bar_header()).map_err(store_err)?;
    for bar in bars {
        wtr.write_record(bar_fields(bar)).map_err(store_err)?;
    }
    wtr.flush().map_err(store_err)?;
    Ok(())
}

/// Bars followed by every indicator column and the boolean flags; undefined
/// values are written as empty cells.
pub fn write_extended_csv<W: Write>(out: W, series: &ExtendedSeries) -> Result<(), SignalError> {
    let mut wtr = csv::Writer::from_writer(out);

    let mut header = bar_header();
    header.extend(IndicatorColumn::ALL.iter().map(|c| c.to_string()));
    header.extend(["Above_MA50", "RSI_Overbought", "RSI_Oversold"].map(String::from));
    wtr.write_record(&header).map_err(store_err)?;

    for (i, bar) in series.bars.iter().enumerate() {
        let mut row = bar_fields(bar);
        row.extend(
            IndicatorColumn::ALL
                .iter()
                .map(|&c| cell(series.column(c)[i])),
        );
        row.push(flag(series.above_ma50[i]));
        row.push(flag(series.rsi_overbought[i]));
        row.push(flag(series.rsi_oversold[i]));
        wtr.write_record(&row).map_err(store_err)?;
    }
    wtr.flush().map_err(store_err)?;
    Ok(())
}

impl SeriesStore for CsvSeriesStore {
    fn save_raw(&self, key: &StoreKey, bars: &[OhlcvBar]) -> Result<String, SignalError> {
        let path = self.path_for(RAW_PREFIX, key);
        write_raw_csv(self.create(&path)?, bars)?;
        tracing::info!(key = %key, path = %path.display(), "saved raw series");
        Ok(path.display().to_string())
    }

    fn save_extended(
        &self,
        key: &StoreKey,
        series: &ExtendedSeries,
    ) -> Result<String, SignalError> {
        let path = self.path_for(PROCESSED_PREFIX, key);
        write_extended_csv(self.create(&path)?, series)?;
        tracing::info!(key = %key, path = %path.display(), "saved extended series");
        Ok(path.display().to_string())
    }
}
