//! CSV file data adapter.
//!
//! Each symbol lives in `{base_path}/{SYMBOL}.csv`. Columns are located by
//! header name (case-insensitive), so extra columns such as `Adj Close` are
//! ignored. An absent OHLCV column or an empty cell reads as NaN and is left
//! for the series validator to report.

use crate::domain::error::SignalError;
use crate::domain::ohlcv::{OhlcvBar, OhlcvField};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

struct Columns {
    date: usize,
    fields: [Option<usize>; 5],
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, SignalError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date = find("date").ok_or_else(|| SignalError::Data {
            reason: "missing date column".into(),
        })?;
        Ok(Self {
            date,
            fields: OhlcvField::ALL.map(|f| find(f.name())),
        })
    }
}

fn parse_value(
    record: &csv::StringRecord,
    column: Option<usize>,
    field: OhlcvField,
    line: usize,
) -> Result<f64, SignalError> {
    let raw = column.and_then(|c| record.get(c)).map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|e| SignalError::Data {
        reason: format!("invalid {field} value {raw:?} on line {line}: {e}"),
    })
}

/// Read every bar from a CSV file, sorted by date.
pub fn read_bars(path: &Path) -> Result<Vec<OhlcvBar>, SignalError> {
    let content = fs::read_to_string(path).map_err(|e| SignalError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    parse_bars(&content, None)
}

/// Parse CSV content, keeping only rows within `range` when given.
pub fn parse_bars(
    content: &str,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<OhlcvBar>, SignalError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = rdr.headers().map_err(|e| SignalError::Data {
        reason: format!("CSV header error: {}", e),
    })?;
    let columns = Columns::locate(headers)?;

    let mut bars = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let record = result.map_err(|e| SignalError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(columns.date).unwrap_or("").trim();
        // Timestamps such as `2024-01-15 00:00:00-05:00` keep only the day.
        let day = date_str.get(..10).unwrap_or(date_str);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| SignalError::Data {
            reason: format!("invalid date {date_str:?} on line {line}: {e}"),
        })?;

        if let Some((start, end)) = range {
            if date < start || date > end {
                continue;
            }
        }

        let [open, high, low, close, volume] = OhlcvField::ALL;
        bars.push(OhlcvBar {
            date,
            open: parse_value(&record, columns.fields[0], open, line)?,
            high: parse_value(&record, columns.fields[1], high, line)?,
            low: parse_value(&record, columns.fields[2], low, line)?,
            close: parse_value(&record, columns.fields[3], close, line)?,
            volume: parse_value(&record, columns.fields[4], volume, line)?,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignalError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SignalError::NoData {
                symbol: symbol.to_uppercase(),
            },
            _ => SignalError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let bars = parse_bars(&content, Some((start_date, end_date)))?;
        tracing::debug!(
            symbol,
            rows = bars.len(),
            path = %path.display(),
            "fetched series"
        );
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SignalError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_uppercase());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
