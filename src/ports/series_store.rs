//! Series persistence port trait.

use crate::domain::error::SignalError;
use crate::domain::extended_series::ExtendedSeries;
use crate::domain::ohlcv::OhlcvBar;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Storage key for one symbol's series, partitioned by year and month.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub symbol: String,
    pub year: i32,
    pub month: u32,
}

impl StoreKey {
    pub fn new(symbol: &str, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{:02}", self.symbol, self.year, self.month)
    }
}

pub trait SeriesStore {
    /// Persist a raw series. Returns a description of where it was written.
    fn save_raw(&self, key: &StoreKey, bars: &[OhlcvBar]) -> Result<String, SignalError>;

    /// Persist a series together with its indicator columns.
    fn save_extended(
        &self,
        key: &StoreKey,
        series: &ExtendedSeries,
    ) -> Result<String, SignalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_date_upper_cases_symbol() {
        let key = StoreKey::new("aapl", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(key.symbol, "AAPL");
        assert_eq!(key.year, 2024);
        assert_eq!(key.month, 3);
    }

    #[test]
    fn key_display_pads_month() {
        let key = StoreKey::new("MSFT", NaiveDate::from_ymd_opt(2023, 9, 1).unwrap());
        assert_eq!(key.to_string(), "MSFT/2023/09");
    }
}
