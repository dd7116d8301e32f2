//! Market data access port trait.

use crate::domain::error::SignalError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Source of daily OHLCV series. Implementations return bars sorted by date
/// and restricted to `[start_date, end_date]`; they do not validate values.
pub trait DataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignalError>;

    fn list_symbols(&self) -> Result<Vec<String>, SignalError>;
}
