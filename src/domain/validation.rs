//! Series validation.
//!
//! Checks every structural and value invariant of a raw OHLCV series before
//! any indicator is computed. Checks run in a fixed order and the first
//! violation found is reported.

use crate::domain::error::Stage;
use crate::domain::ohlcv::{OhlcvBar, OhlcvField};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("series is empty")]
    Empty,

    #[error("missing required field: {field}")]
    MissingField { field: OhlcvField },

    #[error("missing {field} value at row {index}")]
    MissingValue { field: OhlcvField, index: usize },

    #[error("high below low at row {index}")]
    HighBelowLow { index: usize },

    #[error("negative {field} at row {index}")]
    NegativePrice { field: OhlcvField, index: usize },

    #[error("negative volume at row {index}")]
    NegativeVolume { index: usize },

    #[error("dates not strictly ascending at row {index}")]
    UnorderedDates { index: usize },
}

/// Predicate form of [`check_series`]; logs the outcome and never fails.
pub fn validate(bars: &[OhlcvBar]) -> bool {
    match check_series(bars) {
        Ok(()) => {
            tracing::info!(
                stage = %Stage::Validation,
                rows = bars.len(),
                "data validation successful"
            );
            true
        }
        Err(issue) => {
            tracing::error!(
                stage = %Stage::Validation,
                error = %issue,
                "data validation failed"
            );
            false
        }
    }
}

pub fn check_series(bars: &[OhlcvBar]) -> Result<(), ValidationIssue> {
    check_non_empty(bars)?;
    check_missing(bars)?;
    check_high_low(bars)?;
    check_prices(bars)?;
    check_volume(bars)?;
    check_dates(bars)?;
    Ok(())
}

fn check_non_empty(bars: &[OhlcvBar]) -> Result<(), ValidationIssue> {
    if bars.is_empty() {
        return Err(ValidationIssue::Empty);
    }
    Ok(())
}

fn check_missing(bars: &[OhlcvBar]) -> Result<(), ValidationIssue> {
    for field in OhlcvField::ALL {
        if bars.iter().all(|b| b.field(field).is_nan()) {
            return Err(ValidationIssue::MissingField { field });
        }
    }
    for (index, bar) in bars.iter().enumerate() {
        for field in OhlcvField::ALL {
            if !bar.field(field).is_finite() {
                return Err(ValidationIssue::MissingValue { field, index });
            }
        }
    }
    Ok(())
}

fn check_high_low(bars: &[OhlcvBar]) -> Result<(), ValidationIssue> {
    match bars.iter().position(|b| b.high < b.low) {
        Some(index) => Err(ValidationIssue::HighBelowLow { index }),
        None => Ok(()),
    }
}

fn check_prices(bars: &[OhlcvBar]) -> Result<(), ValidationIssue> {
    for (index, bar) in bars.iter().enumerate() {
        for field in OhlcvField::PRICES {
            if bar.field(field) < 0.0 {
                return Err(ValidationIssue::NegativePrice { field, index });
            }
        }
    }
    Ok(())
}

fn check_volume(bars: &[OhlcvBar]) -> Result<(), ValidationIssue> {
    match bars.iter().position(|b| b.volume < 0.0) {
        Some(index) => Err(ValidationIssue::NegativeVolume { index }),
        None => Ok(()),
    }
}

fn check_dates(bars: &[OhlcvBar]) -> Result<(), ValidationIssue> {
    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(ValidationIssue::UnorderedDates { index: index + 1 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, open: f64, high: f64, low: f64, close: f64, volume: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn valid_bars() -> Vec<OhlcvBar> {
        vec![
            bar(1, 100.0, 105.0, 98.0, 103.0, 1000.0),
            bar(2, 101.0, 104.0, 99.0, 102.0, 1100.0),
            bar(3, 102.0, 106.0, 100.0, 104.0, 950.0),
            bar(4, 101.0, 103.0, 98.0, 102.0, 1200.0),
            bar(5, 103.0, 107.0, 102.0, 106.0, 1300.0),
        ]
    }

    #[test]
    fn accepts_valid_series() {
        assert!(validate(&valid_bars()));
        assert_eq!(check_series(&valid_bars()), Ok(()));
    }

    #[test]
    fn rejects_empty_series() {
        assert!(!validate(&[]));
        assert_eq!(check_series(&[]), Err(ValidationIssue::Empty));
    }

    #[test]
    fn rejects_missing_column() {
        let mut bars = valid_bars();
        for b in &mut bars {
            b.volume = f64::NAN;
        }
        assert_eq!(
            check_series(&bars),
            Err(ValidationIssue::MissingField {
                field: OhlcvField::Volume
            })
        );
    }

    #[test]
    fn rejects_single_missing_value() {
        let mut bars = valid_bars();
        bars[2].close = f64::NAN;
        assert_eq!(
            check_series(&bars),
            Err(ValidationIssue::MissingValue {
                field: OhlcvField::Close,
                index: 2
            })
        );
    }

    #[test]
    fn rejects_high_below_low() {
        let mut bars = valid_bars();
        bars[0].high = 97.0;
        assert_eq!(
            check_series(&bars),
            Err(ValidationIssue::HighBelowLow { index: 0 })
        );
    }

    #[test]
    fn rejects_negative_price() {
        let mut bars = valid_bars();
        bars[1].open = -101.0;
        assert_eq!(
            check_series(&bars),
            Err(ValidationIssue::NegativePrice {
                field: OhlcvField::Open,
                index: 1
            })
        );
    }

    #[test]
    fn rejects_negative_volume() {
        let mut bars = valid_bars();
        bars[1].volume = -100.0;
        assert_eq!(
            check_series(&bars),
            Err(ValidationIssue::NegativeVolume { index: 1 })
        );
    }

    #[test]
    fn rejects_duplicate_dates() {
        let mut bars = valid_bars();
        bars[3].date = bars[2].date;
        assert_eq!(
            check_series(&bars),
            Err(ValidationIssue::UnorderedDates { index: 3 })
        );
    }

    #[test]
    fn zero_prices_and_volume_are_allowed() {
        let bars = vec![bar(1, 0.0, 0.0, 0.0, 0.0, 0.0)];
        assert!(validate(&bars));
    }

    #[test]
    fn reports_first_violation_in_check_order() {
        let bars = vec![
            bar(1, 100.0, 98.0, 99.0, 103.0, 1000.0),
            bar(2, -101.0, 104.0, 99.0, 102.0, -100.0),
            bar(3, 102.0, 106.0, 100.0, f64::NAN, 950.0),
        ];
        assert!(matches!(
            check_series(&bars),
            Err(ValidationIssue::MissingValue { .. })
        ));
    }
}
