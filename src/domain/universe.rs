//! Multi-symbol analysis.
//!
//! Parses code lists from configuration and runs the analysis pipeline over
//! each code. A failing code is logged and skipped; the batch only fails when
//! every code does.

use crate::domain::analysis::{AnalysisReport, AnalysisSession};
use crate::domain::error::{AnalysisError, SignalError};
use crate::ports::data_port::DataPort;
use crate::ports::series_store::{SeriesStore, StoreKey};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Length of the default fetch window ending today.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    pub store_path: Option<PathBuf>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug, Clone)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    NoData,
    Fetch(String),
    Analysis(AnalysisError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => f.write_str("no data found"),
            SkipReason::Fetch(reason) => write!(f, "fetch failed: {reason}"),
            SkipReason::Analysis(err) => write!(f, "{err}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CodeReport {
    pub code: String,
    pub report: AnalysisReport,
    pub stored: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UniverseAnalysis {
    pub reports: Vec<CodeReport>,
    pub skipped: Vec<SkippedCode>,
}

/// Fetch and analyse every code. When a store is given, the raw and
/// extended series are saved under the partition for `today`; a storage
/// failure is logged and does not skip the code.
pub fn analyze_universe(
    data_port: &dyn DataPort,
    store: Option<&dyn SeriesStore>,
    codes: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
) -> Result<UniverseAnalysis, SignalError> {
    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for code in codes {
        tracing::info!(symbol = %code, %start_date, %end_date, "fetching stock data");
        let bars = match data_port.fetch_ohlcv(code, start_date, end_date) {
            Ok(bars) if bars.is_empty() => {
                tracing::warn!(symbol = %code, "skipping: no data found");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::NoData,
                });
                continue;
            }
            Ok(bars) => bars,
            Err(SignalError::NoData { .. }) => {
                tracing::warn!(symbol = %code, "skipping: no data found");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::NoData,
                });
                continue;
            }
            Err(e) => {
                tracing::warn!(symbol = %code, error = %e, "skipping: fetch failed");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::Fetch(e.to_string()),
                });
                continue;
            }
        };

        let mut session = AnalysisSession::new();
        let report = match session.analyze(&bars) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(symbol = %code, error = %e, "skipping: analysis failed");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::Analysis(e),
                });
                continue;
            }
        };

        let mut stored = Vec::new();
        if let Some(store) = store {
            let key = StoreKey::new(code, today);
            match store.save_raw(&key, &bars) {
                Ok(location) => stored.push(location),
                Err(e) => tracing::error!(symbol = %code, error = %e, "failed to save raw series"),
            }
            if let crate::domain::analysis::SessionState::Prepared(series) = session.state() {
                match store.save_extended(&key, series) {
                    Ok(location) => stored.push(location),
                    Err(e) => {
                        tracing::error!(symbol = %code, error = %e, "failed to save extended series")
                    }
                }
            }
        }

        tracing::info!(
            symbol = %code,
            rows = bars.len(),
            recommendation = %report.trading_signal.recommendation,
            "code analysed"
        );
        reports.push(CodeReport {
            code: code.clone(),
            report,
            stored,
        });
    }

    if reports.is_empty() {
        tracing::error!(codes = codes.len(), "all codes failed analysis");
        return Err(SignalError::AllCodesFailed);
    }

    if !skipped.is_empty() {
        tracing::warn!(
            analysed = reports.len(),
            total = codes.len(),
            "some codes were skipped"
        );
    }

    Ok(UniverseAnalysis { reports, skipped })
}
