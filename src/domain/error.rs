//! Domain error types.

use crate::domain::validation::ValidationIssue;
use std::fmt;

/// Pipeline stage that produced an event or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validation,
    Indicators,
    Trend,
    Momentum,
    Risk,
    Pattern,
    MarketContext,
    Signal,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Indicators => "indicators",
            Stage::Trend => "trend",
            Stage::Momentum => "momentum",
            Stage::Risk => "risk",
            Stage::Pattern => "pattern",
            Stage::MarketContext => "market_context",
            Stage::Signal => "signal",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// Terminal failure of one analysis call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationIssue),

    #[error("insufficient history for {stage}: have {rows} rows, need {minimum}")]
    InsufficientHistory {
        stage: Stage,
        rows: usize,
        minimum: usize,
    },

    #[error("{stage} requested before indicators were computed")]
    NotPrepared { stage: Stage },

    #[error("indicator computation produced no complete rows")]
    NoValidIndicatorRows,
}

impl AnalysisError {
    /// Emit the failure with the stage that raised it, then hand it back for `?`.
    pub(crate) fn logged(self, stage: Stage) -> Self {
        tracing::error!(stage = %stage, error = %self, "analysis stage failed");
        self
    }
}

/// Top-level error type for stocksignal.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("series store error: {reason}")]
    Store { reason: String },

    #[error("all codes failed analysis")]
    AllCodesFailed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SignalError> for std::process::ExitCode {
    fn from(err: &SignalError) -> Self {
        let code: u8 = match err {
            SignalError::Io(_) => 1,
            SignalError::ConfigParse { .. }
            | SignalError::ConfigMissing { .. }
            | SignalError::ConfigInvalid { .. } => 2,
            SignalError::Data { .. }
            | SignalError::NoData { .. }
            | SignalError::Store { .. }
            | SignalError::AllCodesFailed => 3,
            SignalError::Analysis(AnalysisError::InvalidInput(_)) => 4,
            SignalError::Analysis(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
