//! Configuration validation.
//!
//! Checks every config field before any data is fetched. Date and code keys
//! are optional; when present they must be well formed.

use crate::domain::error::SignalError;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    validate_data_path(config)?;
    validate_dates(config)?;
    validate_lookback(config)?;
    validate_codes(config)?;
    validate_store(config)?;
    Ok(())
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), SignalError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SignalError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(SignalError::ConfigInvalid {
                section: "data".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
    }
    Ok(())
}

/// Parse an optional `[data]` date key.
pub fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, SignalError> {
    match config.get_string("data", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SignalError::ConfigInvalid {
                section: "data".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }),
    }
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let days = config.get_int("data", "lookback_days", 1);
    if days <= 0 {
        return Err(SignalError::ConfigInvalid {
            section: "data".to_string(),
            key: "lookback_days".to_string(),
            reason: "lookback_days must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), SignalError> {
    match config.get_string("analysis", "codes") {
        None => Ok(()),
        Some(codes) => parse_codes(&codes)
            .map(|_| ())
            .map_err(|e| SignalError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "codes".to_string(),
                reason: e.to_string(),
            }),
    }
}

fn validate_store(config: &dyn ConfigPort) -> Result<(), SignalError> {
    let path = config
        .get_string("store", "path")
        .filter(|p| !p.trim().is_empty());
    if config.get_bool("store", "enabled", false) && path.is_none() {
        return Err(SignalError::ConfigMissing {
            section: "store".to_string(),
            key: "path".to_string(),
        });
    }
    Ok(())
}
