//! Core domain types and logic.

pub mod analysis;
pub mod classification;
pub mod config_validation;
pub mod error;
pub mod extended_series;
pub mod indicator;
pub mod label;
pub mod market_context;
pub mod ohlcv;
pub mod pattern;
pub mod signal;
pub mod universe;
pub mod validation;
