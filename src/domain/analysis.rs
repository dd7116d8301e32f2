//! Analysis session and report assembly.
//!
//! An [`AnalysisSession`] caches the extended series produced by
//! [`AnalysisSession::prepare`] so the individual stages can be run
//! separately. [`build_report`] is the stateless path: it takes the extended
//! series directly and runs every stage in order.

use crate::domain::classification::{
    analyze_momentum, analyze_risk, analyze_trend, MomentumReport, RiskReport, TrendReport,
};
use crate::domain::error::{AnalysisError, Stage};
use crate::domain::extended_series::{compute_indicators, ExtendedSeries};
use crate::domain::market_context::{analyze_market_context, MarketContext};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pattern::{detect_patterns, PatternReport};
use crate::domain::signal::{derive_signal, TradingSignal};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub date: NaiveDate,
    pub current_price: f64,
    pub trend: TrendReport,
    pub momentum: MomentumReport,
    pub risk: RiskReport,
    pub pattern: PatternReport,
    pub market_context: MarketContext,
    pub trading_signal: TradingSignal,
}

pub fn build_report(series: &ExtendedSeries) -> Result<AnalysisReport, AnalysisError> {
    let last = series
        .last_bar()
        .ok_or_else(|| AnalysisError::NotPrepared { stage: Stage::Report }.logged(Stage::Report))?;

    let trend = analyze_trend(series)?;
    let momentum = analyze_momentum(series)?;
    let risk = analyze_risk(series)?;
    let pattern = detect_patterns(series);
    let market_context = analyze_market_context(series)?;
    let trading_signal = derive_signal(&trend, &momentum, &risk);

    tracing::info!(
        stage = %Stage::Report,
        date = %last.date,
        price = last.close,
        recommendation = %trading_signal.recommendation,
        "analysis report completed"
    );

    Ok(AnalysisReport {
        date: last.date,
        current_price: last.close,
        trend,
        momentum,
        risk,
        pattern,
        market_context,
        trading_signal,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Unprepared,
    Prepared(ExtendedSeries),
}

/// Owns at most one extended series. Sessions are independent; concurrent
/// analyses each use their own.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: SessionState,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self.state, SessionState::Prepared(_))
    }

    /// Compute indicators for `bars` and cache the result, replacing any
    /// previously prepared series. On failure the session becomes unprepared.
    pub fn prepare(&mut self, bars: &[OhlcvBar]) -> Result<&ExtendedSeries, AnalysisError> {
        self.state = SessionState::Unprepared;
        let series = compute_indicators(bars)?;
        self.state = SessionState::Prepared(series);
        self.series(Stage::Indicators)
    }

    fn series(&self, stage: Stage) -> Result<&ExtendedSeries, AnalysisError> {
        match &self.state {
            SessionState::Prepared(series) => Ok(series),
            SessionState::Unprepared => {
                Err(AnalysisError::NotPrepared { stage }.logged(stage))
            }
        }
    }

    pub fn analyze_trend(&self) -> Result<TrendReport, AnalysisError> {
        analyze_trend(self.series(Stage::Trend)?)
    }

    pub fn analyze_momentum(&self) -> Result<MomentumReport, AnalysisError> {
        analyze_momentum(self.series(Stage::Momentum)?)
    }

    pub fn analyze_risk(&self) -> Result<RiskReport, AnalysisError> {
        analyze_risk(self.series(Stage::Risk)?)
    }

    pub fn analyze_patterns(&self) -> Result<PatternReport, AnalysisError> {
        Ok(detect_patterns(self.series(Stage::Pattern)?))
    }

    pub fn analyze_market_context(&self) -> Result<MarketContext, AnalysisError> {
        analyze_market_context(self.series(Stage::MarketContext)?)
    }

    pub fn trading_signal(&self) -> Result<TradingSignal, AnalysisError> {
        let series = self.series(Stage::Signal)?;
        let trend = analyze_trend(series)?;
        let momentum = analyze_momentum(series)?;
        let risk = analyze_risk(series)?;
        Ok(derive_signal(&trend, &momentum, &risk))
    }

    pub fn report(&self) -> Result<AnalysisReport, AnalysisError> {
        build_report(self.series(Stage::Report)?)
    }

    /// Prepare from `bars` and build the full report.
    pub fn analyze(&mut self, bars: &[OhlcvBar]) -> Result<AnalysisReport, AnalysisError> {
        build_report(self.prepare(bars)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classification::TrendDirection;
    use crate::domain::label::Direction;

    fn rising_bars(n: usize) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + 0.5 * i as f64;
                OhlcvBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0 + (i % 7) as f64 * 100.0,
                }
            })
            .collect()
    }

    #[test]
    fn unprepared_session_rejects_every_stage() {
        let session = AnalysisSession::new();
        assert!(!session.is_prepared());

        assert_eq!(
            session.analyze_trend().unwrap_err(),
            AnalysisError::NotPrepared { stage: Stage::Trend }
        );
        assert_eq!(
            session.analyze_momentum().unwrap_err(),
            AnalysisError::NotPrepared { stage: Stage::Momentum }
        );
        assert_eq!(
            session.analyze_risk().unwrap_err(),
            AnalysisError::NotPrepared { stage: Stage::Risk }
        );
        assert_eq!(
            session.analyze_patterns().unwrap_err(),
            AnalysisError::NotPrepared { stage: Stage::Pattern }
        );
        assert_eq!(
            session.analyze_market_context().unwrap_err(),
            AnalysisError::NotPrepared {
                stage: Stage::MarketContext
            }
        );
        assert!(session.trading_signal().is_err());
        assert!(session.report().is_err());
    }

    #[test]
    fn prepared_session_runs_stages() {
        let mut session = AnalysisSession::new();
        session.prepare(&rising_bars(100)).unwrap();
        assert!(session.is_prepared());

        let trend = session.analyze_trend().unwrap();
        assert_eq!(trend.direction, TrendDirection::Bullish);
        assert_eq!(trend.price_momentum, Direction::Increasing);
        assert!(session.analyze_patterns().is_ok());
    }

    #[test]
    fn failed_prepare_clears_previous_series() {
        let mut session = AnalysisSession::new();
        session.prepare(&rising_bars(100)).unwrap();

        assert!(session.prepare(&rising_bars(10)).is_err());
        assert_eq!(session.state(), &SessionState::Unprepared);
    }

    #[test]
    fn report_is_stamped_with_last_bar() {
        let bars = rising_bars(100);
        let report = AnalysisSession::new().analyze(&bars).unwrap();

        assert_eq!(report.date, bars[99].date);
        assert_eq!(report.current_price, bars[99].close);
    }

    #[test]
    fn session_report_matches_stateless_build() {
        let bars = rising_bars(80);
        let mut session = AnalysisSession::new();
        let series = session.prepare(&bars).unwrap().clone();

        assert_eq!(session.report().unwrap(), build_report(&series).unwrap());
    }

    #[test]
    fn signal_needs_two_complete_rows() {
        let mut session = AnalysisSession::new();
        session.prepare(&rising_bars(50)).unwrap();

        assert!(matches!(
            session.trading_signal().unwrap_err(),
            AnalysisError::InsufficientHistory {
                stage: Stage::Trend,
                rows: 1,
                minimum: 2
            }
        ));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = AnalysisSession::new().analyze(&rising_bars(60)).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["trend"]["direction"], "BULLISH");
        assert!(json["trading_signal"]["recommendation"].is_string());
        assert!(json["market_context"]["price_levels"]["year_high"].is_null());
    }
}
