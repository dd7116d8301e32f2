//! Trading signal derivation.
//!
//! # Evaluation Semantics
//!
//! - [`RULES`] is evaluated top-down; the first rule whose predicate holds wins
//! - No rule after a match is evaluated, so overlapping predicates are
//!   resolved purely by position in the table
//! - No match yields `HOLD` with `LOW` confidence and no supporting factors
//!
//! The accumulate and distribute rules test `volume_direction` and
//! `volatility_direction`. Older releases compared the level labels against
//! `INCREASING`, which could never match.

use crate::domain::classification::{
    BandPosition, MomentumReport, PriceVolumeAlignment, RiskReport, RsiStatus, TrendDirection,
    TrendReport, VolatilityLevel, VolumeTrend,
};
use crate::domain::error::Stage;
use crate::domain::label::{label_enum, Direction};
use serde::Serialize;

label_enum! {
    Recommendation {
        StrongBuy => "STRONG_BUY",
        Buy => "BUY",
        StrongSell => "STRONG_SELL",
        Sell => "SELL",
        Accumulate => "ACCUMULATE",
        Distribute => "DISTRIBUTE",
        Wait => "WAIT",
        Hold => "HOLD",
    }
}

label_enum! {
    Confidence {
        VeryHigh => "VERY_HIGH",
        High => "HIGH",
        Moderate => "MODERATE",
        Low => "LOW",
    }
}

/// The reports a rule predicate can inspect.
#[derive(Debug, Clone, Copy)]
pub struct SignalInputs<'a> {
    pub trend: &'a TrendReport,
    pub momentum: &'a MomentumReport,
    pub risk: &'a RiskReport,
}

pub struct SignalRule {
    pub name: &'static str,
    pub applies: fn(&SignalInputs<'_>) -> bool,
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    pub factors: &'static [&'static str],
}

impl std::fmt::Debug for SignalRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRule")
            .field("name", &self.name)
            .field("recommendation", &self.recommendation)
            .field("confidence", &self.confidence)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingSignal {
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    pub supporting_factors: Vec<String>,
    /// Name of the matching rule, `None` for the default hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
}

impl Default for TradingSignal {
    fn default() -> Self {
        Self {
            recommendation: Recommendation::Hold,
            confidence: Confidence::Low,
            supporting_factors: Vec::new(),
            rule: None,
        }
    }
}

fn bullish(i: &SignalInputs<'_>) -> bool {
    i.trend.direction == TrendDirection::Bullish
}

fn bearish(i: &SignalInputs<'_>) -> bool {
    i.trend.direction == TrendDirection::Bearish
}

fn rsi(i: &SignalInputs<'_>) -> f64 {
    i.momentum.rsi_value
}

pub static RULES: [SignalRule; 7] = [
    SignalRule {
        name: "oversold_bullish_breakout",
        applies: |i| {
            bullish(i)
                && i.momentum.rsi_status == RsiStatus::Oversold
                && i.risk.volatility_level != VolatilityLevel::High
                && i.risk.volume_analysis.volume_trend == VolumeTrend::High
        },
        recommendation: Recommendation::StrongBuy,
        confidence: Confidence::VeryHigh,
        factors: &[
            "Strong bullish trend",
            "Oversold RSI indicating potential reversal",
            "High volume confirming trend",
            "Moderate volatility suggesting stable movement",
        ],
    },
    SignalRule {
        name: "bullish_recovery",
        applies: |i| {
            bullish(i)
                && rsi(i) > 40.0
                && i.momentum.rsi_trend == Direction::Increasing
                && i.trend.ma_crossover == TrendDirection::Bullish
        },
        recommendation: Recommendation::Buy,
        confidence: Confidence::Moderate,
        factors: &[
            "Bullish trend confirmation",
            "RSI showing recovery",
            "Positive MA crossover",
        ],
    },
    SignalRule {
        name: "overbought_bearish_reversal",
        applies: |i| {
            bearish(i)
                && i.momentum.rsi_status == RsiStatus::Overbought
                && i.risk.price_vs_bands == BandPosition::UpperBand
                && i.risk.volume_analysis.price_volume_alignment
                    == PriceVolumeAlignment::Divergent
        },
        recommendation: Recommendation::StrongSell,
        confidence: Confidence::VeryHigh,
        factors: &[
            "Bearish trend developing",
            "Overbought RSI indicating potential reversal",
            "Price at upper Bollinger Band",
            "Volume not supporting price movement",
        ],
    },
    SignalRule {
        name: "bearish_weakness",
        applies: |i| {
            bearish(i)
                && rsi(i) < 60.0
                && i.momentum.rsi_trend == Direction::Decreasing
                && i.risk.volatility_level == VolatilityLevel::High
        },
        recommendation: Recommendation::Sell,
        confidence: Confidence::Moderate,
        factors: &[
            "Bearish trend",
            "Declining momentum",
            "High volatility indicating uncertainty",
        ],
    },
    SignalRule {
        name: "accumulation",
        applies: |i| {
            bullish(i)
                && (40.0..=60.0).contains(&rsi(i))
                && i.risk.price_vs_bands == BandPosition::Middle
                && i.risk.volume_analysis.volume_direction == Direction::Increasing
        },
        recommendation: Recommendation::Accumulate,
        confidence: Confidence::Moderate,
        factors: &[
            "Stable bullish trend",
            "Neutral RSI suggesting room for growth",
            "Price in middle of Bollinger Bands",
            "Increasing volume showing growing interest",
        ],
    },
    SignalRule {
        name: "distribution",
        applies: |i| {
            bearish(i)
                && rsi(i) >= 55.0
                && i.risk.volume_analysis.volume_trend == VolumeTrend::High
                && i.risk.volatility_direction == Direction::Increasing
        },
        recommendation: Recommendation::Distribute,
        confidence: Confidence::Moderate,
        factors: &[
            "Weakening trend",
            "Elevated RSI",
            "High volume suggesting selling pressure",
            "Increasing volatility",
        ],
    },
    SignalRule {
        name: "volatile_indecision",
        applies: |i| {
            i.risk.volatility_level == VolatilityLevel::High && rsi(i) > 45.0 && rsi(i) < 55.0
        },
        recommendation: Recommendation::Wait,
        confidence: Confidence::High,
        factors: &[
            "High market volatility",
            "Neutral RSI indicating no clear direction",
            "Better to wait for clearer signals",
        ],
    },
];

/// The first rule of [`RULES`] that applies, if any.
pub fn matching_rule(inputs: &SignalInputs<'_>) -> Option<&'static SignalRule> {
    RULES.iter().find(|rule| (rule.applies)(inputs))
}

pub fn derive_signal(
    trend: &TrendReport,
    momentum: &MomentumReport,
    risk: &RiskReport,
) -> TradingSignal {
    let inputs = SignalInputs {
        trend,
        momentum,
        risk,
    };

    let signal = match matching_rule(&inputs) {
        Some(rule) => TradingSignal {
            recommendation: rule.recommendation,
            confidence: rule.confidence,
            supporting_factors: rule.factors.iter().map(|f| f.to_string()).collect(),
            rule: Some(rule.name),
        },
        None => TradingSignal::default(),
    };

    tracing::info!(
        stage = %Stage::Signal,
        recommendation = %signal.recommendation,
        confidence = %signal.confidence,
        rule = signal.rule.unwrap_or("default"),
        "trading signal derived"
    );
    signal
}
