//! RSI (Relative Strength Index).
//!
//! Average gain/loss are simple means over the trailing n price changes:
//! - change[i] = C[i] - C[i-1]
//! - gain = max(change, 0), loss = max(-change, 0)
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100 when avg_gain > 0, otherwise 50 (no movement
//! in the window reads as neutral).
//!
//! Warmup: first n bars are undefined (n changes are needed).

use crate::domain::indicator::{finite, Column, RollingWindow};

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Column {
    let mut values = Vec::with_capacity(closes.len());
    if period == 0 {
        values.resize(closes.len(), None);
        return values;
    }
    if closes.is_empty() {
        return values;
    }

    let mut gains = RollingWindow::new(period);
    let mut losses = RollingWindow::new(period);
    values.push(None);

    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });

        let rsi = match (gains.is_full(), gains.mean(), losses.mean()) {
            (true, Some(avg_gain), Some(avg_loss)) => rsi_from_averages(avg_gain, avg_loss),
            _ => None,
        };
        values.push(rsi);
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let avg_gain = avg_gain.max(0.0);
    if avg_loss <= 0.0 {
        return Some(if avg_gain > 0.0 { 100.0 } else { NEUTRAL_RSI });
    }
    finite(100.0 - (100.0 / (1.0 + avg_gain / avg_loss))).map(|rsi| rsi.clamp(0.0, 100.0))
}
