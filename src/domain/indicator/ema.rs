//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first value, then EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//! Defined from the first point onwards.

use crate::domain::indicator::{finite, Column};

pub fn calculate_ema(values: &[f64], period: usize) -> Column {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema: Option<f64> = None;

    for &value in values {
        let next = match ema {
            None => value,
            Some(prev) => value * k + prev * (1.0 - k),
        };
        ema = Some(next);
        out.push(finite(next));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ema_seeded_by_first_value() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 3);
        assert_eq!(series[0], Some(10.0));
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0], 3);

        let k = 2.0 / 4.0;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);

        assert_relative_eq!(series[1].unwrap(), e1);
        assert_relative_eq!(series[2].unwrap(), e2);
        assert_relative_eq!(series[3].unwrap(), e3);
    }

    #[test]
    fn ema_equal_prices() {
        let series = calculate_ema(&[100.0; 5], 20);
        for v in series {
            assert_relative_eq!(v.unwrap(), 100.0);
        }
    }

    #[test]
    fn ema_smoothing_factor_for_twenty() {
        let series = calculate_ema(&[0.0, 21.0], 20);
        // alpha = 2/21
        assert_relative_eq!(series[1].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn ema_period_0() {
        let series = calculate_ema(&[10.0, 20.0], 0);
        assert_eq!(series, vec![None, None]);
    }

    #[test]
    fn ema_empty() {
        assert!(calculate_ema(&[], 20).is_empty());
    }
}
