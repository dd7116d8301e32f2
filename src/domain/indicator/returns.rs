//! Daily simple return.
//!
//! R[i] = (C[i] - C[i-1]) / C[i-1], undefined at i = 0 and wherever the
//! previous close is zero.

use crate::domain::indicator::{finite, Column};

pub fn calculate_returns(closes: &[f64]) -> Column {
    let mut values = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return values;
    }

    values.push(None);
    for pair in closes.windows(2) {
        values.push(finite((pair[1] - pair[0]) / pair[0]));
    }
    values
}
