//! Raw OHLCV bar type consumed by the Raw Data Gateway and Compute Engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV observation for a ticker.
///
/// Bars returned by the Raw Data Gateway are sorted ascending by `t` and
/// deduplicated; the gateway additionally guarantees `t <= as_of` for every
/// bar it hands back (see `feature_store_runtime::gateway`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub t: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(t: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { t, open, high, low, close, volume }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_copy_and_comparable() {
        let t = Utc::now();
        let a = Bar::new(t, 1.0, 2.0, 0.5, 1.5, 1000.0);
        let b = a;
        assert_eq!(a, b);
    }
}
