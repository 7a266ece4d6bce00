//! Raw Data Gateway (C2) — fetches OHLCV windows from the external
//! provider and applies the `as_of` cutoff.
//!
//! This is the single most important invariant of the whole system: no bar
//! with `t > as_of` may ever leave this module.

use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use feature_store_core::Bar;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 3;

/// The external raw-data provider this gateway wraps. Implementations are
/// free to hit a vendor API, a local Parquet store, or a test fake.
#[async_trait]
pub trait RawDataProvider: Send + Sync {
    async fn fetch_range(&self, ticker: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Bar>>;
}

pub struct RawDataGateway<P: RawDataProvider> {
    provider: P,
}

impl<P: RawDataProvider> RawDataGateway<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetch bars for `[as_of - window_days, as_of]`, sorted ascending and
    /// deduplicated, with every `t <= as_of`. Retries transient upstream
    /// failures with exponential backoff up to [`MAX_ATTEMPTS`]; does not
    /// retry `InsufficientData`.
    pub async fn fetch_bars(&self, ticker: &str, as_of: DateTime<Utc>, window_days: u32) -> Result<Vec<Bar>> {
        let start = as_of - Duration::days(window_days as i64);

        let mut attempt = 0;
        let bars = loop {
            attempt += 1;
            match self.provider.fetch_range(ticker, start, as_of).await {
                Ok(bars) => break bars,
                Err(RuntimeError::Upstream(msg)) if attempt < MAX_ATTEMPTS => {
                    let backoff = std::time::Duration::from_millis(100 * 2u64.pow(attempt - 1));
                    warn!(ticker, attempt, %msg, backoff_ms = backoff.as_millis() as u64, "raw data gateway retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        };

        let mut bars = bars;
        bars.retain(|b| b.t <= as_of);
        bars.sort_by_key(|b| b.t);
        bars.dedup_by_key(|b| b.t);

        if bars.len() < window_days as usize {
            debug!(ticker, window_days, got = bars.len(), "insufficient bars for window");
            return Err(RuntimeError::InsufficientData { needed: window_days, got: bars.len() });
        }

        Ok(bars)
    }
}
