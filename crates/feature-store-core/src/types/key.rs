//! [`FeatureKey`] — the identity of a cached feature value

use crate::error::{CoreError, Result};
use chrono::{DateTime, SubsecRound, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse categorization of a feature's refresh cadence.
///
/// Determines the normalization unit for `as_of` (day boundary for
/// `Daily`/`Static`, minute boundary for `Intraday`) and the default L1 TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    Intraday,
    Daily,
    Static,
}

impl fmt::Display for TtlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TtlClass::Intraday => "intraday",
            TtlClass::Daily => "daily",
            TtlClass::Static => "static",
        };
        write!(f, "{s}")
    }
}

/// The identity of a cached value: `(ticker, feature_name, as_of, version)`.
///
/// `as_of` is always stored already normalized to the unit implied by
/// `ttl_class` — callers never construct a `FeatureKey` with a raw
/// timestamp and a class separately, because that would allow two
/// differently-precise requests for "the same" key to silently diverge.
/// Use [`FeatureKey::new`], which normalizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureKey {
    pub ticker: String,
    pub feature_name: String,
    as_of: DateTime<Utc>,
    pub version: u32,
}

impl FeatureKey {
    /// Build a key, normalizing `as_of` to the unit implied by `ttl_class`.
    ///
    /// `version = 0` means "latest" and is preserved as-is; resolving it to
    /// a concrete version number is the Registry's job, not the key's.
    pub fn new(
        ticker: impl Into<String>,
        feature_name: impl Into<String>,
        as_of: DateTime<Utc>,
        ttl_class: TtlClass,
        version: u32,
    ) -> Result<Self> {
        let ticker = ticker.into();
        if ticker.is_empty() || !ticker.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            return Err(CoreError::InvalidTicker(ticker));
        }
        let feature_name = feature_name.into();
        if feature_name.is_empty() {
            return Err(CoreError::InvalidFeatureName(feature_name));
        }
        Ok(Self {
            ticker,
            feature_name,
            as_of: normalize_as_of(as_of, ttl_class),
            version,
        })
    }

    /// The normalized cutoff timestamp. Two keys built from sub-unit-precision
    /// timestamps of the same unit compare equal because this is what
    /// `Hash`/`Eq` are derived over.
    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// Stable textual encoding used as the L1 cache key (spec §6):
    /// `feature:{TICKER}:{feature_name}:{YYYY-MM-DD or YYYY-MM-DDTHH:MM}:{version}`
    pub fn encode(&self, ttl_class: TtlClass) -> String {
        let as_of_str = match ttl_class {
            TtlClass::Daily | TtlClass::Static => self.as_of.format("%Y-%m-%d").to_string(),
            TtlClass::Intraday => self.as_of.format("%Y-%m-%dT%H:%M").to_string(),
        };
        format!(
            "feature:{}:{}:{}:{}",
            self.ticker, self.feature_name, as_of_str, self.version
        )
    }
}

/// Normalize `as_of` to the day boundary (daily/static) or minute boundary
/// (intraday). This is the single source of truth for the equality invariant
/// in spec.md §3: "Two requests that differ only in sub-normalization-unit
/// precision MUST hit the same cache entry."
pub fn normalize_as_of(as_of: DateTime<Utc>, ttl_class: TtlClass) -> DateTime<Utc> {
    match ttl_class {
        TtlClass::Daily | TtlClass::Static => as_of
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc(),
        TtlClass::Intraday => as_of
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or_else(|| as_of.round_subsecs(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn daily_keys_collapse_sub_day_precision() {
        let a = FeatureKey::new("AAPL", "ret_5d", dt(2024, 11, 8, 0, 0, 0), TtlClass::Daily, 1).unwrap();
        let b = FeatureKey::new("AAPL", "ret_5d", dt(2024, 11, 8, 23, 59, 59), TtlClass::Daily, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn intraday_keys_collapse_sub_minute_precision() {
        let a = FeatureKey::new("AAPL", "vwap_5m", dt(2024, 11, 8, 9, 31, 0), TtlClass::Intraday, 1).unwrap();
        let b = FeatureKey::new("AAPL", "vwap_5m", dt(2024, 11, 8, 9, 31, 59), TtlClass::Intraday, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn intraday_keys_differ_across_minutes() {
        let a = FeatureKey::new("AAPL", "vwap_5m", dt(2024, 11, 8, 9, 31, 0), TtlClass::Intraday, 1).unwrap();
        let b = FeatureKey::new("AAPL", "vwap_5m", dt(2024, 11, 8, 9, 32, 0), TtlClass::Intraday, 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn encoding_matches_stable_format() {
        let k = FeatureKey::new("AAPL", "ret_5d", dt(2024, 11, 8, 15, 0, 0), TtlClass::Daily, 1).unwrap();
        assert_eq!(k.encode(TtlClass::Daily), "feature:AAPL:ret_5d:2024-11-08:1");

        let k2 = FeatureKey::new("AAPL", "vwap_5m", dt(2024, 11, 8, 9, 31, 0), TtlClass::Intraday, 2).unwrap();
        assert_eq!(k2.encode(TtlClass::Intraday), "feature:AAPL:vwap_5m:2024-11-08T09:31:2");
    }

    #[test]
    fn rejects_lowercase_ticker() {
        let err = FeatureKey::new("aapl", "ret_5d", dt(2024, 11, 8, 0, 0, 0), TtlClass::Daily, 1);
        assert!(err.is_err());
    }
}
