//! [`FeatureValue`] — a cached scalar and its provenance

use crate::types::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A feature's scalar result, or the first-class "legitimately undefined"
/// state. Distinct from numeric zero and from an error (spec.md glossary).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value")]
pub enum ScalarValue {
    Present(f64),
    Absent,
}

impl ScalarValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ScalarValue::Absent)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Present(v) => Some(*v),
            ScalarValue::Absent => None,
        }
    }
}

/// Which tier produced a [`FeatureValue`]. Informational only — callers may
/// use it to interpret latency, but it is not part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    L1,
    L2,
    Computed,
}

/// A cached feature value, as returned by any tier of the Feature Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub value: ScalarValue,
    pub calculated_at: DateTime<Utc>,
    pub source_tier: SourceTier,
    pub metadata: Value,
}

impl FeatureValue {
    pub fn present(value: f64, calculated_at: DateTime<Utc>, source_tier: SourceTier, metadata: Value) -> Self {
        Self { value: ScalarValue::Present(value), calculated_at, source_tier, metadata }
    }

    pub fn absent(calculated_at: DateTime<Utc>, source_tier: SourceTier, metadata: Value) -> Self {
        Self { value: ScalarValue::Absent, calculated_at, source_tier, metadata }
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_absent()
    }

    /// Reinterpret this value as if it had been served from a different tier.
    /// Used when L2 hands a row to the Facade for L1 promotion: the value is
    /// unchanged, only its reported provenance changes.
    pub fn with_source_tier(mut self, tier: SourceTier) -> Self {
        self.source_tier = tier;
        self
    }
}
