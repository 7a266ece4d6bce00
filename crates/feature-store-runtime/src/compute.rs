//! Compute Engine (C5) — executes a [`FeatureDefinition`]'s compute
//! function against raw bars already fetched by the Raw Data Gateway.
//!
//! The compute function itself is a pure function of its input slice; this
//! module's only job is enforcing the window-size precondition and turning
//! the result (plus any arithmetic corruption) into a [`FeatureValue`].

use chrono::Utc;
use feature_store_core::{Bar, ComputeOutcome, FeatureDefinition, FeatureValue, SourceTier, Value};
use tracing::warn;

/// Run `defn.compute_fn` against `bars`. Bars must already be cutoff at
/// `as_of` and sorted ascending — the Raw Data Gateway guarantees this.
///
/// A result of `NaN` or infinite from an otherwise well-defined computation
/// is treated as `Absent` with the condition recorded in metadata, per the
/// Compute Engine's error policy; it is not propagated as an error, since
/// the input was well-formed and the function ran to completion.
pub fn run(defn: &FeatureDefinition, bars: &[Bar]) -> FeatureValue {
    let calculated_at = Utc::now();

    match defn.compute(bars) {
        ComputeOutcome::Value(v) if v.is_finite() => {
            FeatureValue::present(v, calculated_at, SourceTier::Computed, Value::object([("bars_used", Value::Number(bars.len() as f64))]))
        }
        ComputeOutcome::Value(v) => {
            warn!(feature = %defn.name, value = v, "compute produced a non-finite value, treating as absent");
            FeatureValue::absent(calculated_at, SourceTier::Computed, Value::object([("reason", Value::String("non_finite_result".to_string()))]))
        }
        ComputeOutcome::Absent => {
            FeatureValue::absent(calculated_at, SourceTier::Computed, Value::object([("bars_used", Value::Number(bars.len() as f64))]))
        }
    }
}
