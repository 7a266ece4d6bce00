//! [`FeatureDefinition`] — a feature registered ahead of time

use crate::types::bar::Bar;
use crate::types::key::TtlClass;
use std::fmt;
use std::sync::Arc;

/// Raw OHLCV fields a compute function is allowed to read. Declarative only
/// — the Compute Engine does not currently enforce it against actual field
/// access, but the Raw Data Gateway uses it to decide which columns to
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// What a compute function produces for a single window of bars.
///
/// Distinct from an error: `Absent` means "legitimately undefined for this
/// key", not "the computation failed".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComputeOutcome {
    Value(f64),
    Absent,
}

/// `bars` is sorted ascending by timestamp and every entry satisfies
/// `t <= as_of`; the function must not look outside the slice it is given.
pub type ComputeFn = Arc<dyn Fn(&[Bar]) -> ComputeOutcome + Send + Sync>;

/// A registered feature: name, version, refresh cadence, and the pure
/// function that derives its value from raw bars.
///
/// Immutable once constructed — a logic change requires a new `version`;
/// there is no in-place mutation of a definition after registration.
#[derive(Clone)]
pub struct FeatureDefinition {
    pub name: String,
    pub version: u32,
    pub ttl_class: TtlClass,
    pub window_days: u32,
    pub raw_dependencies: Vec<RawField>,
    pub description: String,
    compute_fn: ComputeFn,
}

impl FeatureDefinition {
    pub fn new(
        name: impl Into<String>,
        version: u32,
        ttl_class: TtlClass,
        window_days: u32,
        raw_dependencies: Vec<RawField>,
        description: impl Into<String>,
        compute_fn: ComputeFn,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            ttl_class,
            window_days,
            raw_dependencies,
            description: description.into(),
            compute_fn,
        }
    }

    /// Run the compute function against a window already validated by the
    /// caller to contain at least `window_days` bars, all with `t <= as_of`.
    pub fn compute(&self, bars: &[Bar]) -> ComputeOutcome {
        (self.compute_fn)(bars)
    }
}

impl fmt::Debug for FeatureDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDefinition")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("ttl_class", &self.ttl_class)
            .field("window_days", &self.window_days)
            .field("raw_dependencies", &self.raw_dependencies)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn compute_delegates_to_closure() {
        let defn = FeatureDefinition::new(
            "ret_5d",
            1,
            TtlClass::Daily,
            5,
            vec![RawField::Close],
            "5-day return",
            Arc::new(|bars: &[Bar]| {
                if bars.len() < 2 {
                    return ComputeOutcome::Absent;
                }
                let first = bars.first().unwrap().close;
                let last = bars.last().unwrap().close;
                ComputeOutcome::Value((last - first) / first)
            }),
        );

        let t = Utc::now();
        let bars = vec![Bar::new(t, 1.0, 1.0, 1.0, 100.0, 0.0), Bar::new(t, 1.0, 1.0, 1.0, 110.0, 0.0)];
        assert_eq!(defn.compute(&bars), ComputeOutcome::Value(0.1));
        assert_eq!(defn.compute(&[]), ComputeOutcome::Absent);
    }
}
