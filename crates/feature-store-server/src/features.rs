//! Built-in feature catalog — the explicit `(name, version, compute_fn,
//! window_days, ttl_class)` table the Registry is seeded from at startup
//! (spec.md's Redesign Flags call for exactly this: no dynamic lookup of
//! compute functions by string at call time).

use feature_store_core::{Bar, ComputeOutcome, FeatureDefinition, RawField, TtlClass};
use std::sync::Arc;

/// Every feature this server knows how to compute. Registration order does
/// not matter; duplicate `(name, version)` pairs fail at `build()` time.
pub fn builtin_definitions() -> Vec<FeatureDefinition> {
    vec![
        simple_return("ret_5d", 1, 5),
        simple_return("ret_20d", 1, 20),
        simple_moving_average("sma_20d", 1, 20),
        realized_volatility("volatility_20d", 1, 20),
    ]
}

/// `(close[last] - close[first]) / close[first]` over the whole window.
/// Absent if fewer than 2 bars are available or the window starts at zero.
fn simple_return(name: &'static str, version: u32, window_days: u32) -> FeatureDefinition {
    FeatureDefinition::new(
        name,
        version,
        TtlClass::Daily,
        window_days,
        vec![RawField::Close],
        format!("{window_days}-day simple return"),
        Arc::new(|bars: &[Bar]| {
            if bars.len() < 2 {
                return ComputeOutcome::Absent;
            }
            let first = bars.first().unwrap().close;
            let last = bars.last().unwrap().close;
            if first == 0.0 {
                return ComputeOutcome::Absent;
            }
            ComputeOutcome::Value((last - first) / first)
        }),
    )
}

/// Arithmetic mean of `close` across the window.
fn simple_moving_average(name: &'static str, version: u32, window_days: u32) -> FeatureDefinition {
    FeatureDefinition::new(
        name,
        version,
        TtlClass::Daily,
        window_days,
        vec![RawField::Close],
        format!("{window_days}-day simple moving average of close"),
        Arc::new(|bars: &[Bar]| {
            if bars.is_empty() {
                return ComputeOutcome::Absent;
            }
            let sum: f64 = bars.iter().map(|b| b.close).sum();
            ComputeOutcome::Value(sum / bars.len() as f64)
        }),
    )
}

/// Sample standard deviation of day-over-day close returns across the
/// window. Needs at least 3 bars to produce a meaningful sample variance.
fn realized_volatility(name: &'static str, version: u32, window_days: u32) -> FeatureDefinition {
    FeatureDefinition::new(
        name,
        version,
        TtlClass::Daily,
        window_days,
        vec![RawField::Close],
        format!("{window_days}-day realized volatility of daily returns"),
        Arc::new(|bars: &[Bar]| {
            if bars.len() < 3 {
                return ComputeOutcome::Absent;
            }
            let returns: Vec<f64> = bars
                .windows(2)
                .filter_map(|w| if w[0].close == 0.0 { None } else { Some((w[1].close - w[0].close) / w[0].close) })
                .collect();
            if returns.len() < 2 {
                return ComputeOutcome::Absent;
            }
            let mean = returns.iter().sum::<f64>() / returns.len() as f64;
            let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
            ComputeOutcome::Value(variance.sqrt())
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap(), c, c, c, c, 1_000.0))
            .collect()
    }

    #[test]
    fn catalog_registers_without_collisions() {
        let defs = builtin_definitions();
        let mut names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), defs.len());
    }

    #[test]
    fn ret_5d_matches_hand_computation() {
        let defs = builtin_definitions();
        let ret_5d = defs.iter().find(|d| d.name == "ret_5d").unwrap();
        let bs = bars(&[100.0, 101.0, 99.0, 102.0, 105.0, 110.0]);
        match ret_5d.compute(&bs) {
            ComputeOutcome::Value(v) => assert!((v - 0.1).abs() < 1e-9),
            ComputeOutcome::Absent => panic!("expected a value"),
        }
    }

    #[test]
    fn sma_20d_averages_closes() {
        let defs = builtin_definitions();
        let sma = defs.iter().find(|d| d.name == "sma_20d").unwrap();
        let bs = bars(&[10.0, 20.0, 30.0]);
        assert_eq!(sma.compute(&bs), ComputeOutcome::Value(20.0));
    }

    #[test]
    fn volatility_needs_at_least_three_bars() {
        let defs = builtin_definitions();
        let vol = defs.iter().find(|d| d.name == "volatility_20d").unwrap();
        assert_eq!(vol.compute(&bars(&[100.0, 101.0])), ComputeOutcome::Absent);
        assert!(matches!(vol.compute(&bars(&[100.0, 110.0, 95.0])), ComputeOutcome::Value(_)));
    }
}
