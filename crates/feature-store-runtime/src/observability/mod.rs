//! Observability module
//!
//! Provides metrics (hand-rolled Counter/Histogram/CostTracker) and
//! `tracing` subscriber setup. An optional `otel` feature adds a
//! Prometheus exporter for parity with the source crate; it is off by
//! default.

pub mod metrics;
pub mod otel;
pub mod tracing;

pub use metrics::{CostTracker, Counter, Histogram, Metrics, MetricsCollector, RequestTier};
pub use tracing::init_tracing;
