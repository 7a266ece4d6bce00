//! Metrics collection and reporting

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Counter metric
#[derive(Debug, Clone)]
pub struct Counter {
    name: String,
    value: Arc<RwLock<u64>>,
    labels: HashMap<String, String>,
}

impl Counter {
    pub fn new(name: String) -> Self {
        Self { name, value: Arc::new(RwLock::new(0)), labels: HashMap::new() }
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, value: u64) {
        *self.value.write().unwrap() += value;
    }

    pub fn get(&self) -> u64 {
        *self.value.read().unwrap()
    }

    pub fn reset(&self) {
        *self.value.write().unwrap() = 0;
    }
}

/// Histogram metric for tracking distributions
#[derive(Debug, Clone)]
pub struct Histogram {
    name: String,
    values: Arc<RwLock<Vec<f64>>>,
    labels: HashMap<String, String>,
}

impl Histogram {
    pub fn new(name: String) -> Self {
        Self { name, values: Arc::new(RwLock::new(Vec::new())), labels: HashMap::new() }
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn observe(&self, value: f64) {
        self.values.write().unwrap().push(value);
    }

    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64());
    }

    pub fn count(&self) -> usize {
        self.values.read().unwrap().len()
    }

    pub fn sum(&self) -> f64 {
        self.values.read().unwrap().iter().sum()
    }

    pub fn avg(&self) -> f64 {
        let values = self.values.read().unwrap();
        if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / values.len() as f64 }
    }

    pub fn percentile(&self, p: f64) -> f64 {
        let mut values = self.values.read().unwrap().clone();
        if values.is_empty() {
            return 0.0;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let index = ((p / 100.0) * (values.len() - 1) as f64).round() as usize;
        values[index]
    }

    pub fn reset(&self) {
        self.values.write().unwrap().clear();
    }
}

/// Metrics sink trait — the external collaborator spec.md §1 calls out as
/// "a metrics sink accepting counter/gauge/histogram updates". A real
/// deployment would implement this against StatsD/Prometheus push gateway;
/// [`MetricsCollector`] is the in-process default.
pub trait Metrics: Send + Sync {
    fn counter(&self, name: &str) -> Arc<Counter>;
    fn histogram(&self, name: &str) -> Arc<Histogram>;
    fn record_execution_time(&self, operation: &str, duration: Duration);
    fn record_error(&self, error_type: &str);
}

/// Hand-rolled counter/histogram registry, keyed by metric name.
pub struct MetricsCollector {
    counters: Arc<RwLock<HashMap<String, Arc<Counter>>>>,
    histograms: Arc<RwLock<HashMap<String, Arc<Histogram>>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self { counters: Arc::new(RwLock::new(HashMap::new())), histograms: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn counter_names(&self) -> Vec<String> {
        self.counters.read().unwrap().keys().cloned().collect()
    }

    pub fn histogram_names(&self) -> Vec<String> {
        self.histograms.read().unwrap().keys().cloned().collect()
    }

    pub fn reset_all(&self) {
        for counter in self.counters.read().unwrap().values() {
            counter.reset();
        }
        for histogram in self.histograms.read().unwrap().values() {
            histogram.reset();
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics for MetricsCollector {
    fn counter(&self, name: &str) -> Arc<Counter> {
        self.counters.write().unwrap().entry(name.to_string()).or_insert_with(|| Arc::new(Counter::new(name.to_string()))).clone()
    }

    fn histogram(&self, name: &str) -> Arc<Histogram> {
        self.histograms.write().unwrap().entry(name.to_string()).or_insert_with(|| Arc::new(Histogram::new(name.to_string()))).clone()
    }

    fn record_execution_time(&self, operation: &str, duration: Duration) {
        self.histogram(&format!("{}_duration", operation)).observe_duration(duration);
    }

    fn record_error(&self, error_type: &str) {
        self.counter(&format!("errors_{}", error_type)).inc();
    }
}

/// Tier a feature request was ultimately served from, for
/// `feature_requests_total{tier=...}` labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTier {
    L1,
    L2,
    Computed,
    Absent,
}

impl RequestTier {
    fn label(self) -> &'static str {
        match self {
            RequestTier::L1 => "l1",
            RequestTier::L2 => "l2",
            RequestTier::Computed => "computed",
            RequestTier::Absent => "absent",
        }
    }
}

/// Metrics & Cost Tracker (C8) — the fixed set of series spec.md §4.8
/// requires, built on top of [`MetricsCollector`].
pub struct CostTracker {
    collector: MetricsCollector,
}

impl CostTracker {
    pub fn new() -> Self {
        Self { collector: MetricsCollector::new() }
    }

    pub fn record_request(&self, tier: RequestTier, latency: Duration) {
        self.collector.counter(&format!("feature_requests_total_{}", tier.label())).inc();
        self.collector.histogram(&format!("feature_latency_seconds_{}", tier.label())).observe_duration(latency);
    }

    pub fn record_compute_run(&self, feature_name: &str) {
        self.collector.counter(&format!("compute_runs_total_{}", feature_name)).inc();
    }

    pub fn record_cost(&self, cost_usd: f64) {
        self.collector.histogram("estimated_cost_usd_total").observe(cost_usd);
    }

    pub fn record_l1_unavailable(&self) {
        self.collector.counter("l1_unavailable").inc();
    }

    pub fn record_uncached_served(&self) {
        self.collector.counter("uncached_served").inc();
    }

    /// Computed gauge: hits / (hits + misses) across L1 and L2.
    pub fn cache_hit_ratio(&self) -> f64 {
        let hits = self.collector.counter("feature_requests_total_l1").get() + self.collector.counter("feature_requests_total_l2").get();
        let misses = self.collector.counter("feature_requests_total_computed").get() + self.collector.counter("feature_requests_total_absent").get();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn estimated_cost_usd_total(&self) -> f64 {
        self.collector.histogram("estimated_cost_usd_total").sum()
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new()
    }
}
