//! REST API type definitions
//!
//! Request and response types for the `get_features`/`warm`/`invalidate`
//! endpoints.

use crate::AppFeatureStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Application state: one shared handle to the Feature Store facade.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AppFeatureStore>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `POST /v1/features` request body.
#[derive(Debug, Deserialize)]
pub struct GetFeaturesRequestPayload {
    pub ticker: String,
    pub as_of: DateTime<Utc>,
    pub features: Vec<String>,
    #[serde(default)]
    pub options: RequestOptionsPayload,
}

/// Per-call options mirrored from [`feature_store_sdk::GetFeaturesOptions`].
/// `ttl_override_ms`/`deadline_ms` are milliseconds since JSON has no
/// native `Duration`.
#[derive(Debug, Default, Deserialize)]
pub struct RequestOptionsPayload {
    #[serde(default)]
    pub ttl_override_ms: Option<u64>,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GetFeaturesResponsePayload {
    pub features: HashMap<String, ScalarValuePayload>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub errors: HashMap<String, String>,
    pub telemetry: TelemetryPayload,
}

/// JSON rendering of `ScalarValue`. `Absent` serializes with `value: null`
/// and `is_absent: true`, so clients distinguish it from a present zero by
/// the sibling field rather than by value shape.
#[derive(Debug, Serialize)]
pub struct ScalarValuePayload {
    pub value: Option<f64>,
    pub is_absent: bool,
}

impl From<feature_store_core::ScalarValue> for ScalarValuePayload {
    fn from(v: feature_store_core::ScalarValue) -> Self {
        Self { value: v.as_f64(), is_absent: v.is_absent() }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetryPayload {
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub computed: usize,
    pub latency_ms: u64,
    pub source_per_feature: HashMap<String, &'static str>,
}

impl From<feature_store_sdk::Telemetry> for TelemetryPayload {
    fn from(t: feature_store_sdk::Telemetry) -> Self {
        let source_per_feature = t
            .source_per_feature
            .into_iter()
            .map(|(k, v)| {
                let label = match v {
                    feature_store_core::SourceTier::L1 => "l1",
                    feature_store_core::SourceTier::L2 => "l2",
                    feature_store_core::SourceTier::Computed => "computed",
                };
                (k, label)
            })
            .collect();
        Self { cache_hits: t.cache_hits, cache_misses: t.cache_misses, computed: t.computed, latency_ms: t.latency_ms, source_per_feature }
    }
}

/// `POST /v1/warm` request body.
#[derive(Debug, Deserialize)]
pub struct WarmRequestPayload {
    pub tickers: Vec<String>,
    pub features: Vec<String>,
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WarmResponsePayload {
    pub warmed: usize,
    pub failed: usize,
}

/// `POST /v1/invalidate` request body.
#[derive(Debug, Deserialize)]
pub struct InvalidateRequestPayload {
    pub ticker: String,
    pub feature_name: String,
    pub as_of_start: DateTime<Utc>,
    pub as_of_end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponsePayload {
    pub removed: usize,
}
