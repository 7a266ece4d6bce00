//! Tests for REST API components: payload conversions plus end-to-end
//! router tests exercising `/health`, `/v1/features`, `/v1/warm`, and
//! `/v1/invalidate`.

#![cfg(test)]

use super::types::*;
use crate::raw_data::CsvRawDataProvider;
use crate::{features, AppFeatureStore};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use feature_store_core::{ScalarValue, SourceTier};
use feature_store_sdk::{FeatureStoreBuilder, Telemetry};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

#[test]
fn scalar_value_payload_present_round_trips_through_f64() {
    let payload: ScalarValuePayload = ScalarValue::Present(0.0523).into();
    assert_eq!(payload.value, Some(0.0523));
    assert!(!payload.is_absent);
}

#[test]
fn scalar_value_payload_absent_has_no_value() {
    let payload: ScalarValuePayload = ScalarValue::Absent.into();
    assert_eq!(payload.value, None);
    assert!(payload.is_absent);
}

#[test]
fn telemetry_payload_maps_source_tier_labels() {
    let mut source_per_feature = HashMap::new();
    source_per_feature.insert("ret_5d".to_string(), SourceTier::L1);
    source_per_feature.insert("ret_20d".to_string(), SourceTier::Computed);
    let telemetry = Telemetry { cache_hits: 1, cache_misses: 1, computed: 1, latency_ms: 7, source_per_feature };

    let payload: TelemetryPayload = telemetry.into();
    assert_eq!(payload.cache_hits, 1);
    assert_eq!(payload.latency_ms, 7);
    assert_eq!(payload.source_per_feature.get("ret_5d"), Some(&"l1"));
    assert_eq!(payload.source_per_feature.get("ret_20d"), Some(&"computed"));
}

#[test]
fn test_health_response_fields() {
    let response = HealthResponse { status: "healthy".to_string(), version: "1.0.0".to_string() };
    assert_eq!(response.status, "healthy");
    assert_eq!(response.version, "1.0.0");
}

/// Builds a store over a tempdir with one `AAPL.csv` of 30 daily bars ending
/// 2024-11-08, close price equal to day-of-month.
fn test_store() -> (Arc<AppFeatureStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut f = std::fs::File::create(dir.path().join("AAPL.csv")).unwrap();
    for day in 1..=30 {
        writeln!(f, "2024-10-{day:02},1,1,1,{day},1000").unwrap_or(());
    }
    // October only has 31 days; also seed a handful of November days so a
    // `window_days = 5` request against an early-November as_of resolves.
    for day in 1..=8 {
        writeln!(f, "2024-11-{day:02},1,1,1,{},1000", 30 + day).unwrap();
    }

    let provider = CsvRawDataProvider::new(dir.path().to_path_buf());
    let store = FeatureStoreBuilder::new(provider).with_features(features::builtin_definitions()).build().unwrap();
    (Arc::new(store), dir)
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (store, _dir) = test_store();
    let app = crate::api::create_router(store);

    let response = app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "healthy");
}

#[tokio::test]
async fn get_features_endpoint_computes_and_returns_value() {
    let (store, _dir) = test_store();
    let app = crate::api::create_router(store);

    let body = serde_json::json!({
        "ticker": "AAPL",
        "as_of": "2024-11-08T00:00:00Z",
        "features": ["ret_5d"],
    });
    let request = Request::builder()
        .method("POST")
        .uri("/v1/features")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(parsed["features"]["ret_5d"]["value"].is_number());
    assert_eq!(parsed["telemetry"]["computed"], 1);
}

#[tokio::test]
async fn get_features_endpoint_rejects_empty_feature_list() {
    let (store, _dir) = test_store();
    let app = crate::api::create_router(store);

    let body = serde_json::json!({ "ticker": "AAPL", "as_of": "2024-11-08T00:00:00Z", "features": [] });
    let request = Request::builder()
        .method("POST")
        .uri("/v1/features")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_features_endpoint_reports_unknown_feature_as_not_found() {
    let (store, _dir) = test_store();
    let app = crate::api::create_router(store);

    let body = serde_json::json!({ "ticker": "AAPL", "as_of": "2024-11-08T00:00:00Z", "features": ["nonexistent"] });
    let request = Request::builder()
        .method("POST")
        .uri("/v1/features")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn warm_endpoint_reports_warmed_count() {
    let (store, _dir) = test_store();
    let app = crate::api::create_router(store);

    let body = serde_json::json!({
        "tickers": ["AAPL"],
        "features": ["ret_5d"],
        "as_of": "2024-11-08T00:00:00Z",
    });
    let request = Request::builder()
        .method("POST")
        .uri("/v1/warm")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["warmed"], 1);
    assert_eq!(parsed["failed"], 0);
}

#[tokio::test]
async fn invalidate_endpoint_rejects_inverted_range() {
    let (store, _dir) = test_store();
    let app = crate::api::create_router(store);

    let body = serde_json::json!({
        "ticker": "AAPL",
        "feature_name": "ret_5d",
        "as_of_start": "2024-11-08T00:00:00Z",
        "as_of_end": "2024-11-01T00:00:00Z",
    });
    let request = Request::builder()
        .method("POST")
        .uri("/v1/invalidate")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalidate_endpoint_forces_recompute_via_features_endpoint() {
    let (store, _dir) = test_store();
    let app = crate::api::create_router(store.clone());

    let feature_body = serde_json::json!({ "ticker": "AAPL", "as_of": "2024-11-08T00:00:00Z", "features": ["ret_5d"] });
    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/features")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&feature_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let invalidate_body = serde_json::json!({
        "ticker": "AAPL",
        "feature_name": "ret_5d",
        "as_of_start": "2024-11-07T00:00:00Z",
        "as_of_end": "2024-11-09T00:00:00Z",
    });
    let invalidate_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&invalidate_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(invalidate_response.status(), StatusCode::OK);
    let body = invalidate_response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["removed"], 1);

    let second = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/features")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&feature_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let body = second.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["telemetry"]["computed"], 1, "invalidate must force a fresh compute");
}
