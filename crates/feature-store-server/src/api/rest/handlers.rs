//! API endpoint handlers
//!
//! HTTP request handlers for `get_features`/`warm`/`invalidate`.

use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use axum::{extract::State, Json};
use feature_store_sdk::GetFeaturesOptions;
use std::time::Duration;
use tracing::info;

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy".to_string(), version: env!("CARGO_PKG_VERSION").to_string() })
}

#[axum::debug_handler]
pub(super) async fn get_features(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<GetFeaturesRequestPayload>,
) -> Result<Json<GetFeaturesResponsePayload>, ServerError> {
    if payload.features.is_empty() {
        return Err(ServerError::InvalidRequest("features must be non-empty".to_string()));
    }

    let options = GetFeaturesOptions {
        ttl_override: payload.options.ttl_override_ms.map(Duration::from_millis),
        partial: payload.options.partial,
        deadline: payload.options.deadline_ms.map(Duration::from_millis),
    };

    info!(ticker = %payload.ticker, features = payload.features.len(), "get_features request");
    let batch = state.store.get_features(&payload.ticker, payload.as_of, &payload.features, options).await?;

    Ok(Json(GetFeaturesResponsePayload {
        features: batch.features.into_iter().map(|(k, v)| (k, v.into())).collect(),
        errors: batch.errors.into_iter().map(|(k, v)| (k, v.to_string())).collect(),
        telemetry: batch.telemetry.into(),
    }))
}

#[axum::debug_handler]
pub(super) async fn warm(State(state): State<AppState>, JsonExtractor(payload): JsonExtractor<WarmRequestPayload>) -> Result<Json<WarmResponsePayload>, ServerError> {
    if payload.tickers.is_empty() || payload.features.is_empty() {
        return Err(ServerError::InvalidRequest("tickers and features must both be non-empty".to_string()));
    }

    info!(tickers = payload.tickers.len(), features = payload.features.len(), "warm request");
    let report = state.store.warm(&payload.tickers, &payload.features, payload.as_of).await;
    Ok(Json(WarmResponsePayload { warmed: report.warmed, failed: report.failed }))
}

#[axum::debug_handler]
pub(super) async fn invalidate(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<InvalidateRequestPayload>,
) -> Result<Json<InvalidateResponsePayload>, ServerError> {
    if payload.as_of_start > payload.as_of_end {
        return Err(ServerError::InvalidRequest("as_of_start must not be after as_of_end".to_string()));
    }

    info!(ticker = %payload.ticker, feature = %payload.feature_name, "invalidate request");
    let removed = state.store.invalidate(&payload.ticker, &payload.feature_name, (payload.as_of_start, payload.as_of_end)).await?;
    Ok(Json(InvalidateResponsePayload { removed }))
}
