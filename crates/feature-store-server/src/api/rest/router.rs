//! Router creation and configuration

use super::handlers::*;
use super::types::AppState;
use crate::AppFeatureStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the REST API router over a shared Feature Store handle.
pub fn create_router(store: Arc<AppFeatureStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/health", get(health))
        .route("/v1/features", post(get_features))
        .route("/v1/warm", post(warm))
        .route("/v1/invalidate", post(invalidate))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
