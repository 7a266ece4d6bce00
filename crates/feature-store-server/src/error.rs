//! Server error types — maps [`SdkError`] onto HTTP status codes.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use feature_store_sdk::SdkError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Sdk(SdkError::UnknownFeature(_)) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Sdk(SdkError::UnknownTicker(_)) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Sdk(SdkError::Deadline) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            ServerError::Sdk(SdkError::Overloaded) => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServerError::Sdk(SdkError::Upstream(_)) => (StatusCode::BAD_GATEWAY, self.to_string()),
            ServerError::Sdk(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_feature_maps_to_not_found() {
        let err = ServerError::Sdk(SdkError::UnknownFeature("nope".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn overloaded_maps_to_429() {
        let err = ServerError::Sdk(SdkError::Overloaded);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn invalid_request_maps_to_400() {
        let err = ServerError::InvalidRequest("bad ticker".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
