//! HTTP error mapping.

use super::types::ApiErrorBody;
use crate::provider::ProviderError;
use crate::recon::ReconError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error envelope returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Typed API error with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, r#type: &str, message: String) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                message,
                r#type: r#type.to_string(),
                code: None,
            },
        }
    }

    pub fn bad_request(message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn not_found(message: String) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiErrorResponse { error: self.body })).into_response()
    }
}

impl From<ReconError> for ApiError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::UserNotFound(id) => {
                ApiError::not_found(format!("User not found: {}", id))
            }
            ReconError::Provider(ProviderError::Configuration(msg)) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                msg,
            ),
            ReconError::Provider(e) => {
                ApiError::new(StatusCode::BAD_GATEWAY, "provider_error", e.to_string())
            }
            ReconError::Store(e) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                e.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn user_not_found_maps_to_404() {
        let err: ApiError = ReconError::UserNotFound(Uuid::new_v4()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body.r#type, "not_found");
    }

    #[test]
    fn provider_failure_maps_to_502() {
        let err: ApiError = ReconError::Provider(ProviderError::Upstream {
            status: 503,
            message: "down".to_string(),
        })
        .into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn configuration_failure_maps_to_500() {
        let err: ApiError =
            ReconError::Provider(ProviderError::Configuration("no key".to_string())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
