//! JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ModelConfigError;
use crate::models::INVALID_PAYLOAD;

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error that renders as `{"error": ...}` with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn invalid_payload() -> Self {
        Self::new(StatusCode::BAD_REQUEST, INVALID_PAYLOAD)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ModelConfigError> for ApiError {
    fn from(err: ModelConfigError) -> Self {
        match err {
            ModelConfigError::Unauthorized => Self::unauthorized(),
            ModelConfigError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            other => {
                tracing::error!(error = %other, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
