//! # Application Error
//!
//! Maps engine errors to structured HTTP responses with proper status
//! codes and error bodies. The `retryable` flag mirrors
//! [`EngineError::is_retryable`] so clients know which failures to retry
//! with backoff.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use caseflow_core::EngineError;

/// Application-level error wrapping an engine error for HTTP transport.
#[derive(Debug)]
pub struct AppError(pub EngineError);

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::InvalidTransition { .. } => StatusCode::CONFLICT,
            EngineError::NotReportable(_) => StatusCode::CONFLICT,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::ConcurrentModification { .. } => StatusCode::CONFLICT,
            EngineError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn kind(&self) -> &'static str {
        match &self.0 {
            EngineError::Validation(_) => "VALIDATION",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::NotReportable(_) => "NOT_REPORTABLE",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            EngineError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "kind": self.kind(),
                "message": self.0.to_string(),
                "retryable": self.0.is_retryable(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}
