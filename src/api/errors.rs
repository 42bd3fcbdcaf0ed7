use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{truncate_detail, AppError};

/// Longest backend message echoed to clients.
pub const MAX_ERROR_DETAIL: usize = 80;

impl AppError {
    /// Stable machine-readable code used in the `error` field of responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::Database(_) => "storage_error",
            AppError::Config(_) | AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Converts AppError into a `{"error": code, "detail": ...}` JSON response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let detail = match &self {
            AppError::Validation(errors) => json!(errors.errors),
            AppError::BadRequest(msg) | AppError::StorageUnavailable(msg) => json!(msg),
            AppError::Database(msg) => json!(truncate_detail(msg, MAX_ERROR_DETAIL)),
            AppError::Config(_) | AppError::Internal(_) => json!("Internal server error"),
        };

        if status.is_server_error() {
            tracing::error!("{} ({}): {}", status, code, self);
        }

        let body = json!({
            "error": code,
            "detail": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}
