use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rentops_core::AppError;
use tracing::error;

mod types;

use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::RoleNotFound(role_name) => (
                StatusCode::NOT_FOUND,
                format!("role '{role_name}' does not exist"),
            ),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Access denied".to_owned()),
            AppError::StoreUnavailable(detail)
            | AppError::CacheUnavailable(detail)
            | AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
