use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use weighbridge_core::AppError;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
    detail: String,
}

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
        let (status, detail) = match self.0 {
            AppError::Validation(ref detail) => (StatusCode::BAD_REQUEST, detail),
            AppError::NotFound(ref detail) => (StatusCode::NOT_FOUND, detail),
            AppError::Conflict(ref detail) => (StatusCode::CONFLICT, detail),
            AppError::Unauthorized(ref detail) => (StatusCode::UNAUTHORIZED, detail),
            AppError::Forbidden(ref detail) => (StatusCode::FORBIDDEN, detail),
            AppError::Internal(ref detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };

        let payload = Json(ErrorResponse {
            detail: detail.clone(),
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
