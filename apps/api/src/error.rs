use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lumora_core::AppError;

use crate::dto::{ErrorResponse, FieldErrorResponse};

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
        let status = match self.0 {
            AppError::Validation(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::FailedPrecondition(_) => StatusCode::PRECONDITION_FAILED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let field_errors = match &self.0 {
            AppError::InvalidRequest(errors) => Some(
                errors
                    .as_slice()
                    .iter()
                    .map(|error| FieldErrorResponse {
                        path: error.path.clone(),
                        message: error.message.clone(),
                    })
                    .collect(),
            ),
            _ => None,
        };

        let payload = Json(ErrorResponse {
            message: self.0.to_string(),
            field_errors,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
