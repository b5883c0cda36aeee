use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `MALFORMED_ID`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `METHOD_NOT_ALLOWED`, `USERNAME_TAKEN`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "TOKEN_INVALID")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "token invalid")]
    pub error: String,
}

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("malformatted id")]
    MalformedId,
    #[error("token missing")]
    TokenMissing,
    #[error("token invalid")]
    TokenInvalid,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("permission denied")]
    PermissionDenied,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("username taken")]
    UsernameTaken,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedId => StatusCode::BAD_REQUEST,
            AppError::TokenMissing | AppError::TokenInvalid | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        let (code, error) = match self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg),
            AppError::MalformedId => ("MALFORMED_ID", "malformatted id".into()),
            // Clients get the same message whether the header was absent or bad.
            AppError::TokenMissing => ("TOKEN_MISSING", "token invalid".into()),
            AppError::TokenInvalid => ("TOKEN_INVALID", "token invalid".into()),
            AppError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "invalid username or password".into(),
            ),
            AppError::PermissionDenied => (
                "PERMISSION_DENIED",
                "only the creator can modify this blog".into(),
            ),
            AppError::NotFound(msg) => ("NOT_FOUND", msg),
            AppError::MethodNotAllowed => ("METHOD_NOT_ALLOWED", "method not allowed".into()),
            AppError::UsernameTaken => (
                "USERNAME_TAKEN",
                "expected `username` to be unique".into(),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ("INTERNAL_ERROR", "an unexpected error occurred".into())
            }
        };
        ErrorBody { code, error }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
