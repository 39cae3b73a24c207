use axum::http::StatusCode;
use axum::response::IntoResponse;
use sqlx::Error;
use thiserror::Error;

/// Error taxonomy per spec.md §7 — kinds, not one-exception-per-cause.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input: unknown format, missing required field, unknown field map
    /// entry. Reported to the caller, never retried.
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// Store or bus unavailable; retried with backoff by the event bus
    /// facade before escalating to the dead-letter queue.
    #[error("Transient error: {0}")]
    Transient(String),
    /// Malformed rows / undetermined date format beyond the tolerance
    /// threshold — a whole-file quality failure.
    #[error("Data quality error: {0}")]
    DataQuality(String),
    /// A conditional write collided with an existing, matching record;
    /// callers should treat this as success after verifying the match.
    #[error("Idempotency conflict: {0}")]
    IdempotencyConflict(String),
    #[error("Database error: {0}")]
    Db(sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            AppError::Transient(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg).into_response(),
            AppError::DataQuality(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response(),
            AppError::IdempotencyConflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            AppError::Db(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: Error) -> Self {
        AppError::Db(value)
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}



