use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// ApiResult
///
/// Result alias used by every handler. Errors convert automatically into
/// HTTP responses via the `IntoResponse` implementation below.
pub type ApiResult<T> = Result<T, ApiError>;

/// ApiError
///
/// The unified error taxonomy of the application. Handlers and the repository
/// speak in these terms; the mapping to HTTP status codes happens exactly once,
/// in `IntoResponse`. Internal errors are logged server-side with full detail
/// while the client only ever sees an opaque message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing payload fields (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed, or expired bearer token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Failed login. The message is deliberately generic so that the response
    /// cannot be used to probe which of the two fields was wrong (401).
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The referenced record does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness invariant was violated, e.g. a duplicate username (409).
    #[error("{0}")]
    Conflict(String),

    /// Storage or other unexpected failure (500). The payload is for the log
    /// only and is never surfaced to the client.
    #[error("an internal error occurred")]
    Internal(String),
}

/// ErrorResponse
///
/// The JSON body every error response carries.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g. "conflict", "not_found").
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid username or password".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(detail) => {
                // Full detail stays in the server log; the client gets an opaque body.
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Translates storage-driver errors into the taxonomy.
///
/// Constraint violations are the interesting cases: the schema is the final
/// arbiter of uniqueness and referential integrity, so a unique violation that
/// slipped past an application-level pre-check still resolves to `Conflict`,
/// and an insert referencing a missing parent row resolves to `NotFound`.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict("Record already exists".to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ApiError::NotFound("Referenced record does not exist".to_string())
            }
            _ => ApiError::Internal(format!("database error: {err}")),
        }
    }
}

impl From<crate::password::PasswordError> for ApiError {
    fn from(err: crate::password::PasswordError) -> Self {
        ApiError::Internal(format!("password operation failed: {err}"))
    }
}
