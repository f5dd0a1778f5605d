use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hookrelay_core::error::CoreError;
use hookrelay_db::registry::HOOK_NOT_FOUND;
use hookrelay_db::{RegistryError, StoreError};
use hookrelay_events::DispatchError;

/// Message returned for every 500-class error.
pub const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds storage, delivery and
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `hookrelay_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The hook store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One or more destinations rejected a message.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Core(core) => AppError::Core(core),
            RegistryError::Store(store) => AppError::Store(store),
        }
    }
}

/// JSON error body. `errors` and `hint` are only present when they apply.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl ErrorBody {
    fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            errors: None,
            hint: None,
        }
    }

    fn internal() -> Self {
        Self::new("INTERNAL_ERROR", INTERNAL_MESSAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation { errors } => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        errors: Some(errors),
                        ..ErrorBody::new("VALIDATION_ERROR", "Validation failed")
                    },
                ),
                CoreError::Conflict { existing_id } => (
                    StatusCode::FORBIDDEN,
                    ErrorBody {
                        hint: Some(format!("/hooks/{existing_id}")),
                        ..ErrorBody::new(
                            "CONFLICT",
                            "That subject is already registered as a hook here",
                        )
                    },
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::new("UNAUTHORIZED", msg))
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody::new("FORBIDDEN", msg)),
                // A malformed id answers exactly like an unknown one.
                CoreError::NotFound(_) | CoreError::InvalidId(_) => (
                    StatusCode::NOT_FOUND,
                    ErrorBody::new("NOT_FOUND", HOOK_NOT_FOUND),
                ),
                CoreError::MissingSignature => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("MISSING_SIGNATURE", "No signature provided."),
                ),
                CoreError::BadSignature => (
                    StatusCode::FORBIDDEN,
                    ErrorBody::new("INVALID_SIGNATURE", "The signature provided is invalid for this hook."),
                ),
                CoreError::Render { key } => {
                    tracing::error!(template_key = %key, "No template for recognized event");
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
                }
            },

            // --- Storage and delivery ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Hook store error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
            AppError::Dispatch(err) => {
                tracing::error!(
                    destination = %err.destination,
                    failed = err.failed,
                    attempted = err.attempted,
                    error = %err.source,
                    "Message delivery failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg)),
        };

        (status, axum::Json(body)).into_response()
    }
}
