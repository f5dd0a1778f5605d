use crate::types::HookId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Conflict: subject already registered under hook {existing_id}")]
    Conflict { existing_id: HookId },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The presented hook id is not a well-formed identifier. Reported to
    /// callers exactly like [`CoreError::NotFound`].
    #[error("Invalid hook id: {0}")]
    InvalidId(String),

    #[error("No signature provided")]
    MissingSignature,

    #[error("Signature does not match the hook secret")]
    BadSignature,

    #[error("No template registered for key '{key}'")]
    Render { key: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
