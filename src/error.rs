// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// API error taxonomy with client-friendly messages.
///
/// Every variant renders as the uniform `{ success: false, error }` envelope
/// with HTTP 200 - the wire contract distinguishes failures by message, not
/// status code. The variants still separate the conditions for logging and
/// for tests.
#[derive(Debug)]
pub enum ApiError {
    // Missing or malformed input fields
    Validation(String),

    // No current user on a handler that requires one
    Unauthorized(String),

    // Current user is not the owner of the target record
    Forbidden(String),

    // Missing post / subreddit / vote
    NotFound(String),

    // Uniqueness violation surfaced by the store
    Conflict(String),

    // Unexpected fault; message is already redacted at construction
    Internal(String),
}

impl ApiError {
    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::Internal(msg) => msg,
        }
    }

    /// Get error kind for logging and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    /// Convert to the JSON error envelope
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::database::store::StoreError> for ApiError {
    fn from(err: crate::database::store::StoreError) -> Self {
        match err {
            crate::database::store::StoreError::UniqueViolation => {
                ApiError::conflict("A matching record already exists.")
            }
            crate::database::store::StoreError::ForeignKeyViolation => {
                ApiError::validation("A referenced record does not exist.")
            }
            crate::database::store::StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal("An error occurred while processing your request.")
            }
        }
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("JWT error: {}", err);
        ApiError::internal("An error occurred while processing your request.")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum.
// All forum endpoints answer 200; the envelope carries the failure.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self.to_json())).into_response()
    }
}
