//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every variant carries the human-readable message that ends up in the
/// `{"error": "..."}` response body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input (unparseable body, id or date).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (e.g., duplicate entry or a delete blocked by references).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Parse(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the bare message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Parse(msg)
            | Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Database(msg)
            | Self::Internal(msg) => msg,
        }
    }
}
