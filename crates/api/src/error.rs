//! Error to HTTP response mapping.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with the status
//! of the underlying [`AppError`] category.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tally_core::{dates::DateError, transaction::TransactionError};
use tally_db::repositories::{BankAccountError, CategoryError};
use tally_shared::AppError;
use tracing::error;

/// Response-side wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// A `400` for unparseable input.
    pub fn parse(message: impl Into<String>) -> Self {
        Self(AppError::Parse(message.into()))
    }

    /// A `400` for a rule violation.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// The wrapped error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.message() }))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        let message = err.to_string();
        Self(match err {
            TransactionError::Validation(_)
            | TransactionError::EmptyBatch(_)
            | TransactionError::BatchTooLarge { .. } => AppError::Validation(message),
            TransactionError::NotFound(_) => AppError::NotFound(message),
            TransactionError::Persistence(_) => AppError::Database(message),
        })
    }
}

impl From<DateError> for ApiError {
    fn from(err: DateError) -> Self {
        let message = err.to_string();
        Self(match err {
            DateError::InvalidDateFormat(_) | DateError::UnrecognizedTimestamp(_) => {
                AppError::Parse(message)
            }
            DateError::MissingBound | DateError::StartAfterEnd => AppError::Validation(message),
        })
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        let message = err.to_string();
        Self(match err {
            CategoryError::NotFound(_) => AppError::NotFound(message),
            CategoryError::EmptyName => AppError::Validation(message),
            CategoryError::DuplicateName(_)
            | CategoryError::HasTransactions(_)
            | CategoryError::KindChangeBlocked(_) => AppError::Conflict(message),
            CategoryError::Database(e) => {
                error!(error = %e, "Category query failed");
                AppError::Database("Failed to process category".to_string())
            }
        })
    }
}

impl From<BankAccountError> for ApiError {
    fn from(err: BankAccountError) -> Self {
        let message = err.to_string();
        Self(match err {
            BankAccountError::NotFound(_) => AppError::NotFound(message),
            BankAccountError::EmptyName | BankAccountError::EmptyBankName => {
                AppError::Validation(message)
            }
            BankAccountError::HasTransactions(_) => AppError::Conflict(message),
            BankAccountError::Database(e) => {
                error!(error = %e, "Bank account query failed");
                AppError::Database("Failed to process bank account".to_string())
            }
        })
    }
}
