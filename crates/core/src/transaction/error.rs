//! Transaction error types.
//!
//! [`ValidationError`] is the closed set of rule violations the validator can
//! report. [`TransactionError`] adds the lifecycle failures around it.

use thiserror::Error;
use tally_shared::types::{BankAccountId, CategoryId, TransactionId};

use super::store::StoreError;
use super::types::{CategoryKind, TransactionKind};

/// A proposed transaction broke one of the kind rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Kind text is not expense, income or transfer.
    #[error("Type must be one of 'expense', 'income' or 'transfer'")]
    InvalidKind(String),

    /// Amount is zero or negative.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Source or destination account does not exist.
    #[error("Bank account not found")]
    UnknownAccount(BankAccountId),

    /// Expense or income without a category.
    #[error("category_id is required for expense and income transactions")]
    MissingCategory,

    /// Category reference does not exist.
    #[error("Category not found")]
    UnknownCategory(CategoryId),

    /// Category kind differs from the transaction kind.
    #[error("Category type does not match transaction type")]
    CategoryTypeMismatch {
        /// Kind of the referenced category.
        category: CategoryKind,
        /// Kind of the transaction.
        transaction: TransactionKind,
    },

    /// Transfer with a category.
    #[error("Transfers cannot have a category")]
    UnexpectedCategory,

    /// Transfer without a destination account.
    #[error("destination_bank_account_id is required for transfers")]
    MissingDestination,

    /// Expense or income with a destination account.
    #[error("Only transfers can have a destination bank account")]
    UnexpectedDestination,

    /// Transfer whose destination is its source.
    #[error("Source and destination bank accounts must be different")]
    SameAccountTransfer,
}

/// Errors from transaction lifecycle and bulk operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    // ========== Validation Errors ==========
    /// Rule violation on a single transaction.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bulk request without items.
    #[error("At least one {0} is required")]
    EmptyBatch(&'static str),

    /// Bulk request over the item limit.
    #[error("Maximum {max} {item}s allowed per bulk request")]
    BatchTooLarge {
        /// Item noun used in the message.
        item: &'static str,
        /// Configured limit.
        max: usize,
    },

    // ========== Lookup Errors ==========
    /// Transaction does not exist.
    #[error("Transaction not found")]
    NotFound(TransactionId),

    // ========== Storage Errors ==========
    /// The store failed.
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl TransactionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::Validation(_) | Self::EmptyBatch(_) | Self::BatchTooLarge { .. } => 400,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // 500 Internal Server Error
            Self::Persistence(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            TransactionError::from(ValidationError::SameAccountTransfer).http_status_code(),
            400
        );
        assert_eq!(TransactionError::EmptyBatch("transaction").http_status_code(), 400);
        assert_eq!(
            TransactionError::NotFound(TransactionId::new()).http_status_code(),
            404
        );
        assert_eq!(
            TransactionError::from(StoreError::new("connection reset")).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TransactionError::from(ValidationError::UnknownCategory(CategoryId::new())).to_string(),
            "Category not found"
        );
        assert_eq!(
            TransactionError::BatchTooLarge {
                item: "transaction",
                max: 5000
            }
            .to_string(),
            "Maximum 5000 transactions allowed per bulk request"
        );
        assert_eq!(
            TransactionError::EmptyBatch("transaction ID").to_string(),
            "At least one transaction ID is required"
        );
        assert_eq!(
            TransactionError::NotFound(TransactionId::new()).to_string(),
            "Transaction not found"
        );
    }
}
