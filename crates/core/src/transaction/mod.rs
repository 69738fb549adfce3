//! Transaction recording.
//!
//! This module implements:
//! - Domain types for drafts, patches and stored transactions
//! - Kind validation rules
//! - The lifecycle manager over a pluggable store
//! - Bulk create and delete with per-item outcomes

pub mod bulk;
pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod validation_props;

pub use bulk::{
    BulkCreateFailure, BulkCreateOutcome, BulkDeleteFailure, BulkDeleteOutcome, BulkLimits,
    BulkStatus,
};
pub use error::{TransactionError, ValidationError};
pub use service::LedgerService;
pub use store::{LedgerStore, StoreError, TransactionFilter};
pub use types::{
    AccountInfo, CategoryInfo, CategoryKind, NewTransaction, Transaction, TransactionDetail,
    TransactionDraft, TransactionKind, TransactionPatch, TransactionView,
};
pub use validation::validate_transaction;
