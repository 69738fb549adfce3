//! Storage seam for the lifecycle manager.
//!
//! The database crate implements [`LedgerStore`]; tests use an in-memory one.

use async_trait::async_trait;
use thiserror::Error;
use tally_shared::types::{BankAccountId, CategoryId, TransactionId};

use super::types::{AccountInfo, CategoryInfo, NewTransaction, TransactionKind, TransactionView};
use crate::dates::DateRange;

/// Opaque failure reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StoreError(String);

impl StoreError {
    /// Wraps a backend error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Which transactions a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only this kind.
    pub kind: Option<TransactionKind>,
    /// Only transactions that occurred inside this window.
    pub range: Option<DateRange>,
    /// Drop transfers regardless of `kind`.
    pub exclude_transfers: bool,
}

impl TransactionFilter {
    /// Everything that carries a category, optionally narrowed to a window
    /// and a kind.
    #[must_use]
    pub const fn categorized(range: Option<DateRange>, kind: Option<TransactionKind>) -> Self {
        Self {
            kind,
            range,
            exclude_transfers: true,
        }
    }

    /// Returns true when `view` passes the filter.
    #[must_use]
    pub fn matches(&self, view: &TransactionView) -> bool {
        let kind = view.kind();
        if self.exclude_transfers && kind == TransactionKind::Transfer {
            return false;
        }
        if self.kind.is_some_and(|k| k != kind) {
            return false;
        }
        self.range
            .is_none_or(|range| range.contains(view.transaction.occurred_at))
    }
}

/// Persistence operations the lifecycle manager depends on.
///
/// Lookups never return soft-deleted categories or accounts.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Loads a live category.
    async fn find_category(&self, id: CategoryId) -> Result<Option<CategoryInfo>, StoreError>;

    /// Loads a live bank account.
    async fn find_account(&self, id: BankAccountId) -> Result<Option<AccountInfo>, StoreError>;

    /// Writes a new transaction and returns it resolved.
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionView, StoreError>;

    /// Loads a transaction.
    async fn find_transaction(&self, id: TransactionId)
    -> Result<Option<TransactionView>, StoreError>;

    /// Replaces a transaction's fields. `None` when the id is absent.
    async fn update_transaction(
        &self,
        id: TransactionId,
        tx: NewTransaction,
    ) -> Result<Option<TransactionView>, StoreError>;

    /// Removes a transaction. `false` when the id is absent.
    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, StoreError>;

    /// Lists transactions newest first by occurrence time.
    async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionView>, StoreError>;
}
