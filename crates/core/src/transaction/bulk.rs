//! Batch create and delete with per-item outcomes.
//!
//! Items are attempted one by one through the single-item paths. A failing
//! item is recorded and the batch moves on; there is no batch-wide rollback.

use std::convert::Infallible;
use std::fmt::Display;

use serde::Serialize;
use tally_shared::types::TransactionId;

use super::error::TransactionError;
use super::service::LedgerService;
use super::store::LedgerStore;
use super::types::{TransactionDraft, TransactionView};

/// Item limits for bulk requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkLimits {
    /// Maximum drafts per bulk create.
    pub create_max: usize,
    /// Maximum ids per bulk delete.
    pub delete_max: usize,
}

impl Default for BulkLimits {
    fn default() -> Self {
        Self {
            create_max: 5000,
            delete_max: 1000,
        }
    }
}

/// Overall result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    /// Every item went through.
    AllSucceeded,
    /// Some items failed.
    Partial,
    /// Every item failed.
    AllFailed,
}

impl BulkStatus {
    fn from_counts(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => Self::AllSucceeded,
            (0, _) => Self::AllFailed,
            _ => Self::Partial,
        }
    }

    /// Status code for a bulk create with this outcome.
    #[must_use]
    pub const fn create_status_code(self) -> u16 {
        match self {
            Self::AllSucceeded => 201,
            Self::Partial => 207,
            Self::AllFailed => 400,
        }
    }

    /// Status code for a bulk delete with this outcome.
    #[must_use]
    pub const fn delete_status_code(self) -> u16 {
        match self {
            Self::AllSucceeded => 200,
            Self::Partial => 207,
            Self::AllFailed => 400,
        }
    }
}

/// An item that could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkCreateFailure<T = TransactionDraft> {
    /// Position in the request.
    pub index: usize,
    /// The item as submitted.
    pub transaction: T,
    /// Why it failed.
    pub error: String,
}

/// Outcome of a bulk create.
#[derive(Debug, Clone)]
pub struct BulkCreateOutcome<T = TransactionDraft> {
    /// Created transactions in request order.
    pub success: Vec<TransactionView>,
    /// Rejected items in request order.
    pub failed: Vec<BulkCreateFailure<T>>,
    /// Items submitted.
    pub total_count: usize,
    /// Items created.
    pub success_count: usize,
    /// Items rejected.
    pub failed_count: usize,
}

impl<T> BulkCreateOutcome<T> {
    /// Overall status.
    #[must_use]
    pub fn status(&self) -> BulkStatus {
        BulkStatus::from_counts(self.success_count, self.failed_count)
    }
}

/// An id that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkDeleteFailure {
    /// The id as submitted.
    pub transaction_id: TransactionId,
    /// Why it failed.
    pub error: String,
}

/// Outcome of a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkDeleteOutcome {
    /// Removed ids in request order.
    pub deleted: Vec<TransactionId>,
    /// Ids that could not be removed.
    pub failed: Vec<BulkDeleteFailure>,
    /// Ids submitted.
    pub total_count: usize,
    /// Ids removed.
    pub deleted_count: usize,
    /// Ids that failed.
    pub failed_count: usize,
}

impl BulkDeleteOutcome {
    /// Overall status.
    #[must_use]
    pub fn status(&self) -> BulkStatus {
        BulkStatus::from_counts(self.deleted_count, self.failed_count)
    }
}

fn check_batch_size(len: usize, max: usize, item: &'static str) -> Result<(), TransactionError> {
    if len == 0 {
        return Err(TransactionError::EmptyBatch(item));
    }
    if len > max {
        return Err(TransactionError::BatchTooLarge { item, max });
    }
    Ok(())
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates each draft independently.
    ///
    /// # Errors
    ///
    /// Rejects the whole batch with `EmptyBatch` or `BatchTooLarge` before
    /// touching the store. Per-item failures land in the outcome instead.
    pub async fn create_bulk(
        &self,
        drafts: Vec<TransactionDraft>,
        max: usize,
    ) -> Result<BulkCreateOutcome, TransactionError> {
        self.create_bulk_with(drafts, max, |draft| Ok::<_, Infallible>(draft.clone()))
            .await
    }

    /// Creates each raw item independently, decoding it with `to_draft`
    /// first. An item that does not decode fails on its own, with the
    /// decode error as its message.
    ///
    /// # Errors
    ///
    /// Rejects the whole batch with `EmptyBatch` or `BatchTooLarge` before
    /// touching the store.
    pub async fn create_bulk_with<T, E, F>(
        &self,
        items: Vec<T>,
        max: usize,
        to_draft: F,
    ) -> Result<BulkCreateOutcome<T>, TransactionError>
    where
        E: Display,
        F: Fn(&T) -> Result<TransactionDraft, E>,
    {
        check_batch_size(items.len(), max, "transaction")?;

        let total_count = items.len();
        let mut success = Vec::new();
        let mut failed = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            let draft = match to_draft(&item) {
                Ok(draft) => draft,
                Err(e) => {
                    failed.push(BulkCreateFailure {
                        index,
                        transaction: item,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            match self.create(draft).await {
                Ok(view) => success.push(view),
                Err(e) => failed.push(BulkCreateFailure {
                    index,
                    transaction: item,
                    error: e.to_string(),
                }),
            }
        }

        Ok(BulkCreateOutcome {
            success_count: success.len(),
            failed_count: failed.len(),
            total_count,
            success,
            failed,
        })
    }

    /// Deletes each id independently.
    ///
    /// # Errors
    ///
    /// Rejects the whole batch with `EmptyBatch` or `BatchTooLarge`.
    pub async fn delete_bulk(
        &self,
        ids: Vec<TransactionId>,
        max: usize,
    ) -> Result<BulkDeleteOutcome, TransactionError> {
        check_batch_size(ids.len(), max, "transaction ID")?;

        let total_count = ids.len();
        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for id in ids {
            match self.delete(id).await {
                Ok(()) => deleted.push(id),
                Err(e) => failed.push(BulkDeleteFailure {
                    transaction_id: id,
                    error: e.to_string(),
                }),
            }
        }

        Ok(BulkDeleteOutcome {
            deleted_count: deleted.len(),
            failed_count: failed.len(),
            total_count,
            deleted,
            failed,
        })
    }
}
