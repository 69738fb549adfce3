//! Transaction lifecycle: create, read, update, delete.
//!
//! Every write goes through [`validate_transaction`] first; nothing is
//! written when validation fails. The service only ever writes
//! transactions, bank account balances are left untouched.

use chrono::Utc;
use tally_shared::types::{CategoryId, TransactionId};

use super::error::TransactionError;
use super::store::{LedgerStore, TransactionFilter};
use super::types::{NewTransaction, TransactionDraft, TransactionPatch, TransactionView};
use super::validation::validate_transaction;
use crate::dates::normalize_timestamp;

/// Lifecycle manager over an explicit store handle.
#[derive(Debug, Clone)]
pub struct LedgerService<S> {
    pub(super) store: S,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates a service over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validates and persists a new transaction.
    ///
    /// A missing occurrence time defaults to now.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when a rule fails, `Persistence` when the store fails.
    pub async fn create(&self, draft: TransactionDraft) -> Result<TransactionView, TransactionError> {
        let new = self.resolve(&draft).await?;
        Ok(self.store.insert_transaction(new).await?)
    }

    /// Loads one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the id is absent.
    pub async fn get(&self, id: TransactionId) -> Result<TransactionView, TransactionError> {
        self.store
            .find_transaction(id)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    /// Lists transactions matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` when the store fails.
    pub async fn list(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionView>, TransactionError> {
        Ok(self.store.list_transactions(filter).await?)
    }

    /// Merges `patch` over the stored transaction and saves the result.
    ///
    /// The merged transaction is validated as a whole, so a change that
    /// leaves it inconsistent (say, switching to transfer without clearing
    /// the category) is rejected and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Validation` or `Persistence`.
    pub async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<TransactionView, TransactionError> {
        let existing = self.get(id).await?;
        let merged = patch.apply(TransactionDraft::from(&existing.transaction));
        let new = self.resolve(&merged).await?;
        self.store
            .update_transaction(id, new)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    /// Re-categorizes a transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update`]; transfers always fail with `UnexpectedCategory`.
    pub async fn update_category(
        &self,
        id: TransactionId,
        category_id: CategoryId,
    ) -> Result<TransactionView, TransactionError> {
        let patch = TransactionPatch {
            category_id: Some(Some(category_id)),
            ..TransactionPatch::default()
        };
        self.update(id, patch).await
    }

    /// Removes a transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the id is absent, including on a repeated delete.
    pub async fn delete(&self, id: TransactionId) -> Result<(), TransactionError> {
        if self.store.delete_transaction(id).await? {
            Ok(())
        } else {
            Err(TransactionError::NotFound(id))
        }
    }

    /// Loads the referenced entities and runs the validator over them.
    async fn resolve(&self, draft: &TransactionDraft) -> Result<NewTransaction, TransactionError> {
        let category = match draft.category_id {
            Some(id) => self.store.find_category(id).await?,
            None => None,
        };
        let source = self.store.find_account(draft.bank_account_id).await?;
        let destination = match draft.destination_bank_account_id {
            Some(id) => self.store.find_account(id).await?,
            None => None,
        };

        let detail = validate_transaction(
            draft,
            |id| category.clone().filter(|c| c.id == id),
            |id| {
                source
                    .iter()
                    .chain(destination.iter())
                    .find(|a| a.id == id)
                    .cloned()
            },
        )?;

        Ok(NewTransaction {
            external_ref: draft.external_ref.clone(),
            amount: draft.amount,
            detail,
            bank_account_id: draft.bank_account_id,
            description: draft.description.clone(),
            occurred_at: normalize_timestamp(draft.occurred_at.unwrap_or_else(Utc::now)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::error::ValidationError;
    use crate::transaction::memory::MemoryStore;
    use crate::transaction::types::{TransactionDetail, TransactionKind};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tally_shared::types::BankAccountId;

    fn lunch(store: &MemoryStore) -> TransactionDraft {
        TransactionDraft {
            external_ref: None,
            amount: dec!(50),
            kind: "expense".to_string(),
            category_id: Some(store.category_id("Food")),
            bank_account_id: store.account_id("Checking"),
            destination_bank_account_id: None,
            description: "Lunch".to_string(),
            occurred_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = LedgerService::new(MemoryStore::seeded());
        let created = service.create(lunch(service.store())).await.unwrap();

        let fetched = service.get(created.transaction.id).await.unwrap();
        assert_eq!(fetched.transaction.amount, dec!(50));
        assert_eq!(fetched.kind(), TransactionKind::Expense);
        assert_eq!(fetched.transaction.description, "Lunch");
        assert_eq!(fetched.category_name.as_deref(), Some("Food"));
    }

    #[tokio::test]
    async fn test_create_defaults_occurred_at_to_now() {
        let service = LedgerService::new(MemoryStore::seeded());
        let before = Utc::now() - chrono::Duration::seconds(1);
        let created = service.create(lunch(service.store())).await.unwrap();
        assert!(created.transaction.occurred_at >= before);
        assert_eq!(created.transaction.occurred_at.timestamp_subsec_nanos(), 0);
    }

    #[tokio::test]
    async fn test_create_rejected_writes_nothing() {
        let service = LedgerService::new(MemoryStore::seeded());
        let checking = service.store().account_id("Checking");
        let draft = TransactionDraft {
            kind: "transfer".to_string(),
            category_id: None,
            destination_bank_account_id: Some(checking),
            ..lunch(service.store())
        };

        let err = service.create(draft).await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Validation(ValidationError::SameAccountTransfer)
        ));
        assert_eq!(service.store().transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_create_does_not_touch_balances() {
        let service = LedgerService::new(MemoryStore::seeded());
        let before = service.store().balances();
        service.create(lunch(service.store())).await.unwrap();
        assert_eq!(service.store().balances(), before);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let service = LedgerService::new(MemoryStore::seeded());
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let created = service
            .create(TransactionDraft {
                occurred_at: Some(at),
                ..lunch(service.store())
            })
            .await
            .unwrap();

        let updated = service
            .update(
                created.transaction.id,
                TransactionPatch {
                    amount: Some(dec!(75.25)),
                    ..TransactionPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.transaction.amount, dec!(75.25));
        assert_eq!(updated.transaction.description, "Lunch");
        assert_eq!(updated.transaction.occurred_at, at);
        assert_eq!(updated.kind(), TransactionKind::Expense);
    }

    #[tokio::test]
    async fn test_update_invalid_merge_is_all_or_nothing() {
        let service = LedgerService::new(MemoryStore::seeded());
        let created = service.create(lunch(service.store())).await.unwrap();
        let savings = service.store().account_id("Savings");

        // Switching to transfer while the category is still set must fail.
        let err = service
            .update(
                created.transaction.id,
                TransactionPatch {
                    kind: Some("transfer".to_string()),
                    destination_bank_account_id: Some(Some(savings)),
                    amount: Some(dec!(999)),
                    ..TransactionPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Validation(ValidationError::UnexpectedCategory)
        ));

        let unchanged = service.get(created.transaction.id).await.unwrap();
        assert_eq!(unchanged.transaction, created.transaction);
    }

    #[tokio::test]
    async fn test_update_to_transfer_with_cleared_category() {
        let service = LedgerService::new(MemoryStore::seeded());
        let created = service.create(lunch(service.store())).await.unwrap();
        let savings = service.store().account_id("Savings");

        let updated = service
            .update(
                created.transaction.id,
                TransactionPatch {
                    kind: Some("transfer".to_string()),
                    category_id: Some(None),
                    destination_bank_account_id: Some(Some(savings)),
                    ..TransactionPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            updated.transaction.detail,
            TransactionDetail::Transfer {
                destination_account_id: savings
            }
        );
        assert_eq!(updated.category_name, None);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = LedgerService::new(MemoryStore::seeded());
        let err = service
            .update(TransactionId::new(), TransactionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_category_checks_kind() {
        let service = LedgerService::new(MemoryStore::seeded());
        let created = service.create(lunch(service.store())).await.unwrap();
        let id = created.transaction.id;

        let transport = service.store().category_id("Transport");
        let updated = service.update_category(id, transport).await.unwrap();
        assert_eq!(updated.category_name.as_deref(), Some("Transport"));

        let salary = service.store().category_id("Salary");
        let err = service.update_category(id, salary).await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Validation(ValidationError::CategoryTypeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let service = LedgerService::new(MemoryStore::seeded());
        let created = service.create(lunch(service.store())).await.unwrap();
        let id = created.transaction.id;

        service.delete(id).await.unwrap();
        assert!(matches!(
            service.delete(id).await,
            Err(TransactionError::NotFound(missing)) if missing == id
        ));
        assert!(matches!(
            service.get(id).await,
            Err(TransactionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_destination_account() {
        let service = LedgerService::new(MemoryStore::seeded());
        let ghost = BankAccountId::new();
        let err = service
            .create(TransactionDraft {
                kind: "transfer".to_string(),
                category_id: None,
                destination_bank_account_id: Some(ghost),
                ..lunch(service.store())
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Validation(ValidationError::UnknownAccount(id)) if id == ghost
        ));
    }
}
