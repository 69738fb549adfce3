//! Transaction repository backing the ledger store.
//!
//! Views resolve category and account names in batches, soft-deleted rows
//! included, so historic transactions keep their labels.

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::{HashMap, HashSet};
use tally_core::transaction::{
    AccountInfo, CategoryInfo, LedgerStore, NewTransaction, StoreError, Transaction,
    TransactionDetail, TransactionFilter, TransactionView,
};
use tally_shared::types::{BankAccountId, CategoryId, TransactionId};
use tracing::error;
use uuid::Uuid;

use crate::entities::{
    bank_accounts, categories,
    sea_orm_active_enums::{TransactionType, TransactionType as Kind},
    transactions,
};

/// Transaction repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves names for a batch of rows, preserving order.
    async fn resolve(&self, rows: Vec<transactions::Model>) -> Result<Vec<TransactionView>, DbErr> {
        let category_ids: HashSet<Uuid> = rows.iter().filter_map(|r| r.category_id).collect();
        let account_ids: HashSet<Uuid> = rows
            .iter()
            .flat_map(|r| std::iter::once(r.bank_account_id).chain(r.destination_bank_account_id))
            .collect();

        let category_names: HashMap<Uuid, String> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            categories::Entity::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        let accounts: HashMap<Uuid, AccountInfo> = if account_ids.is_empty() {
            HashMap::new()
        } else {
            bank_accounts::Entity::find()
                .filter(bank_accounts::Column::Id.is_in(account_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|a| (a.id, account_info(a)))
                .collect()
        };

        rows.into_iter()
            .map(|row| {
                let category_name = row.category_id.and_then(|id| category_names.get(&id).cloned());
                let bank_account = accounts.get(&row.bank_account_id).cloned();
                let destination_bank_account = row
                    .destination_bank_account_id
                    .and_then(|id| accounts.get(&id).cloned());
                Ok(TransactionView {
                    transaction: to_domain(row)?,
                    category_name,
                    bank_account,
                    destination_bank_account,
                })
            })
            .collect()
    }

    async fn resolve_one(&self, row: transactions::Model) -> Result<TransactionView, DbErr> {
        let mut views = self.resolve(vec![row]).await?;
        views
            .pop()
            .ok_or_else(|| DbErr::Custom("resolved view missing".to_string()))
    }
}

fn account_info(model: bank_accounts::Model) -> AccountInfo {
    AccountInfo {
        id: BankAccountId::from_uuid(model.id),
        name: model.name,
        bank_name: model.bank_name,
    }
}

/// Rebuilds the tagged detail from the flat columns.
fn to_domain(row: transactions::Model) -> Result<Transaction, DbErr> {
    let inconsistent = || DbErr::Custom(format!("transaction {} violates its kind rules", row.id));
    let detail = match row.kind {
        Kind::Expense => TransactionDetail::Expense {
            category_id: CategoryId::from_uuid(row.category_id.ok_or_else(inconsistent)?),
        },
        Kind::Income => TransactionDetail::Income {
            category_id: CategoryId::from_uuid(row.category_id.ok_or_else(inconsistent)?),
        },
        Kind::Transfer => TransactionDetail::Transfer {
            destination_account_id: BankAccountId::from_uuid(
                row.destination_bank_account_id.ok_or_else(inconsistent)?,
            ),
        },
    };
    Ok(Transaction {
        id: TransactionId::from_uuid(row.id),
        external_ref: row.external_ref,
        amount: row.amount,
        detail,
        bank_account_id: BankAccountId::from_uuid(row.bank_account_id),
        description: row.description,
        occurred_at: row.occurred_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Logs the database error and hides it behind an opaque store error.
fn store_err(op: &'static str) -> impl Fn(DbErr) -> StoreError {
    move |e| {
        error!(error = %e, op, "Transaction store failure");
        StoreError::new(format!("Failed to {op}"))
    }
}

fn set_fields(active: &mut transactions::ActiveModel, tx: NewTransaction) {
    active.external_ref = Set(tx.external_ref);
    active.amount = Set(tx.amount);
    active.kind = Set(TransactionType::from(tx.detail.kind()));
    active.category_id = Set(tx.detail.category_id().map(CategoryId::into_inner));
    active.bank_account_id = Set(tx.bank_account_id.into_inner());
    active.destination_bank_account_id =
        Set(tx.detail.destination_account_id().map(BankAccountId::into_inner));
    active.description = Set(tx.description);
    active.occurred_at = Set(tx.occurred_at);
}

#[async_trait]
impl LedgerStore for TransactionRepository {
    async fn find_category(&self, id: CategoryId) -> Result<Option<CategoryInfo>, StoreError> {
        let row = categories::Entity::find_by_id(id.into_inner())
            .filter(categories::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(store_err("load category"))?;
        Ok(row.map(|c| CategoryInfo {
            id: CategoryId::from_uuid(c.id),
            name: c.name,
            kind: c.kind.into(),
        }))
    }

    async fn find_account(&self, id: BankAccountId) -> Result<Option<AccountInfo>, StoreError> {
        let row = bank_accounts::Entity::find_by_id(id.into_inner())
            .filter(bank_accounts::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(store_err("load bank account"))?;
        Ok(row.map(account_info))
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionView, StoreError> {
        let now = Utc::now().trunc_subsecs(6);
        let mut active = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        set_fields(&mut active, tx);

        let row = active
            .insert(&self.db)
            .await
            .map_err(store_err("create transaction"))?;
        self.resolve_one(row)
            .await
            .map_err(store_err("load transaction"))
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionView>, StoreError> {
        let row = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err("load transaction"))?;
        match row {
            Some(row) => Ok(Some(
                self.resolve_one(row)
                    .await
                    .map_err(store_err("load transaction"))?,
            )),
            None => Ok(None),
        }
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        tx: NewTransaction,
    ) -> Result<Option<TransactionView>, StoreError> {
        let Some(row) = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err("load transaction"))?
        else {
            return Ok(None);
        };

        let mut active: transactions::ActiveModel = row.into();
        set_fields(&mut active, tx);
        active.updated_at = Set(Utc::now().trunc_subsecs(6));

        let row = active
            .update(&self.db)
            .await
            .map_err(store_err("update transaction"))?;
        Ok(Some(
            self.resolve_one(row)
                .await
                .map_err(store_err("load transaction"))?,
        ))
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, StoreError> {
        let result = transactions::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(store_err("delete transaction"))?;
        Ok(result.rows_affected > 0)
    }

    async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionView>, StoreError> {
        let mut query = transactions::Entity::find();
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(TransactionType::from(kind)));
        }
        if filter.exclude_transfers {
            query = query.filter(transactions::Column::Kind.ne(TransactionType::Transfer));
        }
        if let Some(range) = filter.range {
            query = query
                .filter(transactions::Column::OccurredAt.gte(range.start()))
                .filter(transactions::Column::OccurredAt.lte(range.end()));
        }

        let rows = query
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err("list transactions"))?;
        self.resolve(rows)
            .await
            .map_err(store_err("list transactions"))
    }
}
