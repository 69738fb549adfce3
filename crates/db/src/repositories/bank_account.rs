//! Bank account repository.
//!
//! The balance column is informational: nothing in the transaction path
//! reads or writes it.

use chrono::{SubsecRound, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{bank_accounts, sea_orm_active_enums::AccountType, transactions};

/// Error types for bank account operations.
#[derive(Debug, thiserror::Error)]
pub enum BankAccountError {
    /// Account not found or soft-deleted.
    #[error("Bank account not found")]
    NotFound(Uuid),

    /// Name is blank.
    #[error("Bank account name is required")]
    EmptyName,

    /// Bank name is blank.
    #[error("Bank name is required")]
    EmptyBankName,

    /// Delete blocked by referencing transactions.
    #[error("Cannot delete bank account with associated transactions. Consider deactivating instead.")]
    HasTransactions(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a bank account.
#[derive(Debug, Clone)]
pub struct CreateBankAccountInput {
    /// Display name.
    pub name: String,
    /// Account number at the bank.
    pub account_number: Option<String>,
    /// Bank holding the account.
    pub bank_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Opening balance.
    pub balance: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Input for updating a bank account.
#[derive(Debug, Clone, Default)]
pub struct UpdateBankAccountInput {
    /// New display name.
    pub name: Option<String>,
    /// New account number, `Some(None)` clears it.
    pub account_number: Option<Option<String>>,
    /// New bank name.
    pub bank_name: Option<String>,
    /// New account type.
    pub account_type: Option<AccountType>,
    /// New balance.
    pub balance: Option<Decimal>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
}

/// Bank account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BankAccountRepository {
    db: DatabaseConnection,
}

impl BankAccountRepository {
    /// Creates a new bank account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a bank account.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName`, `EmptyBankName` or a database error.
    pub async fn create(
        &self,
        input: CreateBankAccountInput,
    ) -> Result<bank_accounts::Model, BankAccountError> {
        let name = required(input.name, BankAccountError::EmptyName)?;
        let bank_name = required(input.bank_name, BankAccountError::EmptyBankName)?;

        let now = Utc::now().trunc_subsecs(6);
        let account = bank_accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            account_number: Set(input.account_number),
            bank_name: Set(bank_name),
            account_type: Set(input.account_type),
            balance: Set(input.balance),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        Ok(account.insert(&self.db).await?)
    }

    /// Lists live accounts by name. Inactive ones only when asked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<bank_accounts::Model>, BankAccountError> {
        let mut query =
            bank_accounts::Entity::find().filter(bank_accounts::Column::DeletedAt.is_null());
        if !include_inactive {
            query = query.filter(bank_accounts::Column::IsActive.eq(true));
        }
        let rows = query
            .order_by_asc(bank_accounts::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Finds a live account by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or soft-deleted.
    pub async fn find_by_id(&self, id: Uuid) -> Result<bank_accounts::Model, BankAccountError> {
        bank_accounts::Entity::find_by_id(id)
            .filter(bank_accounts::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(BankAccountError::NotFound(id))
    }

    /// Updates the supplied fields of a live account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `EmptyName`, `EmptyBankName` or a database error.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateBankAccountInput,
    ) -> Result<bank_accounts::Model, BankAccountError> {
        let account = self.find_by_id(id).await?;
        let mut active: bank_accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(required(name, BankAccountError::EmptyName)?);
        }
        if let Some(account_number) = input.account_number {
            active.account_number = Set(account_number);
        }
        if let Some(bank_name) = input.bank_name {
            active.bank_name = Set(required(bank_name, BankAccountError::EmptyBankName)?);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type);
        }
        if let Some(balance) = input.balance {
            active.balance = Set(balance);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().trunc_subsecs(6));

        Ok(active.update(&self.db).await?)
    }

    /// Soft-deletes an account no transaction references as source or
    /// destination.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `HasTransactions` or a database error.
    pub async fn delete(&self, id: Uuid) -> Result<(), BankAccountError> {
        let account = self.find_by_id(id).await?;

        let references = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::BankAccountId.eq(id))
                    .add(transactions::Column::DestinationBankAccountId.eq(id)),
            )
            .count(&self.db)
            .await?;
        if references > 0 {
            return Err(BankAccountError::HasTransactions(id));
        }

        let now = Utc::now().trunc_subsecs(6);
        let mut active: bank_accounts::ActiveModel = account.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }
}

fn required(value: String, err: BankAccountError) -> Result<String, BankAccountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}
