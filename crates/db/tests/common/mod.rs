//! Shared fixtures for the database integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tally_core::transaction::{CategoryKind, TransactionDraft};
use tally_db::{
    entities::sea_orm_active_enums::AccountType,
    migration::Migrator,
    repositories::{
        BankAccountRepository, CategoryRepository, CreateBankAccountInput, CreateCategoryInput,
    },
};
use tally_shared::types::{BankAccountId, CategoryId};

/// Opens a fresh in-memory database with the schema applied.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn create_category(db: &DatabaseConnection, name: &str, kind: CategoryKind) -> CategoryId {
    let category = CategoryRepository::new(db.clone())
        .create(CreateCategoryInput {
            name: name.to_string(),
            kind,
        })
        .await
        .unwrap();
    CategoryId::from_uuid(category.id)
}

pub async fn create_account(db: &DatabaseConnection, name: &str) -> BankAccountId {
    let account = BankAccountRepository::new(db.clone())
        .create(CreateBankAccountInput {
            name: name.to_string(),
            account_number: None,
            bank_name: "First Bank".to_string(),
            account_type: AccountType::Checking,
            balance: Decimal::ZERO,
            is_active: true,
        })
        .await
        .unwrap();
    BankAccountId::from_uuid(account.id)
}

pub fn draft(
    kind: &str,
    amount: Decimal,
    category_id: Option<CategoryId>,
    bank_account_id: BankAccountId,
) -> TransactionDraft {
    TransactionDraft {
        external_ref: None,
        amount,
        kind: kind.to_string(),
        category_id,
        bank_account_id,
        destination_bank_account_id: None,
        description: String::new(),
        occurred_at: None,
    }
}
