//! Initial database migration.
//!
//! Creates the categories, bank_accounts and transactions tables with the
//! portable schema builder so the same migration runs on PostgreSQL and
//! SQLite.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Category names are unique among rows that are not soft-deleted.
/// Both PostgreSQL and SQLite support partial indexes.
const CATEGORIES_LIVE_NAME_SQL: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     idx_categories_name_live ON categories (name) WHERE deleted_at IS NULL";

/// Money column precision. SQLite caps declared precision at 16 digits.
fn money_precision(backend: DbBackend) -> u32 {
    match backend {
        DbBackend::Sqlite => 16,
        _ => 19,
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let precision = money_precision(manager.get_database_backend());

        // ============================================================
        // CATEGORIES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Categories::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(CATEGORIES_LIVE_NAME_SQL)
            .await?;

        // ============================================================
        // BANK ACCOUNTS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(BankAccounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BankAccounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BankAccounts::Name).string().not_null())
                    .col(ColumnDef::new(BankAccounts::AccountNumber).string())
                    .col(ColumnDef::new(BankAccounts::BankName).string().not_null())
                    .col(ColumnDef::new(BankAccounts::AccountType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(BankAccounts::Balance)
                            .decimal_len(precision, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankAccounts::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // TRANSACTIONS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Transactions::ExternalRef).string())
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .decimal_len(precision, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).uuid())
                    .col(ColumnDef::new(Transactions::BankAccountId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::DestinationBankAccountId).uuid())
                    .col(
                        ColumnDef::new(Transactions::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_id")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-bank_account_id")
                            .from(Transactions::Table, Transactions::BankAccountId)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-destination_bank_account_id")
                            .from(Transactions::Table, Transactions::DestinationBankAccountId)
                            .to(BankAccounts::Table, BankAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::OccurredAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-category_id")
                    .table(Transactions::Table)
                    .col(Transactions::CategoryId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}


#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Kind,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum BankAccounts {
    Table,
    Id,
    Name,
    AccountNumber,
    BankName,
    AccountType,
    Balance,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ExternalRef,
    Amount,
    Kind,
    CategoryId,
    BankAccountId,
    DestinationBankAccountId,
    Description,
    OccurredAt,
    CreatedAt,
    UpdatedAt,
}
