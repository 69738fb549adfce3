//! Integration tests for categories, bank accounts and default seeding.

mod common;

use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;
use tally_core::transaction::{CategoryKind, LedgerService};
use tally_db::{
    TransactionRepository,
    entities::sea_orm_active_enums::{AccountType, CategoryType},
    repositories::{
        BankAccountError, BankAccountRepository, CategoryError, CategoryRepository,
        CreateBankAccountInput, CreateCategoryInput, UpdateBankAccountInput, UpdateCategoryInput,
    },
    migration::Migrator,
    seed::{DEFAULT_CATEGORIES, seed_default_categories},
};

use common::{create_account, create_category, draft, setup_db};

#[tokio::test]
async fn test_duplicate_category_name_conflicts() {
    let db = setup_db().await;
    let repo = CategoryRepository::new(db.clone());
    create_category(&db, "Food", CategoryKind::Expense).await;

    let result = repo
        .create(CreateCategoryInput {
            name: "Food".to_string(),
            kind: CategoryKind::Income,
        })
        .await;
    assert!(matches!(result, Err(CategoryError::DuplicateName(name)) if name == "Food"));
}

#[tokio::test]
async fn test_blank_category_name_rejected() {
    let db = setup_db().await;
    let result = CategoryRepository::new(db)
        .create(CreateCategoryInput {
            name: "   ".to_string(),
            kind: CategoryKind::Expense,
        })
        .await;
    assert!(matches!(result, Err(CategoryError::EmptyName)));
}

#[tokio::test]
async fn test_deleted_category_name_can_be_reused() {
    let db = setup_db().await;
    let repo = CategoryRepository::new(db.clone());
    let first = create_category(&db, "Travel", CategoryKind::Expense).await;

    repo.delete(first.into_inner()).await.unwrap();
    assert!(matches!(
        repo.find_by_id(first.into_inner()).await,
        Err(CategoryError::NotFound(_))
    ));

    let second = create_category(&db, "Travel", CategoryKind::Expense).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_referenced_category_cannot_be_deleted_or_retyped() {
    let db = setup_db().await;
    let repo = CategoryRepository::new(db.clone());
    let food = create_category(&db, "Food", CategoryKind::Expense).await;
    let checking = create_account(&db, "Checking").await;
    let service = LedgerService::new(TransactionRepository::new(db.clone()));

    let id = service
        .create(draft("expense", dec!(10), Some(food), checking))
        .await
        .unwrap()
        .transaction
        .id;

    assert!(matches!(
        repo.delete(food.into_inner()).await,
        Err(CategoryError::HasTransactions(_))
    ));
    let retype = repo
        .update(
            food.into_inner(),
            UpdateCategoryInput {
                name: None,
                kind: Some(CategoryKind::Income),
            },
        )
        .await;
    assert!(matches!(retype, Err(CategoryError::KindChangeBlocked(_))));

    let renamed = repo
        .update(
            food.into_inner(),
            UpdateCategoryInput {
                name: Some("Groceries".to_string()),
                kind: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Groceries");
    assert_eq!(renamed.kind, CategoryType::Expense);

    service.delete(id).await.unwrap();
    repo.delete(food.into_inner()).await.unwrap();
}

#[tokio::test]
async fn test_list_categories_by_kind() {
    let db = setup_db().await;
    create_category(&db, "Transport", CategoryKind::Expense).await;
    create_category(&db, "Food", CategoryKind::Expense).await;
    create_category(&db, "Salary", CategoryKind::Income).await;
    let repo = CategoryRepository::new(db);

    let expenses = repo.list(Some(CategoryKind::Expense)).await.unwrap();
    let names: Vec<_> = expenses.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Food", "Transport"]);
    assert_eq!(repo.list(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_account_referenced_as_destination_cannot_be_deleted() {
    let db = setup_db().await;
    let repo = BankAccountRepository::new(db.clone());
    let checking = create_account(&db, "Checking").await;
    let savings = create_account(&db, "Savings").await;
    let service = LedgerService::new(TransactionRepository::new(db.clone()));

    let mut transfer = draft("transfer", dec!(50), None, checking);
    transfer.destination_bank_account_id = Some(savings);
    let id = service.create(transfer).await.unwrap().transaction.id;

    assert!(matches!(
        repo.delete(savings.into_inner()).await,
        Err(BankAccountError::HasTransactions(_))
    ));

    service.delete(id).await.unwrap();
    repo.delete(savings.into_inner()).await.unwrap();
    assert!(matches!(
        repo.find_by_id(savings.into_inner()).await,
        Err(BankAccountError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_inactive_accounts_hidden_unless_requested() {
    let db = setup_db().await;
    let repo = BankAccountRepository::new(db.clone());
    create_account(&db, "Checking").await;
    let old = create_account(&db, "Old Savings").await;

    let updated = repo
        .update(
            old.into_inner(),
            UpdateBankAccountInput {
                is_active: Some(false),
                balance: Some(dec!(250)),
                ..UpdateBankAccountInput::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.balance, dec!(250));

    assert_eq!(repo.list(false).await.unwrap().len(), 1);
    assert_eq!(repo.list(true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_account_requires_bank_name() {
    let db = setup_db().await;
    let result = BankAccountRepository::new(db)
        .create(CreateBankAccountInput {
            name: "Wallet".to_string(),
            account_number: Some("123".to_string()),
            bank_name: String::new(),
            account_type: AccountType::Other,
            balance: dec!(0),
            is_active: true,
        })
        .await;
    assert!(matches!(result, Err(BankAccountError::EmptyBankName)));
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let db = setup_db().await;

    let first = seed_default_categories(&db).await.unwrap();
    assert_eq!(first, DEFAULT_CATEGORIES.len());

    let second = seed_default_categories(&db).await.unwrap();
    assert_eq!(second, 0);

    let all = CategoryRepository::new(db).list(None).await.unwrap();
    assert_eq!(all.len(), DEFAULT_CATEGORIES.len());
}

#[tokio::test]
async fn test_schema_rolls_back_and_reapplies() {
    let db = setup_db().await;
    Migrator::down(&db, None).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let account = BankAccountRepository::new(db.clone())
        .create(CreateBankAccountInput {
            name: "Savings".to_string(),
            account_number: None,
            bank_name: "First Bank".to_string(),
            account_type: AccountType::Savings,
            balance: dec!(1234.5),
            is_active: true,
        })
        .await
        .unwrap();
    let stored = BankAccountRepository::new(db)
        .find_by_id(account.id)
        .await
        .unwrap();
    assert_eq!(stored.balance, dec!(1234.5));
}

#[tokio::test]
async fn test_catalog_timestamps_round_trip_at_microseconds() {
    let db = setup_db().await;
    let categories = CategoryRepository::new(db.clone());
    let accounts = BankAccountRepository::new(db.clone());

    let food = create_category(&db, "Food", CategoryKind::Expense).await;
    let stored = categories.find_by_id(food.into_inner()).await.unwrap();
    assert_eq!(stored.created_at.timestamp_subsec_nanos() % 1_000, 0);
    let renamed = categories
        .update(
            food.into_inner(),
            UpdateCategoryInput {
                name: Some("Groceries".to_string()),
                ..UpdateCategoryInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        categories.find_by_id(food.into_inner()).await.unwrap().updated_at,
        renamed.updated_at
    );

    let checking = create_account(&db, "Checking").await;
    let account = accounts.find_by_id(checking.into_inner()).await.unwrap();
    assert_eq!(account.created_at.timestamp_subsec_nanos() % 1_000, 0);
    assert_eq!(account.updated_at, account.created_at);
}
