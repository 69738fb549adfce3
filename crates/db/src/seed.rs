//! Default category seeding.

use sea_orm::DatabaseConnection;
use tally_core::transaction::CategoryKind;
use tracing::{debug, info};

use crate::repositories::{CategoryError, CategoryRepository, CreateCategoryInput};

/// Categories every fresh ledger starts with.
pub const DEFAULT_CATEGORIES: &[(&str, CategoryKind)] = &[
    ("Food", CategoryKind::Expense),
    ("Transport", CategoryKind::Expense),
    ("Bills", CategoryKind::Expense),
    ("Shopping", CategoryKind::Expense),
    ("Salary", CategoryKind::Income),
    ("Freelance", CategoryKind::Income),
    ("Investments", CategoryKind::Income),
];

/// Inserts the default categories that are not present yet.
///
/// Matching is by live category name, so running it twice is a no-op.
/// Returns the number of categories inserted.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub async fn seed_default_categories(db: &DatabaseConnection) -> Result<usize, CategoryError> {
    let repo = CategoryRepository::new(db.clone());
    let mut inserted = 0;

    for &(name, kind) in DEFAULT_CATEGORIES {
        if repo.find_by_name(name).await?.is_some() {
            debug!(name, "Category already present");
            continue;
        }
        repo.create(CreateCategoryInput {
            name: name.to_string(),
            kind,
        })
        .await?;
        inserted += 1;
    }

    info!(inserted, "Default categories seeded");
    Ok(inserted)
}
