//! Category repository.
//!
//! Categories are soft-deleted. Name uniqueness among live rows is enforced
//! by a partial unique index, and the violation is mapped to
//! [`CategoryError::DuplicateName`] instead of checking first.

use chrono::{SubsecRound, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use tally_core::transaction::CategoryKind;
use uuid::Uuid;

use crate::entities::{categories, sea_orm_active_enums::CategoryType, transactions};

/// Error types for category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Category not found or soft-deleted.
    #[error("Category not found")]
    NotFound(Uuid),

    /// Name is blank.
    #[error("Category name is required")]
    EmptyName,

    /// Another live category has this name.
    #[error("Category with this name already exists")]
    DuplicateName(String),

    /// Delete blocked by referencing transactions.
    #[error("Cannot delete category that has associated transactions")]
    HasTransactions(Uuid),

    /// Type change blocked by referencing transactions.
    #[error("Cannot change type of category that has associated transactions")]
    KindChangeBlocked(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category name, unique among live categories.
    pub name: String,
    /// Expense or income.
    pub kind: CategoryKind,
}

/// Input for updating a category.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New name.
    pub name: Option<String>,
    /// New kind.
    pub kind: Option<CategoryKind>,
}

/// Category repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName`, `DuplicateName` or a database error.
    pub async fn create(&self, input: CreateCategoryInput) -> Result<categories::Model, CategoryError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CategoryError::EmptyName);
        }

        let now = Utc::now().trunc_subsecs(6);
        let category = categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.clone()),
            kind: Set(CategoryType::from(input.kind)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        category
            .insert(&self.db)
            .await
            .map_err(|e| duplicate_or_db(e, name))
    }

    /// Lists live categories ordered by name, optionally of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, kind: Option<CategoryKind>) -> Result<Vec<categories::Model>, CategoryError> {
        let mut query = categories::Entity::find().filter(categories::Column::DeletedAt.is_null());
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(CategoryType::from(kind)));
        }
        let rows = query
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Finds a live category by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent or soft-deleted.
    pub async fn find_by_id(&self, id: Uuid) -> Result<categories::Model, CategoryError> {
        categories::Entity::find_by_id(id)
            .filter(categories::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    /// Finds a live category by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<categories::Model>, CategoryError> {
        let row = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .filter(categories::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(row)
    }

    /// Updates the supplied fields of a live category.
    ///
    /// Changing the kind is refused while transactions reference the
    /// category, since they would no longer match it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `EmptyName`, `DuplicateName`, `KindChangeBlocked`
    /// or a database error.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<categories::Model, CategoryError> {
        let category = self.find_by_id(id).await?;

        let new_kind = input.kind.map(CategoryType::from);
        if new_kind.is_some_and(|kind| kind != category.kind) && self.is_referenced(id).await? {
            return Err(CategoryError::KindChangeBlocked(id));
        }

        let mut active: categories::ActiveModel = category.into();
        let mut new_name = None;
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CategoryError::EmptyName);
            }
            active.name = Set(name.clone());
            new_name = Some(name);
        }
        if let Some(kind) = new_kind {
            active.kind = Set(kind);
        }
        active.updated_at = Set(Utc::now().trunc_subsecs(6));

        active
            .update(&self.db)
            .await
            .map_err(|e| duplicate_or_db(e, new_name.unwrap_or_default()))
    }

    /// Soft-deletes a category that no transaction references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `HasTransactions` or a database error.
    pub async fn delete(&self, id: Uuid) -> Result<(), CategoryError> {
        let category = self.find_by_id(id).await?;
        if self.is_referenced(id).await? {
            return Err(CategoryError::HasTransactions(id));
        }

        let now = Utc::now().trunc_subsecs(6);
        let mut active: categories::ActiveModel = category.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Returns true when at least one transaction points at the category.
    async fn is_referenced(&self, id: Uuid) -> Result<bool, DbErr> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::CategoryId.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}

fn duplicate_or_db(err: DbErr, name: String) -> CategoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CategoryError::DuplicateName(name),
        _ => CategoryError::Database(err),
    }
}
