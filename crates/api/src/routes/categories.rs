//! Category management routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tally_core::transaction::CategoryKind;
use tally_db::{
    CategoryRepository,
    entities::categories,
    repositories::{CreateCategoryInput, UpdateCategoryInput},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath},
};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category).get(list_categories))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Unique name.
    pub name: String,
    /// `expense` or `income`.
    #[serde(rename = "type")]
    pub category_type: String,
}

/// Request body for updating a category.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    /// New name.
    pub name: Option<String>,
    /// New type.
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// Filter by type.
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// Response for a category.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    /// Category ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Type.
    #[serde(rename = "type")]
    pub category_type: CategoryKind,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<categories::Model> for CategoryResponse {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category_type: model.kind.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn parse_type(raw: &str) -> Result<CategoryKind, ApiError> {
    raw.parse::<CategoryKind>()
        .map_err(|_| ApiError::validation("Type must be either 'expense' or 'income'"))
}

/// POST `/categories` - Create a category.
async fn create_category(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_type(&payload.category_type)?;
    let repo = CategoryRepository::new((*state.db).clone());
    let category = repo
        .create(CreateCategoryInput {
            name: payload.name,
            kind,
        })
        .await?;
    info!(category_id = %category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// GET `/categories` - List live categories by name.
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let kind = query.category_type.as_deref().map(parse_type).transpose()?;
    let repo = CategoryRepository::new((*state.db).clone());
    let rows = repo.list(kind).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET `/categories/{id}` - Get one category.
async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let repo = CategoryRepository::new((*state.db).clone());
    Ok(Json(repo.find_by_id(id).await?.into()))
}

/// PUT `/categories/{id}` - Rename or retype a category.
async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let kind = payload.category_type.as_deref().map(parse_type).transpose()?;
    let repo = CategoryRepository::new((*state.db).clone());
    let category = repo
        .update(
            id,
            UpdateCategoryInput {
                name: payload.name,
                kind,
            },
        )
        .await?;
    info!(category_id = %id, "Category updated");
    Ok(Json(category.into()))
}

/// DELETE `/categories/{id}` - Soft-delete an unreferenced category.
async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CategoryRepository::new((*state.db).clone());
    repo.delete(id).await?;
    info!(category_id = %id, "Category deleted");
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
