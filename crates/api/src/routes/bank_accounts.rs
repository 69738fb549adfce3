//! Bank account management routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_db::{
    BankAccountRepository,
    entities::{bank_accounts, sea_orm_active_enums::AccountType},
    repositories::{CreateBankAccountInput, UpdateBankAccountInput},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath},
};

/// Creates the bank account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts", post(create_bank_account).get(list_bank_accounts))
        .route(
            "/bank-accounts/{id}",
            get(get_bank_account)
                .put(update_bank_account)
                .delete(delete_bank_account),
        )
}

/// Request body for creating a bank account.
#[derive(Debug, Deserialize)]
pub struct CreateBankAccountRequest {
    /// Display name.
    pub name: String,
    /// Account number at the bank.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Bank holding the account.
    pub bank_name: String,
    /// Account type, defaults to `checking`.
    #[serde(default)]
    pub account_type: Option<String>,
    /// Opening balance, defaults to zero.
    #[serde(default)]
    pub balance: Option<Decimal>,
    /// Defaults to `true`.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Request body for updating a bank account. Absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdateBankAccountRequest {
    /// New name.
    pub name: Option<String>,
    /// New account number, `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub account_number: Option<Option<String>>,
    /// New bank name.
    pub bank_name: Option<String>,
    /// New account type.
    pub account_type: Option<String>,
    /// New balance.
    pub balance: Option<Decimal>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
}

/// Query parameters for listing bank accounts.
#[derive(Debug, Deserialize)]
pub struct ListBankAccountsQuery {
    /// Include deactivated accounts.
    #[serde(default)]
    pub include_inactive: bool,
}

/// Response for a bank account.
#[derive(Debug, Serialize)]
pub struct BankAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Account number.
    pub account_number: Option<String>,
    /// Bank name.
    pub bank_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Recorded balance.
    pub balance: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<bank_accounts::Model> for BankAccountResponse {
    fn from(model: bank_accounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            account_number: model.account_number,
            bank_name: model.bank_name,
            account_type: model.account_type,
            balance: model.balance,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn parse_account_type(raw: &str) -> Result<AccountType, ApiError> {
    raw.parse::<AccountType>().map_err(|_| {
        ApiError::validation(
            "Invalid account type. Must be one of: checking, savings, credit, investment, other",
        )
    })
}

/// POST `/bank-accounts` - Create a bank account.
async fn create_bank_account(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBankAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account_type = payload
        .account_type
        .as_deref()
        .map(parse_account_type)
        .transpose()?
        .unwrap_or(AccountType::Checking);

    let repo = BankAccountRepository::new((*state.db).clone());
    let account = repo
        .create(CreateBankAccountInput {
            name: payload.name,
            account_number: payload.account_number,
            bank_name: payload.bank_name,
            account_type,
            balance: payload.balance.unwrap_or(Decimal::ZERO),
            is_active: payload.is_active.unwrap_or(true),
        })
        .await?;
    info!(bank_account_id = %account.id, name = %account.name, "Bank account created");
    Ok((StatusCode::CREATED, Json(BankAccountResponse::from(account))))
}

/// GET `/bank-accounts` - List accounts by name.
async fn list_bank_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListBankAccountsQuery>,
) -> Result<Json<Vec<BankAccountResponse>>, ApiError> {
    let repo = BankAccountRepository::new((*state.db).clone());
    let rows = repo.list(query.include_inactive).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET `/bank-accounts/{id}` - Get one account.
async fn get_bank_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<BankAccountResponse>, ApiError> {
    let repo = BankAccountRepository::new((*state.db).clone());
    Ok(Json(repo.find_by_id(id).await?.into()))
}

/// PUT `/bank-accounts/{id}` - Update the supplied fields.
async fn update_bank_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateBankAccountRequest>,
) -> Result<Json<BankAccountResponse>, ApiError> {
    let account_type = payload
        .account_type
        .as_deref()
        .map(parse_account_type)
        .transpose()?;

    let repo = BankAccountRepository::new((*state.db).clone());
    let account = repo
        .update(
            id,
            UpdateBankAccountInput {
                name: payload.name,
                account_number: payload.account_number,
                bank_name: payload.bank_name,
                account_type,
                balance: payload.balance,
                is_active: payload.is_active,
            },
        )
        .await?;
    info!(bank_account_id = %id, "Bank account updated");
    Ok(Json(account.into()))
}

/// DELETE `/bank-accounts/{id}` - Soft-delete an unreferenced account.
async fn delete_bank_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = BankAccountRepository::new((*state.db).clone());
    repo.delete(id).await?;
    info!(bank_account_id = %id, "Bank account deleted");
    Ok(StatusCode::NO_CONTENT)
}
