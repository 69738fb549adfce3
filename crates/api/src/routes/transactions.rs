//! Transaction routes: CRUD, bulk operations, date-range queries and reports.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tally_core::{
    dates::{DateRange, FlexibleDate},
    reports::{AggregateReport, AggregateTableReport, ReportService, SummaryOverview, SummaryTotals},
    transaction::{
        AccountInfo, BulkCreateOutcome, CategoryKind, TransactionDraft, TransactionFilter,
        TransactionKind, TransactionPatch, TransactionView, ValidationError,
    },
};
use tally_shared::types::{BankAccountId, CategoryId, TransactionId};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extractors::{ApiJson, ApiPath},
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction).get(list_transactions))
        .route(
            "/transactions/bulk",
            post(create_bulk_transactions).delete(delete_bulk_transactions),
        )
        .route("/transactions/aggregate", get(get_aggregate))
        .route("/transactions/aggregate/table", get(get_aggregate_table))
        .route("/transactions/date-range", get(get_by_date_range))
        .route("/transactions/summary", get(get_summary))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{id}/category", patch(update_transaction_category))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a single transaction, also used as a bulk item.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    /// Caller-supplied reference.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Positive amount.
    pub amount: Decimal,
    /// `expense`, `income` or `transfer`.
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Category, for expense and income.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Source account.
    pub bank_account_id: BankAccountId,
    /// Destination account, for transfers.
    #[serde(default)]
    pub destination_bank_account_id: Option<BankAccountId>,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Occurrence date in any accepted format, defaults to now.
    #[serde(default)]
    pub date: Option<FlexibleDate>,
}

impl From<TransactionRequest> for TransactionDraft {
    fn from(req: TransactionRequest) -> Self {
        Self {
            external_ref: req.transaction_id,
            amount: req.amount,
            kind: req.transaction_type,
            category_id: req.category_id,
            bank_account_id: req.bank_account_id,
            destination_bank_account_id: req.destination_bank_account_id,
            description: req.description,
            occurred_at: req.date.map(FlexibleDate::into_inner),
        }
    }
}

/// Request body for `PUT /transactions/{id}`. Absent fields keep their value;
/// `null` clears a nullable reference.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    /// New reference.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub transaction_id: Option<Option<String>>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// New category.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category_id: Option<Option<CategoryId>>,
    /// New source account.
    pub bank_account_id: Option<BankAccountId>,
    /// New destination account.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub destination_bank_account_id: Option<Option<BankAccountId>>,
    /// New description.
    pub description: Option<String>,
    /// New occurrence date.
    pub date: Option<FlexibleDate>,
}

impl From<UpdateTransactionRequest> for TransactionPatch {
    fn from(req: UpdateTransactionRequest) -> Self {
        Self {
            external_ref: req.transaction_id,
            amount: req.amount,
            kind: req.transaction_type,
            category_id: req.category_id,
            bank_account_id: req.bank_account_id,
            destination_bank_account_id: req.destination_bank_account_id,
            description: req.description,
            occurred_at: req.date.map(FlexibleDate::into_inner),
        }
    }
}

/// Request body for `PATCH /transactions/{id}/category`.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    /// The new category.
    pub category_id: Option<CategoryId>,
}

/// Request body for `POST /transactions/bulk`. Items stay raw so a malformed
/// one fails alone instead of rejecting the batch.
#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    /// Items to create.
    #[serde(default)]
    pub transactions: Vec<Value>,
}

/// Decodes one bulk item into a draft.
fn decode_bulk_item(item: &Value) -> Result<TransactionDraft, String> {
    TransactionRequest::deserialize(item)
        .map(TransactionDraft::from)
        .map_err(|e| format!("Invalid transaction data: {e}"))
}

/// Request body for `DELETE /transactions/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    /// IDs to delete.
    #[serde(default)]
    pub transaction_ids: Vec<TransactionId>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

/// Query parameters for date-windowed endpoints.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// First day, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Optional `expense` or `income`.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

/// Account summary embedded in a transaction.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    /// Account ID.
    pub id: BankAccountId,
    /// Account name.
    pub name: String,
    /// Bank name.
    pub bank_name: String,
}

impl From<AccountInfo> for AccountSummary {
    fn from(info: AccountInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            bank_name: info.bank_name,
        }
    }
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: TransactionId,
    /// Caller-supplied reference.
    pub transaction_id: Option<String>,
    /// Amount.
    pub amount: Decimal,
    /// Type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionKind,
    /// Category ID, absent for transfers.
    pub category_id: Option<CategoryId>,
    /// Category name, absent for transfers.
    pub category: Option<String>,
    /// Source account ID.
    pub bank_account_id: BankAccountId,
    /// Source account.
    pub bank_account: Option<AccountSummary>,
    /// Destination account ID, transfers only.
    pub destination_bank_account_id: Option<BankAccountId>,
    /// Destination account, transfers only.
    pub destination_bank_account: Option<AccountSummary>,
    /// Description.
    pub description: String,
    /// Occurrence date.
    pub date: FlexibleDate,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionView> for TransactionResponse {
    fn from(view: TransactionView) -> Self {
        let tx = view.transaction;
        Self {
            id: tx.id,
            transaction_id: tx.external_ref,
            amount: tx.amount,
            transaction_type: tx.detail.kind(),
            category_id: tx.detail.category_id(),
            category: view.category_name,
            bank_account_id: tx.bank_account_id,
            bank_account: view.bank_account.map(AccountSummary::from),
            destination_bank_account_id: tx.detail.destination_account_id(),
            destination_bank_account: view.destination_bank_account.map(AccountSummary::from),
            description: tx.description,
            date: FlexibleDate(tx.occurred_at),
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}

/// Failed bulk item.
#[derive(Debug, Serialize)]
pub struct BulkFailureResponse {
    /// Position in the request.
    pub index: usize,
    /// The item exactly as submitted.
    pub transaction: Value,
    /// Why it failed.
    pub error: String,
}

/// Response for `POST /transactions/bulk`.
#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    /// Created transactions.
    pub success: Vec<TransactionResponse>,
    /// Rejected items.
    pub failed: Vec<BulkFailureResponse>,
    /// Items submitted.
    pub total_count: usize,
    /// Items created.
    pub success_count: usize,
    /// Items rejected.
    pub failed_count: usize,
}

impl From<BulkCreateOutcome<Value>> for BulkCreateResponse {
    fn from(outcome: BulkCreateOutcome<Value>) -> Self {
        Self {
            success: outcome.success.into_iter().map(Into::into).collect(),
            failed: outcome
                .failed
                .into_iter()
                .map(|f| BulkFailureResponse {
                    index: f.index,
                    transaction: f.transaction,
                    error: f.error,
                })
                .collect(),
            total_count: outcome.total_count,
            success_count: outcome.success_count,
            failed_count: outcome.failed_count,
        }
    }
}

/// Response for `GET /transactions/summary`.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Counts by kind.
    pub overview: SummaryOverview,
    /// Sums by kind.
    pub totals: SummaryTotals,
    /// Most recently created transactions.
    pub recent_transactions: Vec<TransactionResponse>,
}

fn to_responses(views: Vec<TransactionView>) -> Vec<TransactionResponse> {
    views.into_iter().map(Into::into).collect()
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// An empty query value means no filter.
fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

/// Parses the optional `type` filter of the listing.
fn parse_kind(raw: Option<&str>) -> Result<Option<TransactionKind>, ApiError> {
    non_empty(raw).map(|s| {
        s.parse::<TransactionKind>()
            .map_err(|e| ApiError::validation(ValidationError::InvalidKind(e).to_string()))
    })
    .transpose()
}

/// Parses the `type` filter of date-windowed queries, where transfers never
/// appear.
fn parse_category_kind(raw: Option<&str>) -> Result<Option<TransactionKind>, ApiError> {
    non_empty(raw).map(|s| {
        s.parse::<CategoryKind>()
            .map(CategoryKind::transaction_kind)
            .map_err(|_| ApiError::validation("Type must be either 'expense' or 'income'"))
    })
    .transpose()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/transactions` - Create a transaction.
async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.ledger().create(payload.into()).await?;
    info!(transaction_id = %view.transaction.id, kind = %view.kind(), "Transaction created");
    Ok((StatusCode::CREATED, Json(TransactionResponse::from(view))))
}

/// GET `/transactions` - List transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let filter = TransactionFilter {
        kind: parse_kind(query.transaction_type.as_deref())?,
        ..TransactionFilter::default()
    };
    let views = state.ledger().list(filter).await?;
    Ok(Json(to_responses(views)))
}

/// GET `/transactions/{id}` - Get one transaction.
async fn get_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let view = state.ledger().get(TransactionId::from_uuid(id)).await?;
    Ok(Json(view.into()))
}

/// PUT `/transactions/{id}` - Merge the supplied fields and revalidate.
async fn update_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let id = TransactionId::from_uuid(id);
    let view = state.ledger().update(id, payload.into()).await?;
    info!(transaction_id = %id, "Transaction updated");
    Ok(Json(view.into()))
}

/// PATCH `/transactions/{id}/category` - Re-categorize a transaction.
async fn update_transaction_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let category_id = payload
        .category_id
        .ok_or_else(|| ApiError::validation("category_id is required"))?;
    let id = TransactionId::from_uuid(id);
    let view = state.ledger().update_category(id, category_id).await?;
    info!(transaction_id = %id, category_id = %category_id, "Transaction re-categorized");
    Ok(Json(view.into()))
}

/// DELETE `/transactions/{id}` - Delete a transaction.
async fn delete_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let id = TransactionId::from_uuid(id);
    state.ledger().delete(id).await?;
    info!(transaction_id = %id, "Transaction deleted");
    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

/// POST `/transactions/bulk` - Create each item independently.
async fn create_bulk_transactions(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BulkCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .ledger()
        .create_bulk_with(payload.transactions, state.limits.create_max, decode_bulk_item)
        .await?;

    for failure in &outcome.failed {
        warn!(index = failure.index, error = %failure.error, "Bulk item rejected");
    }
    info!(
        total = outcome.total_count,
        created = outcome.success_count,
        failed = outcome.failed_count,
        "Bulk create finished"
    );

    let code = status(outcome.status().create_status_code());
    Ok((code, Json(BulkCreateResponse::from(outcome))))
}

/// DELETE `/transactions/bulk` - Delete each id independently.
async fn delete_bulk_transactions(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BulkDeleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .ledger()
        .delete_bulk(payload.transaction_ids, state.limits.delete_max)
        .await?;

    for failure in &outcome.failed {
        warn!(transaction_id = %failure.transaction_id, error = %failure.error, "Bulk delete item failed");
    }
    info!(
        total = outcome.total_count,
        deleted = outcome.deleted_count,
        failed = outcome.failed_count,
        "Bulk delete finished"
    );

    let code = status(outcome.status().delete_status_code());
    Ok((code, Json(outcome)))
}

/// GET `/transactions/aggregate` - Category totals over all time.
async fn get_aggregate(State(state): State<AppState>) -> Result<Json<AggregateReport>, ApiError> {
    let views = state
        .ledger()
        .list(TransactionFilter::categorized(None, None))
        .await?;
    Ok(Json(ReportService::generate_aggregate(&views)))
}

/// GET `/transactions/aggregate/table` - Income and expense breakdown for a window.
async fn get_aggregate_table(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<AggregateTableReport>, ApiError> {
    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;
    let views = state
        .ledger()
        .list(TransactionFilter::categorized(Some(range), None))
        .await?;
    Ok(Json(ReportService::generate_aggregate_table(&views, &range)))
}

/// GET `/transactions/date-range` - Transactions inside a window.
async fn get_by_date_range(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;
    let kind = parse_category_kind(query.transaction_type.as_deref())?;
    let views = state
        .ledger()
        .list(TransactionFilter::categorized(Some(range), kind))
        .await?;
    Ok(Json(to_responses(views)))
}

/// GET `/transactions/summary` - Counts, sums and the latest transactions.
async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    let views = state.ledger().list(TransactionFilter::default()).await?;
    let report = ReportService::generate_summary(&views);
    Ok(Json(SummaryResponse {
        overview: report.overview,
        totals: report.totals,
        recent_transactions: to_responses(report.recent_transactions),
    }))
}
