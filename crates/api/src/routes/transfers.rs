//! Transfer routes.
//!
//! A transfer is a transaction of kind `transfer`; these endpoints are a
//! narrower front door onto the same ledger.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tally_core::{
    dates::FlexibleDate,
    transaction::{TransactionDraft, TransactionFilter, TransactionKind},
};
use tally_shared::types::BankAccountId;
use tracing::info;

use super::transactions::TransactionResponse;
use crate::{AppState, error::ApiError, extractors::ApiJson};

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transfers", post(create_transfer).get(list_transfers))
}

/// Request body for `POST /transfers`.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Positive amount.
    pub amount: Decimal,
    /// Account the money leaves.
    pub bank_account_id: BankAccountId,
    /// Account the money arrives in.
    pub destination_bank_account_id: BankAccountId,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Occurrence date, defaults to now.
    #[serde(default)]
    pub date: Option<FlexibleDate>,
    /// Caller-supplied reference.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl From<TransferRequest> for TransactionDraft {
    fn from(req: TransferRequest) -> Self {
        Self {
            external_ref: req.transaction_id,
            amount: req.amount,
            kind: TransactionKind::Transfer.as_str().to_string(),
            category_id: None,
            bank_account_id: req.bank_account_id,
            destination_bank_account_id: Some(req.destination_bank_account_id),
            description: req.description,
            occurred_at: req.date.map(FlexibleDate::into_inner),
        }
    }
}

/// POST `/transfers` - Move money between two accounts.
async fn create_transfer(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.ledger().create(payload.into()).await?;
    info!(
        transaction_id = %view.transaction.id,
        from = %view.transaction.bank_account_id,
        amount = %view.transaction.amount,
        "Transfer created"
    );
    Ok((StatusCode::CREATED, Json(TransactionResponse::from(view))))
}

/// GET `/transfers` - List transfers, newest first.
async fn list_transfers(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let filter = TransactionFilter {
        kind: Some(TransactionKind::Transfer),
        ..TransactionFilter::default()
    };
    let views = state.ledger().list(filter).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}
