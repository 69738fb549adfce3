//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod bank_accounts;
pub mod categories;
pub mod health;
pub mod transactions;
pub mod transfers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(transactions::routes())
        .merge(transfers::routes())
        .merge(categories::routes())
        .merge(bank_accounts::routes())
}
