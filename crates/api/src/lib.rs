//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Request extractors that answer malformed input with `400`
//! - Error to response mapping

pub mod error;
pub mod extractors;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tally_core::transaction::{BulkLimits, LedgerService};
use tally_db::TransactionRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Batch size limits for the bulk endpoints.
    pub limits: BulkLimits,
}

impl AppState {
    /// Creates state with the default bulk limits.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            limits: BulkLimits::default(),
        }
    }

    /// Ledger service over the shared connection.
    #[must_use]
    pub fn ledger(&self) -> LedgerService<TransactionRepository> {
        LedgerService::new(TransactionRepository::new((*self.db).clone()))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
