//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Database status response.
#[derive(Serialize)]
pub struct DbStatusResponse {
    /// `connected` or `disconnected`.
    pub status: &'static str,
    /// Human-readable detail.
    pub message: &'static str,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Pings the database. Always answers `200`; the body carries the state.
async fn db_status(State(state): State<AppState>) -> Json<DbStatusResponse> {
    let (status, message) = match state.db.ping().await {
        Ok(()) => ("connected", "Database is connected and responding"),
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            ("disconnected", "Database is not connected")
        }
    };
    Json(DbStatusResponse {
        status,
        message,
        timestamp: Utc::now(),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/db-status", get(db_status))
}
