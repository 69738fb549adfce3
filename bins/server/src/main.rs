//! Tally API Server
//!
//! Main entry point for the Tally backend service.

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_api::{AppState, create_router};
use tally_core::transaction::BulkLimits;
use tally_db::{ConnectSettings, connect_with_retry, mask_database_url, migration::Migrator};
use tally_shared::AppConfig;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tally=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    // LOG_FORMAT=json for machine-readable output.
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(database = %mask_database_url(&config.database.url), "Configuration loaded");

    let db = connect_with_retry(
        &config.database.url,
        ConnectSettings {
            max_connections: config.database.max_connections,
            min_connections: config.database.min_connections,
            retries: config.database.connect_retries,
        },
    )
    .await
    .context("Failed to connect to database")?;

    if config.database.auto_migrate {
        Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    let mut state = AppState::new(db);
    state.limits = BulkLimits {
        create_max: config.limits.bulk_create_max,
        delete_max: config.limits.bulk_delete_max,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
