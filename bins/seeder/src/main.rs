//! Default category seeder for Tally.
//!
//! Inserts the starter expense and income categories that are missing.
//! Safe to run repeatedly.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_db::{ConnectSettings, connect_with_retry, seed::seed_default_categories};
use tally_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with_retry(
        &config.database.url,
        ConnectSettings {
            max_connections: 1,
            min_connections: 1,
            retries: config.database.connect_retries,
        },
    )
    .await
    .context("Failed to connect to database")?;

    let inserted = seed_default_categories(&db)
        .await
        .context("Failed to seed default categories")?;
    info!(inserted, "Seeding complete");

    Ok(())
}
