//! Application configuration management.

use serde::Deserialize;

/// Database used when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://tally.db?mode=rwc";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Batch limits for bulk endpoints.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// How many times to try connecting before giving up.
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    /// Run pending migrations on server start.
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_retries() -> u32 {
    5
}

fn default_auto_migrate() -> bool {
    true
}

/// Upper bounds on bulk request sizes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsConfig {
    /// Maximum items in one bulk create.
    #[serde(default = "default_bulk_create_max")]
    pub bulk_create_max: usize,
    /// Maximum ids in one bulk delete.
    #[serde(default = "default_bulk_delete_max")]
    pub bulk_delete_max: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            bulk_create_max: default_bulk_create_max(),
            bulk_delete_max: default_bulk_delete_max(),
        }
    }
}

fn default_bulk_create_max() -> usize {
    5000
}

fn default_bulk_delete_max() -> usize {
    1000
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Precedence, lowest first: built-in defaults, the plain `DB_URL` /
    /// `DATABASE_URL` / `PORT` variables, `config/default`,
    /// `config/{RUN_MODE}`, then `TALLY__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let database_url = std::env::var("DB_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let mut builder = config::Config::builder().set_default("database.url", database_url)?;
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            builder = builder.set_default("server.port", i64::from(port))?;
        }

        let config = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
