//! Connection and seeding configuration.
//!
//! Everything is read from the process environment. The `from_lookup`
//! constructors take any key lookup so tests don't have to touch real
//! environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use thiserror::Error;

/// Connection string variables, most preferred first. The non-pooled URL
/// bypasses connection proxies.
pub const DATABASE_URL_VARS: [&str; 3] = ["POSTGRES_URL_NON_POOLING", "POSTGRES_URL", "DATABASE_URL"];

/// Overrides the TLS mode (defaults to `require`).
pub const SSL_MODE_VAR: &str = "SEED_SSL_MODE";

pub const BATCH_SIZE_VAR: &str = "SEED_BATCH_SIZE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No database URL set (tried {})", DATABASE_URL_VARS.join(", "))]
    MissingDatabaseUrl,
    #[error("Invalid SSL mode: {0}")]
    InvalidSslMode(String),
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(String),
    #[error("Invalid database URL: {0}")]
    Database(#[from] sqlx::Error),
}

/// How to reach the Postgres database.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = DATABASE_URL_VARS
            .into_iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let ssl_mode = match lookup(SSL_MODE_VAR).filter(|v| !v.trim().is_empty()) {
            Some(mode) => mode
                .trim()
                .parse::<PgSslMode>()
                .map_err(|_| ConfigError::InvalidSslMode(mode))?,
            None => PgSslMode::Require,
        };

        Ok(Self {
            url,
            ssl_mode,
            ..Self::with_url("")
        })
    }

    /// Configuration for an explicit URL with TLS required.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ssl_mode: PgSslMode::Require,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
        }
    }

    pub fn ssl_mode(mut self, ssl_mode: PgSslMode) -> Self {
        self.ssl_mode = ssl_mode;
        self
    }

    /// Builds connect options with the configured TLS mode and the
    /// prepared-statement cache disabled, which keeps statements valid
    /// behind transaction-pooling proxies such as PgBouncer.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let options = self
            .url
            .parse::<PgConnectOptions>()?
            .ssl_mode(self.ssl_mode)
            .statement_cache_capacity(0);
        Ok(options)
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }

    /// Connects a pool, failing fast if the database is unreachable.
    pub async fn connect_pool(&self) -> Result<PgPool, ConfigError> {
        let pool = self
            .pool_options()
            .connect_with(self.connect_options()?)
            .await?;
        Ok(pool)
    }

    /// Creates a pool that opens connections on first use.
    pub fn lazy_pool(&self) -> Result<PgPool, ConfigError> {
        Ok(self.pool_options().connect_lazy_with(self.connect_options()?))
    }
}

// The URL carries credentials.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

/// Configuration for seeding operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Rows per multi-row INSERT statement, lowered per table when it would
    /// exceed the bind-parameter limit.
    pub batch_size: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { batch_size: 50 }
    }
}

impl SeedConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let Some(raw) = lookup(BATCH_SIZE_VAR) else {
            return Ok(Self::default());
        };

        match raw.trim().parse::<usize>() {
            Ok(batch_size) if batch_size > 0 => Ok(Self { batch_size }),
            _ => Err(ConfigError::InvalidBatchSize(raw)),
        }
    }
}
