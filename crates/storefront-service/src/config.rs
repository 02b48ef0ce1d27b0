//! Storefront configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use storefront_db::DbConfig;

/// Path that selects an in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Storefront service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// SQLite database file (`:memory:` for an in-memory database)
    pub db_path: String,

    /// Maximum pooled connections
    pub db_max_connections: u32,

    /// How long a writer waits for the SQLite write lock, in milliseconds
    pub db_busy_timeout_ms: u64,

    /// Apply embedded migrations on connect
    pub run_migrations: bool,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            db_path: "./storefront.db".to_string(),
            db_max_connections: 5,
            db_busy_timeout_ms: 5000,
            run_migrations: true,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `STOREFRONT_DB_PATH` | `./storefront.db` |
    /// | `STOREFRONT_DB_MAX_CONNECTIONS` | `5` |
    /// | `STOREFRONT_DB_BUSY_TIMEOUT_MS` | `5000` |
    /// | `STOREFRONT_RUN_MIGRATIONS` | `true` |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`load`](Self::load), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StorefrontConfig::default();

        let config = StorefrontConfig {
            db_path: lookup("STOREFRONT_DB_PATH").unwrap_or(defaults.db_path),

            db_max_connections: match lookup("STOREFRONT_DB_MAX_CONNECTIONS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("STOREFRONT_DB_MAX_CONNECTIONS".to_string())
                })?,
                None => defaults.db_max_connections,
            },

            db_busy_timeout_ms: match lookup("STOREFRONT_DB_BUSY_TIMEOUT_MS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("STOREFRONT_DB_BUSY_TIMEOUT_MS".to_string())
                })?,
                None => defaults.db_busy_timeout_ms,
            },

            run_migrations: match lookup("STOREFRONT_RUN_MIGRATIONS") {
                Some(raw) => parse_bool(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue("STOREFRONT_RUN_MIGRATIONS".to_string()))?,
                None => defaults.run_migrations,
            },
        };

        if config.db_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("STOREFRONT_DB_PATH".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOREFRONT_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings for [`storefront_db::Database::new`].
    pub fn to_db_config(&self) -> DbConfig {
        let base = if self.db_path == IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.db_path).max_connections(self.db_max_connections)
        };

        base.busy_timeout(Duration::from_millis(self.db_busy_timeout_ms))
            .run_migrations(self.run_migrations)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
