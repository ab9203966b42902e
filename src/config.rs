//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! [database]
//! url = "postgres://taskferry@localhost/taskferry"
//! max_connections = 8
//!
//! [logging]
//! filter = "taskferry=debug,info"
//! ```
//!
//! Every section is optional. Without a `[database]` URL only the in-memory
//! adapters can be wired.

use crate::migration::adapters::postgres::MigrationPgPool;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_LOG_FILTER: &str = "info";

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskferryConfig {
    /// Persistence settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Structured logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

impl TaskferryConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Validation`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, plus the
    /// errors of [`Self::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] when serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_owned(),
            ));
        }
        if self
            .database
            .url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "database.url must not be blank".to_owned(),
            ));
        }
        Ok(())
    }

    /// Builds the connection pool for the `PostgreSQL` adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when no URL is configured,
    /// or [`ConfigError::Pool`] when the pool cannot open its connections.
    pub fn connection_pool(&self) -> Result<MigrationPgPool, ConfigError> {
        let url = self
            .database
            .url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(self.database.max_connections)
            .build(manager)?;
        tracing::info!(
            max_connections = self.database.max_connections,
            "database pool ready"
        );
        Ok(pool)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("configuration validation failed: {0}")]
    Validation(String),

    /// A database pool was requested without a URL.
    #[error("database.url is not configured")]
    MissingDatabaseUrl,

    /// The connection pool could not be built.
    #[error("failed to build database pool: {0}")]
    Pool(#[from] PoolError),
}
