//! Connection configuration
//!
//! `DATABASE_URL` wins when present. Otherwise the URL is assembled from the
//! `DB_*` variables, falling back to the defaults of the local docker setup.

use std::env;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::backends::DatabaseBackendType;
use crate::error::ModelError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

impl From<ConfigError> for ModelError {
    fn from(err: ConfigError) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackendType,
    pub url: String,
    /// Upper bound on pooled connections; 1 keeps a single shared handle
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Build a configuration from a connection URL
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let backend =
            DatabaseBackendType::from_url(url).ok_or_else(|| ConfigError::InvalidValue {
                field: "DATABASE_URL".to_string(),
                value: url.to_string(),
                expected: "a mysql:// or sqlite: URL".to_string(),
            })?;

        Ok(Self {
            backend,
            url: url.to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 30,
        })
    }

    /// Private in-memory SQLite database, handy for tests and tooling
    pub fn sqlite_memory() -> Self {
        Self {
            backend: DatabaseBackendType::SQLite,
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 30,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Only the process environment is read; no `.env` file is loaded, so
    /// callers set `DATABASE_URL` or the `DB_*` variables themselves.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match get_env_optional("DATABASE_URL") {
            Some(url) => Self::from_url(&url)?,
            None => Self::from_parts()?,
        };

        config.max_connections = parse_env("DB_MAX_CONNECTIONS", config.max_connections)?;
        config.acquire_timeout_seconds =
            parse_env("DB_ACQUIRE_TIMEOUT", config.acquire_timeout_seconds)?;

        config.validate()?;
        Ok(config)
    }

    fn from_parts() -> Result<Self, ConfigError> {
        let driver = get_env_or_default("DB_DRIVER", "mysql");
        let backend =
            DatabaseBackendType::from_str(&driver).map_err(|_| ConfigError::InvalidValue {
                field: "DB_DRIVER".to_string(),
                value: driver.clone(),
                expected: "mysql or sqlite".to_string(),
            })?;

        let database = get_env_or_default("DB_DATABASE", "matephp");

        let url = match backend {
            DatabaseBackendType::SQLite => format!("sqlite://{}", database),
            DatabaseBackendType::MySQL => {
                let host = get_env_or_default("DB_HOST", "db");
                let port: u16 = parse_env("DB_PORT", 3306)?;
                let username = get_env_or_default("DB_USERNAME", "root");
                let password = get_env_or_default("DB_PASSWORD", "root");
                mysql_url(&host, port, &database, &username, &password)?
            }
        };

        Ok(Self {
            backend,
            url,
            max_connections: 1,
            acquire_timeout_seconds: 30,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "url".to_string(),
                reason: "Database URL cannot be empty".to_string(),
            });
        }

        if self.max_connections == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "max_connections".to_string(),
                reason: "At least one connection is required".to_string(),
            });
        }

        Ok(())
    }
}

fn mysql_url(
    host: &str,
    port: u16,
    database: &str,
    username: &str,
    password: &str,
) -> Result<String, ConfigError> {
    let invalid = |field: &str, value: &str| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: "a valid URL component".to_string(),
    };

    let mut url =
        Url::parse(&format!("mysql://{}:{}", host, port)).map_err(|_| invalid("DB_HOST", host))?;
    url.set_path(database);
    url.set_username(username)
        .map_err(|_| invalid("DB_USERNAME", username))?;
    url.set_password(Some(password))
        .map_err(|_| invalid("DB_PASSWORD", "***"))?;
    Ok(url.to_string())
}

fn get_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match get_env_optional(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: key.to_string(),
            value: raw,
            expected: "a number".to_string(),
        }),
        None => Ok(default),
    }
}
