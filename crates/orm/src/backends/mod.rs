//! Database Backend Abstractions
//!
//! This module provides database backend abstractions so the ORM can run
//! against MySQL or SQLite through common traits and interfaces.

pub mod core;
pub mod mysql;
pub mod sqlite;

pub use self::core::*;
pub use mysql::MySqlBackend;
pub use sqlite::SqliteBackend;

/// Database backend type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseBackendType {
    MySQL,
    SQLite,
}

impl DatabaseBackendType {
    /// Backend implementation for this type
    pub fn backend(&self) -> Box<dyn DatabaseBackend> {
        match self {
            DatabaseBackendType::MySQL => Box::new(MySqlBackend::new()),
            DatabaseBackendType::SQLite => Box::new(SqliteBackend::new()),
        }
    }

    /// Detect database backend type from a connection URL
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Some(DatabaseBackendType::MySQL)
        } else if url.starts_with("sqlite:") {
            Some(DatabaseBackendType::SQLite)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DatabaseBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseBackendType::MySQL => write!(f, "mysql"),
            DatabaseBackendType::SQLite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for DatabaseBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseBackendType::MySQL),
            "sqlite" => Ok(DatabaseBackendType::SQLite),
            _ => Err(format!("Unsupported database backend: {}", s)),
        }
    }
}
