//! # mate-orm: active record data access
//!
//! A model type names its table, its fillable columns and whether it keeps
//! timestamps or soft-deletes rows. It then gets CRUD operations, a fluent
//! query builder, aggregates, pagination and lifecycle events without
//! hand-written SQL.
//!
//! ```no_run
//! use mate_orm::{CrudOperations, Database, DatabaseConfig, Model, QueryMethods};
//! use serde_json::json;
//!
//! struct User;
//!
//! impl Model for User {
//!     fn table_name() -> &'static str { "users" }
//!     fn fillable() -> &'static [&'static str] { &["name", "email"] }
//!     fn uses_timestamps() -> bool { true }
//!     fn uses_soft_deletes() -> bool { true }
//! }
//!
//! # async fn run() -> mate_orm::ModelResult<()> {
//! let db = Database::connect(&DatabaseConfig::from_env()?).await?;
//!
//! let data = json!({"name": "Ada", "email": "ada@example.com"});
//! let user = User::create(&db, data.as_object().cloned().unwrap_or_default()).await?;
//!
//! let recent = User::query()
//!     .like("email", "example.com")
//!     .order_by("created_at", "desc")
//!     .limit(10)
//!     .get(&db)
//!     .await?;
//! # let _ = (user, recent);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod database;
pub mod error;
pub mod event_error;
pub mod events;
pub mod logging;
pub mod model;
pub mod query;
pub mod security;
pub mod transaction;

#[cfg(test)]
mod tests;

// Re-export core traits and types
pub use backends::{DatabaseBackendType, DatabaseValue, ExecuteResult, Record, SqlDialect};
pub use config::{ConfigError, DatabaseConfig};
pub use database::{ConnectionProvider, Database, Executor};
pub use error::*;
pub use event_error::EventError;
pub use events::{EventCallback, EventRegistry, ModelEvent};
pub use logging::{init_logging, LoggingConfig};
pub use model::{
    ActiveRecord, CrudOperations, Model, QueryMethods, UpsertOperations, TIMESTAMP_FORMAT,
};
pub use query::{JoinType, OrderDirection, Page, QueryBuilder, QueryOperator};
pub use transaction::Transaction;
