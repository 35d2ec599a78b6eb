//! SQLite Backend Implementation
//!
//! Embedded backend on top of sqlx. An in-memory database lives exactly as
//! long as its single pooled connection, so the pool never expires idle
//! connections.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Pool, Row, Sqlite, TypeInfo, ValueRef};
use tracing::debug;

use super::core::*;
use crate::config::DatabaseConfig;
use crate::error::{DataAccessKind, ModelError, OrmResult};

/// SQLite database backend implementation
#[derive(Debug, Default)]
pub struct SqliteBackend;

impl SqliteBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseBackend for SqliteBackend {
    async fn connect(&self, config: &DatabaseConfig) -> OrmResult<Box<dyn DatabaseConnection>> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| ModelError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                ModelError::data_access(
                    DataAccessKind::Connection,
                    format!("Failed to open SQLite pool: {}", e),
                )
            })?;

        debug!(max_connections = config.max_connections, "SQLite pool opened");
        Ok(Box::new(SqliteConnection::new(pool)))
    }

    fn sql_dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn backend_type(&self) -> crate::backends::DatabaseBackendType {
        crate::backends::DatabaseBackendType::SQLite
    }
}

/// Shared SQLite handle
pub struct SqliteConnection {
    pool: Pool<Sqlite>,
}

impl SqliteConnection {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseConnection for SqliteConnection {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let result = query.execute(&self.pool).await?;
        Ok(ExecuteResult {
            rows_affected: result.rows_affected(),
            last_insert_id: Some(result.last_insert_rowid()),
        })
    }

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(sqlite_row_to_record).collect()
    }

    async fn begin_transaction(&self) -> OrmResult<Box<dyn DatabaseTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTransaction { tx: Some(tx) }))
    }

    async fn close(&self) -> OrmResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// SQLite transaction implementation
pub struct SqliteTransaction {
    tx: Option<sqlx::Transaction<'static, Sqlite>>,
}

impl SqliteTransaction {
    fn active(&mut self) -> OrmResult<&mut sqlx::Transaction<'static, Sqlite>> {
        self.tx
            .as_mut()
            .ok_or_else(|| ModelError::Transaction("Transaction already completed".to_string()))
    }
}

#[async_trait]
impl DatabaseTransaction for SqliteTransaction {
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult> {
        let tx = self.active()?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let result = query.execute(&mut **tx).await?;
        Ok(ExecuteResult {
            rows_affected: result.rows_affected(),
            last_insert_id: Some(result.last_insert_rowid()),
        })
    }

    async fn fetch_all(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>> {
        let tx = self.active()?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let rows = query.fetch_all(&mut **tx).await?;
        rows.iter().map(sqlite_row_to_record).collect()
    }

    async fn commit(mut self: Box<Self>) -> OrmResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| ModelError::Transaction("Transaction already completed".to_string()))?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> OrmResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| ModelError::Transaction("Transaction already completed".to_string()))?;
        tx.rollback().await?;
        Ok(())
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &DatabaseValue,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Json(j) => query.bind(j.to_string()),
    }
}

fn sqlite_row_to_record(row: &SqliteRow) -> OrmResult<Record> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = sqlite_value_to_database_value(row, index)?;
        record.insert(column.name().to_string(), value.to_json());
    }
    Ok(record)
}

/// Convert a SQLite column value to DatabaseValue
///
/// SQLite is dynamically typed, so the storage class of the value decides
/// the conversion and decoding skips sqlx's declared-type check.
fn sqlite_value_to_database_value(row: &SqliteRow, index: usize) -> OrmResult<DatabaseValue> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(DatabaseValue::Null);
        }
        raw.type_info().name().to_uppercase()
    };

    let value = match type_name.as_str() {
        "NULL" => DatabaseValue::Null,
        "BOOLEAN" => DatabaseValue::Bool(row.try_get_unchecked::<bool, _>(index)?),
        "INTEGER" | "INT" | "INT4" | "INT8" | "BIGINT" => {
            DatabaseValue::Int64(row.try_get_unchecked::<i64, _>(index)?)
        }
        "REAL" | "FLOAT" | "DOUBLE" => DatabaseValue::Float64(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => DatabaseValue::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => DatabaseValue::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
