//! MySQL Backend Implementation
//!
//! This module provides the MySQL-specific implementation of the database
//! backend traits using sqlx as the underlying database driver.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, MySql, Pool, Row, TypeInfo, ValueRef};
use tracing::debug;

use super::core::*;
use crate::config::DatabaseConfig;
use crate::error::{DataAccessKind, ModelError, OrmResult};

/// Format used for DATETIME/TIMESTAMP values handed back to callers
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// MySQL database backend implementation
#[derive(Debug, Default)]
pub struct MySqlBackend;

impl MySqlBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseBackend for MySqlBackend {
    async fn connect(&self, config: &DatabaseConfig) -> OrmResult<Box<dyn DatabaseConnection>> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                ModelError::data_access(
                    DataAccessKind::Connection,
                    format!("Failed to connect to MySQL: {}", e),
                )
            })?;

        debug!(max_connections = config.max_connections, "MySQL pool opened");
        Ok(Box::new(MySqlConnection::new(pool)))
    }

    fn sql_dialect(&self) -> SqlDialect {
        SqlDialect::MySql
    }

    fn backend_type(&self) -> crate::backends::DatabaseBackendType {
        crate::backends::DatabaseBackendType::MySQL
    }
}

/// Shared MySQL handle
pub struct MySqlConnection {
    pool: Pool<MySql>,
}

impl MySqlConnection {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

fn execute_result(result: sqlx::mysql::MySqlQueryResult) -> ExecuteResult {
    let id = result.last_insert_id();
    ExecuteResult {
        rows_affected: result.rows_affected(),
        last_insert_id: (id > 0).then(|| i64::try_from(id).unwrap_or(i64::MAX)),
    }
}

#[async_trait]
impl DatabaseConnection for MySqlConnection {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::MySql
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let result = query.execute(&self.pool).await?;
        Ok(execute_result(result))
    }

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(mysql_row_to_record).collect()
    }

    async fn begin_transaction(&self) -> OrmResult<Box<dyn DatabaseTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlTransaction { tx: Some(tx) }))
    }

    async fn close(&self) -> OrmResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// MySQL transaction implementation
pub struct MySqlTransaction {
    tx: Option<sqlx::Transaction<'static, MySql>>,
}

impl MySqlTransaction {
    fn active(&mut self) -> OrmResult<&mut sqlx::Transaction<'static, MySql>> {
        self.tx
            .as_mut()
            .ok_or_else(|| ModelError::Transaction("Transaction already completed".to_string()))
    }
}

#[async_trait]
impl DatabaseTransaction for MySqlTransaction {
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult> {
        let tx = self.active()?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let result = query.execute(&mut **tx).await?;
        Ok(execute_result(result))
    }

    async fn fetch_all(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>> {
        let tx = self.active()?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let rows = query.fetch_all(&mut **tx).await?;
        rows.iter().map(mysql_row_to_record).collect()
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
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    value: &DatabaseValue,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

fn mysql_row_to_record(row: &MySqlRow) -> OrmResult<Record> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = mysql_value_to_database_value(row, index)?;
        record.insert(column.name().to_string(), value.to_json());
    }
    Ok(record)
}

/// Convert a MySQL column value to DatabaseValue
fn mysql_value_to_database_value(row: &MySqlRow, index: usize) -> OrmResult<DatabaseValue> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let type_name = row.columns()[index].type_info().name().to_string();

    let value = match type_name.as_str() {
        "BOOLEAN" => DatabaseValue::Bool(row.try_get::<bool, _>(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            DatabaseValue::Int64(row.try_get::<i64, _>(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => {
            let value: u64 = row.try_get(index)?;
            match i64::try_from(value) {
                Ok(v) => DatabaseValue::Int64(v),
                Err(_) => DatabaseValue::String(value.to_string()),
            }
        }
        "FLOAT" => DatabaseValue::Float64(row.try_get::<f32, _>(index)? as f64),
        "DOUBLE" => DatabaseValue::Float64(row.try_get::<f64, _>(index)?),
        "DATETIME" | "TIMESTAMP" => {
            let value: chrono::NaiveDateTime = row.try_get(index)?;
            DatabaseValue::String(value.format(DATETIME_FORMAT).to_string())
        }
        "DATE" => {
            let value: chrono::NaiveDate = row.try_get(index)?;
            DatabaseValue::String(value.to_string())
        }
        "JSON" => DatabaseValue::Json(row.try_get::<serde_json::Value, _>(index)?),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            DatabaseValue::Bytes(row.try_get::<Vec<u8>, _>(index)?)
        }
        // DECIMAL, TEXT, VARCHAR, ENUM and friends arrive as text
        _ => DatabaseValue::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
