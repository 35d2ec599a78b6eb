//! Core Database Backend Traits
//!
//! The ORM never talks to a driver directly. It compiles SQL plus an ordered
//! list of [`DatabaseValue`] parameters and hands them to a
//! [`DatabaseConnection`] or an open [`DatabaseTransaction`]. Rows come back
//! as [`Record`]s, plain column to value maps.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::DatabaseConfig;
use crate::error::OrmResult;

/// One row, keyed by column name
pub type Record = serde_json::Map<String, JsonValue>;

/// Outcome of a statement that does not return rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteResult {
    pub rows_affected: u64,
    /// Auto-increment id generated by an INSERT, when the driver reports one
    pub last_insert_id: Option<i64>,
}

/// Abstract database connection trait
///
/// Implementations serialize access to the underlying handle themselves, so
/// one instance can be shared across tasks behind an `Arc`.
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// SQL dialect spoken by this connection
    fn dialect(&self) -> SqlDialect;

    /// Execute a statement and report affected rows and generated id
    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult>;

    /// Execute a query and return every row
    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>>;

    /// Begin a transaction
    async fn begin_transaction(&self) -> OrmResult<Box<dyn DatabaseTransaction>>;

    /// Close the connection
    async fn close(&self) -> OrmResult<()>;
}

/// Abstract database transaction trait
#[async_trait]
pub trait DatabaseTransaction: Send {
    /// Execute a statement within the transaction
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult>;

    /// Execute a query and return every row within the transaction
    async fn fetch_all(&mut self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>>;

    /// Commit the transaction
    async fn commit(self: Box<Self>) -> OrmResult<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> OrmResult<()>;
}

/// A driver able to open connections from a [`DatabaseConfig`]
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Open the shared connection handle
    async fn connect(&self, config: &DatabaseConfig) -> OrmResult<Box<dyn DatabaseConnection>>;

    /// Get the SQL dialect for this backend
    fn sql_dialect(&self) -> SqlDialect;

    /// Get the backend type
    fn backend_type(&self) -> crate::backends::DatabaseBackendType;
}

/// Database value enumeration for type-safe parameter binding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int64(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::Array(
                b.iter()
                    .map(|&x| JsonValue::Number(serde_json::Number::from(x)))
                    .collect(),
            ),
            DatabaseValue::Json(j) => j.clone(),
        }
    }

    /// Create DatabaseValue from JSON value
    ///
    /// Strings stay strings; arrays and objects are bound as JSON documents.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => DatabaseValue::Null,
            JsonValue::Bool(b) => DatabaseValue::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DatabaseValue::Int64(i)
                } else if let Some(f) = n.as_f64() {
                    DatabaseValue::Float64(f)
                } else {
                    DatabaseValue::Null
                }
            }
            JsonValue::String(s) => DatabaseValue::String(s),
            other @ (JsonValue::Array(_) | JsonValue::Object(_)) => DatabaseValue::Json(other),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DatabaseValue {
                fn from(value: $ty) -> Self {
                    DatabaseValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i16 => Int64,
    i32 => Int64,
    i64 => Int64,
    u16 => Int64,
    u32 => Int64,
    f32 => Float64,
    f64 => Float64,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::from_json(value)
    }
}

impl From<&JsonValue> for DatabaseValue {
    fn from(value: &JsonValue) -> Self {
        DatabaseValue::from_json(value.clone())
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// SQL dialect enumeration for generating database-specific SQL
///
/// Both supported dialects take `?` placeholders and backtick-quoted
/// identifiers; they differ in row locking and unbounded LIMIT syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    MySql,
    Sqlite,
}

impl SqlDialect {
    /// Get the parameter placeholder for this dialect
    pub fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Whether `SELECT ... FOR UPDATE` is understood
    pub fn supports_row_locks(&self) -> bool {
        matches!(self, SqlDialect::MySql)
    }

    /// LIMIT value meaning "no limit", needed when only OFFSET is set
    pub fn unbounded_limit(&self) -> &'static str {
        match self {
            SqlDialect::MySql => "18446744073709551615",
            SqlDialect::Sqlite => "-1",
        }
    }

    /// INSERT statement for a row that supplies no columns
    pub fn insert_default_values(&self, quoted_table: &str) -> String {
        match self {
            SqlDialect::MySql => format!("INSERT INTO {} () VALUES ()", quoted_table),
            SqlDialect::Sqlite => format!("INSERT INTO {} DEFAULT VALUES", quoted_table),
        }
    }
}
