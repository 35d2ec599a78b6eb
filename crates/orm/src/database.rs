//! Database handle and connection provider
//!
//! [`Database`] is the shared, cheaply cloneable handle every model
//! operation runs against. [`ConnectionProvider`] opens it lazily on first
//! use and hands the same handle out for the rest of the process.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::backends::{DatabaseConnection, DatabaseValue, ExecuteResult, Record, SqlDialect};
use crate::config::DatabaseConfig;
use crate::error::OrmResult;
use crate::events::EventRegistry;
use crate::transaction::Transaction;

/// Anything that can run a statement: the shared [`Database`] or an open
/// [`Transaction`]
#[async_trait]
pub trait Executor: Send + Sync {
    fn dialect(&self) -> SqlDialect;

    /// Lifecycle callbacks fired by model operations on this executor
    fn events(&self) -> &EventRegistry;

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult>;

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>>;
}

pub(crate) fn log_statement<T>(sql: &str, params: &[DatabaseValue], result: &OrmResult<T>) {
    match result {
        Ok(_) => debug!(sql, params = params.len(), "statement executed"),
        Err(err) => error!(sql, params = params.len(), error = %err, "statement failed"),
    }
}

/// Shared database handle
#[derive(Clone)]
pub struct Database {
    connection: Arc<dyn DatabaseConnection>,
    events: Arc<EventRegistry>,
}

impl Database {
    /// Open a connection with no lifecycle callbacks registered
    pub async fn connect(config: &DatabaseConfig) -> OrmResult<Self> {
        Self::connect_with_events(config, EventRegistry::new()).await
    }

    pub async fn connect_with_events(
        config: &DatabaseConfig,
        events: EventRegistry,
    ) -> OrmResult<Self> {
        Self::open(config, Arc::new(events)).await
    }

    async fn open(config: &DatabaseConfig, events: Arc<EventRegistry>) -> OrmResult<Self> {
        config.validate()?;

        let connection = config.backend.backend().connect(config).await?;
        info!(backend = %config.backend, "database connection established");

        Ok(Self {
            connection: Arc::from(connection),
            events,
        })
    }

    /// Wrap an already opened connection
    pub fn from_connection(connection: Arc<dyn DatabaseConnection>, events: EventRegistry) -> Self {
        Self {
            connection,
            events: Arc::new(events),
        }
    }

    /// Begin a transaction on the shared connection
    pub async fn begin(&self) -> OrmResult<Transaction> {
        let inner = self.connection.begin_transaction().await?;
        debug!("transaction started");
        Ok(Transaction::new(inner, self.connection.dialect(), self.events.clone()))
    }

    pub async fn close(&self) -> OrmResult<()> {
        self.connection.close().await?;
        info!("database connection closed");
        Ok(())
    }
}

#[async_trait]
impl Executor for Database {
    fn dialect(&self) -> SqlDialect {
        self.connection.dialect()
    }

    fn events(&self) -> &EventRegistry {
        &self.events
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult> {
        let result = self.connection.execute(sql, params).await;
        log_statement(sql, params, &result);
        result
    }

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>> {
        let result = self.connection.fetch_all(sql, params).await;
        log_statement(sql, params, &result);
        result
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.connection.dialect())
            .field("events", &self.events)
            .finish()
    }
}

/// Opens the process-wide [`Database`] on first use
pub struct ConnectionProvider {
    config: DatabaseConfig,
    events: Arc<EventRegistry>,
    database: OnceCell<Database>,
}

impl ConnectionProvider {
    pub fn new(config: DatabaseConfig, events: EventRegistry) -> Self {
        Self {
            config,
            events: Arc::new(events),
            database: OnceCell::new(),
        }
    }

    /// Provider configured from `DATABASE_URL` / `DB_*` variables
    pub fn from_env(events: EventRegistry) -> OrmResult<Self> {
        Ok(Self::new(DatabaseConfig::from_env()?, events))
    }

    /// The shared handle, connecting on the first call
    ///
    /// A failed connection attempt is not cached; the next call retries.
    pub async fn get(&self) -> OrmResult<&Database> {
        self.database
            .get_or_try_init(|| async {
                debug!(backend = %self.config.backend, "opening shared database handle");
                Database::open(&self.config, self.events.clone()).await
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.database.initialized()
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}
