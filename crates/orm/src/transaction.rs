//! Transaction Management
//!
//! A [`Transaction`] is an [`Executor`] of its own, so model operations can
//! run inside it. It must be finished with [`Transaction::commit`] or
//! [`Transaction::rollback`]; dropping it lets the driver roll back.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backends::{DatabaseTransaction, DatabaseValue, ExecuteResult, Record, SqlDialect};
use crate::database::{log_statement, Executor};
use crate::error::{ModelError, OrmResult};
use crate::events::EventRegistry;

pub struct Transaction {
    inner: Mutex<Option<Box<dyn DatabaseTransaction>>>,
    dialect: SqlDialect,
    events: Arc<EventRegistry>,
}

impl Transaction {
    pub(crate) fn new(
        inner: Box<dyn DatabaseTransaction>,
        dialect: SqlDialect,
        events: Arc<EventRegistry>,
    ) -> Self {
        Self {
            inner: Mutex::new(Some(inner)),
            dialect,
            events,
        }
    }

    fn take(&mut self) -> OrmResult<Box<dyn DatabaseTransaction>> {
        self.inner
            .get_mut()
            .take()
            .ok_or_else(|| ModelError::Transaction("Transaction already completed".to_string()))
    }

    pub async fn commit(mut self) -> OrmResult<()> {
        debug!("Committing transaction");
        self.take()?.commit().await?;
        debug!("Transaction committed successfully");
        Ok(())
    }

    pub async fn rollback(mut self) -> OrmResult<()> {
        debug!("Rolling back transaction");
        self.take()?.rollback().await?;
        debug!("Transaction rolled back successfully");
        Ok(())
    }
}

#[async_trait]
impl Executor for Transaction {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn events(&self) -> &EventRegistry {
        &self.events
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<ExecuteResult> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| ModelError::Transaction("Transaction already completed".to_string()))?;

        let result = tx.execute(sql, params).await;
        log_statement(sql, params, &result);
        result
    }

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<Record>> {
        let mut guard = self.inner.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| ModelError::Transaction("Transaction already completed".to_string()))?;

        let result = tx.fetch_all(sql, params).await;
        log_statement(sql, params, &result);
        result
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.inner.get_mut().is_some() {
            warn!("Transaction dropped without explicit commit or rollback, the driver will roll it back");
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}
