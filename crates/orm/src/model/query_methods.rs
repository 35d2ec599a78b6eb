//! Query Methods - builders, whole-table aggregates and row locking
//!
//! The aggregates here look at the whole table, minus soft-deleted rows.
//! Chain predicates on [`QueryMethods::query`] and call the builder's own
//! aggregates to narrow them.

use serde_json::Value;
use tracing::warn;

use crate::backends::{DatabaseValue, Record};
use crate::database::{Database, Executor};
use crate::error::ModelResult;
use crate::model::core_trait::Model;
use crate::query::{Page, QueryBuilder};
use crate::transaction::Transaction;

/// Trait providing query operations for model collections
#[allow(async_fn_in_trait)]
pub trait QueryMethods: Model {
    /// Get a query builder for this model
    fn query() -> QueryBuilder<Self> {
        QueryBuilder::new()
    }

    /// Start a query with one predicate
    fn where_<T: Into<DatabaseValue>>(column: &str, operator: &str, value: T) -> QueryBuilder<Self> {
        Self::query().where_(column, operator, value)
    }

    async fn count(db: &dyn Executor) -> ModelResult<u64> {
        Self::query().count(db).await
    }

    async fn sum(db: &dyn Executor, column: &str) -> ModelResult<f64> {
        Self::query().sum(db, column).await
    }

    async fn avg(db: &dyn Executor, column: &str) -> ModelResult<Option<f64>> {
        Self::query().avg(db, column).await
    }

    async fn min(db: &dyn Executor, column: &str) -> ModelResult<Option<Value>> {
        Self::query().min(db, column).await
    }

    async fn max(db: &dyn Executor, column: &str) -> ModelResult<Option<Value>> {
        Self::query().max(db, column).await
    }

    /// Page `page` (1-based) of the whole table
    async fn paginate(db: &dyn Executor, per_page: u64, page: u64) -> ModelResult<Page> {
        Self::query().paginate(db, per_page, page).await
    }

    /// Open a transaction and lock the matching rows in it
    ///
    /// The caller finishes the returned transaction. SQLite has no row
    /// locks, so there the rows are read inside the transaction unlocked.
    async fn lock_for_update<T: Into<DatabaseValue>>(
        db: &Database,
        column: &str,
        operator: &str,
        value: T,
    ) -> ModelResult<(Transaction, Vec<Record>)> {
        let (sql, params) = Self::query()
            .where_(column, operator, value)
            .build_select_sql(db.dialect(), true)?;

        let tx = db.begin().await?;
        match tx.fetch_all(&sql, &params).await {
            Ok(rows) => Ok((tx, rows)),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed lock query failed");
                }
                Err(err)
            }
        }
    }
}

// Implement QueryMethods for all types that implement Model
impl<T: Model> QueryMethods for T {}
