//! Query Builder execution for Model types

use serde_json::Value;

use super::builder::QueryBuilder;
use super::types::Aggregate;
use crate::backends::Record;
use crate::database::Executor;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;

impl<M: Model> QueryBuilder<M> {
    /// Execute query and return the matching rows
    pub async fn get(self, db: &dyn Executor) -> ModelResult<Vec<Record>> {
        let (sql, params) = self.build_select_sql(db.dialect(), false)?;
        db.fetch_all(&sql, &params).await
    }

    /// Execute query and return the first row
    pub async fn first(self, db: &dyn Executor) -> ModelResult<Option<Record>> {
        let rows = self.limit(1).get(db).await?;
        Ok(rows.into_iter().next())
    }

    /// Count matching rows
    pub async fn count(self, db: &dyn Executor) -> ModelResult<u64> {
        let value = self.aggregate(db, Aggregate::Count, None).await?;
        match value.as_ref().and_then(value_as_f64) {
            Some(count) => Ok(count as u64),
            None => Err(ModelError::Serialization(format!(
                "COUNT returned a non-numeric value: {:?}",
                value
            ))),
        }
    }

    /// Sum of `column` over matching rows, 0 when none match
    pub async fn sum(self, db: &dyn Executor, column: &str) -> ModelResult<f64> {
        let value = self.aggregate(db, Aggregate::Sum, Some(column)).await?;
        Ok(value.as_ref().and_then(value_as_f64).unwrap_or(0.0))
    }

    /// Average of `column`, `None` when no row matches
    pub async fn avg(self, db: &dyn Executor, column: &str) -> ModelResult<Option<f64>> {
        let value = self.aggregate(db, Aggregate::Avg, Some(column)).await?;
        Ok(value.as_ref().and_then(value_as_f64))
    }

    /// Smallest value of `column`, as stored
    pub async fn min(self, db: &dyn Executor, column: &str) -> ModelResult<Option<Value>> {
        self.aggregate(db, Aggregate::Min, Some(column)).await
    }

    /// Largest value of `column`, as stored
    pub async fn max(self, db: &dyn Executor, column: &str) -> ModelResult<Option<Value>> {
        self.aggregate(db, Aggregate::Max, Some(column)).await
    }

    async fn aggregate(
        self,
        db: &dyn Executor,
        aggregate: Aggregate,
        column: Option<&str>,
    ) -> ModelResult<Option<Value>> {
        let (sql, params) = self.build_aggregate_sql(aggregate, column)?;
        let rows = db.fetch_all(&sql, &params).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|mut row| row.remove("aggregate"))
            .filter(|value| !value.is_null()))
    }
}

/// Numeric view of an aggregate; MySQL hands DECIMAL results back as text
fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
