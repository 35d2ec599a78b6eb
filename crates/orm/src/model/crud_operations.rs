//! CRUD Operations - Create, Read, Update, Delete operations for models
//!
//! Mass assignment goes through the fillable allow-list. Lifecycle events
//! fire around every write: a failing `*ing` callback aborts before the
//! statement runs, a failing `*ed` callback is reported after it has run.

use serde_json::Value;
use tracing::debug;

use crate::backends::{DatabaseValue, Record};
use crate::database::Executor;
use crate::error::{ModelError, ModelResult};
use crate::events::ModelEvent;
use crate::model::core_trait::{timestamp_now, Model, CREATED_AT, DELETED_AT, UPDATED_AT};
use crate::model::query_methods::QueryMethods;
use crate::query::sql_generation::{build_delete_sql, build_insert_sql, build_update_sql};

/// Trait providing CRUD operations for models
#[allow(async_fn_in_trait)]
pub trait CrudOperations: Model {
    /// Every live row of the table
    async fn all(db: &dyn Executor) -> ModelResult<Vec<Record>> {
        Self::query().get(db).await
    }

    /// Find a row by its primary key; soft-deleted rows are not found
    async fn find(db: &dyn Executor, id: impl Into<DatabaseValue>) -> ModelResult<Option<Record>> {
        Self::query()
            .where_eq(Self::primary_key_name(), id)
            .first(db)
            .await
    }

    /// Insert the fillable part of `data` and return the stored fields
    ///
    /// The result holds the generated primary key, the fillable fields that
    /// were supplied and, when enabled, both timestamps.
    async fn create(db: &dyn Executor, data: Record) -> ModelResult<Record> {
        let mut payload = data;
        db.events().fire::<Self>(ModelEvent::Creating, &mut payload)?;

        let mut values = fillable_subset::<Self>(&payload);
        if Self::uses_timestamps() {
            let now = timestamp_now();
            values.insert(CREATED_AT.to_string(), Value::String(now.clone()));
            values.insert(UPDATED_AT.to_string(), Value::String(now));
        }

        let (sql, params) = build_insert_sql(db.dialect(), Self::table_name(), &values)?;
        let result = db.execute(&sql, &params).await?;

        let mut record = Record::new();
        if let Some(id) = result.last_insert_id {
            record.insert(Self::primary_key_name().to_string(), Value::from(id));
        }
        record.extend(values);
        debug!(table = Self::table_name(), "record created");

        db.events().fire::<Self>(ModelEvent::Created, &mut record)?;
        Ok(record)
    }

    /// Update the fillable part of `data` on row `id`
    ///
    /// Returns `false` without touching the database when `data` carries no
    /// fillable field, otherwise whether a row was affected.
    async fn update(
        db: &dyn Executor,
        id: impl Into<DatabaseValue>,
        data: Record,
    ) -> ModelResult<bool> {
        let id = id.into();
        let mut payload = data;
        payload
            .entry(Self::primary_key_name())
            .or_insert_with(|| id.to_json());
        db.events().fire::<Self>(ModelEvent::Updating, &mut payload)?;

        let mut assignments = fillable_subset::<Self>(&payload);
        if assignments.is_empty() {
            debug!(table = Self::table_name(), "update skipped, no fillable fields");
            return Ok(false);
        }
        if Self::uses_timestamps() {
            assignments.insert(UPDATED_AT.to_string(), Value::String(timestamp_now()));
        }

        let (sql, params) =
            build_update_sql(Self::table_name(), Self::primary_key_name(), &id, &assignments)?;
        let result = db.execute(&sql, &params).await?;
        let updated = result.rows_affected > 0;

        if updated {
            let mut record = assignments;
            record.insert(Self::primary_key_name().to_string(), id.to_json());
            db.events().fire::<Self>(ModelEvent::Updated, &mut record)?;
        }
        Ok(updated)
    }

    /// Delete row `id`; soft-deleting models only stamp `deleted_at`
    async fn delete(db: &dyn Executor, id: impl Into<DatabaseValue>) -> ModelResult<bool> {
        let id = id.into();
        if !Self::uses_soft_deletes() {
            return hard_delete::<Self>(db, id).await;
        }

        let mut payload = snapshot::<Self>(db, &id).await?;
        db.events().fire::<Self>(ModelEvent::Deleting, &mut payload)?;

        let now = timestamp_now();
        let mut columns = Record::new();
        columns.insert(DELETED_AT.to_string(), Value::String(now.clone()));
        if Self::uses_timestamps() {
            columns.insert(UPDATED_AT.to_string(), Value::String(now));
        }

        let deleted = write_columns::<Self>(db, &id, &columns).await?;
        if deleted {
            payload.extend(columns);
            db.events().fire::<Self>(ModelEvent::Deleted, &mut payload)?;
        }
        Ok(deleted)
    }

    /// Bring a soft-deleted row back
    async fn restore(db: &dyn Executor, id: impl Into<DatabaseValue>) -> ModelResult<bool> {
        if !Self::uses_soft_deletes() {
            return Err(ModelError::Configuration(format!(
                "Model for table '{}' does not use soft deletes",
                Self::table_name()
            )));
        }

        let id = id.into();
        let mut payload = snapshot::<Self>(db, &id).await?;
        db.events().fire::<Self>(ModelEvent::Restoring, &mut payload)?;

        let mut columns = Record::new();
        columns.insert(DELETED_AT.to_string(), Value::Null);
        if Self::uses_timestamps() {
            columns.insert(UPDATED_AT.to_string(), Value::String(timestamp_now()));
        }

        let restored = write_columns::<Self>(db, &id, &columns).await?;
        if restored {
            payload.extend(columns);
            db.events().fire::<Self>(ModelEvent::Restored, &mut payload)?;
        }
        Ok(restored)
    }

    /// Remove row `id` for good, soft deletes or not
    async fn force_delete(db: &dyn Executor, id: impl Into<DatabaseValue>) -> ModelResult<bool> {
        hard_delete::<Self>(db, id.into()).await
    }
}

// Implement CrudOperations for all types that implement Model
impl<T: Model> CrudOperations for T {}

/// Fields of `payload` on the allow-list, in allow-list order
pub(crate) fn fillable_subset<M: Model>(payload: &Record) -> Record {
    M::fillable()
        .iter()
        .filter_map(|field| {
            payload
                .get(*field)
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect()
}

/// The row as callbacks see it, trashed or not, or just its key when gone
async fn snapshot<M: Model>(db: &dyn Executor, id: &DatabaseValue) -> ModelResult<Record> {
    let row = M::query()
        .with_trashed()
        .where_eq(M::primary_key_name(), id.clone())
        .first(db)
        .await?;

    Ok(row.unwrap_or_else(|| {
        let mut record = Record::new();
        record.insert(M::primary_key_name().to_string(), id.to_json());
        record
    }))
}

/// Write bookkeeping columns directly, skipping the allow-list and the
/// update events
async fn write_columns<M: Model>(
    db: &dyn Executor,
    id: &DatabaseValue,
    columns: &Record,
) -> ModelResult<bool> {
    let (sql, params) = build_update_sql(M::table_name(), M::primary_key_name(), id, columns)?;
    let result = db.execute(&sql, &params).await?;
    Ok(result.rows_affected > 0)
}

async fn hard_delete<M: Model>(db: &dyn Executor, id: DatabaseValue) -> ModelResult<bool> {
    let mut payload = snapshot::<M>(db, &id).await?;
    db.events().fire::<M>(ModelEvent::Deleting, &mut payload)?;

    let sql = build_delete_sql(M::table_name(), M::primary_key_name())?;
    let result = db.execute(&sql, &[id]).await?;
    let deleted = result.rows_affected > 0;

    if deleted {
        db.events().fire::<M>(ModelEvent::Deleted, &mut payload)?;
    }
    Ok(deleted)
}
