//! Find-or-write helpers built on the CRUD operations

use serde_json::Value;

use crate::backends::{DatabaseValue, Record};
use crate::database::Executor;
use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::Model;
use crate::model::crud_operations::CrudOperations;
use crate::model::query_methods::QueryMethods;
use crate::query::QueryBuilder;

#[allow(async_fn_in_trait)]
pub trait UpsertOperations: Model {
    /// First live row matching every attribute, or a new row built from
    /// `attributes` and `extra`
    async fn first_or_create(
        db: &dyn Executor,
        attributes: Record,
        extra: Record,
    ) -> ModelResult<Record> {
        if let Some(existing) = matching::<Self>(&attributes).first(db).await? {
            return Ok(existing);
        }

        let mut data = attributes;
        data.extend(extra);
        Self::create(db, data).await
    }

    /// Update the first row matching every attribute with `values`, or
    /// create it from `attributes` and `values`
    async fn update_or_create(
        db: &dyn Executor,
        attributes: Record,
        values: Record,
    ) -> ModelResult<Record> {
        let Some(existing) = matching::<Self>(&attributes).first(db).await? else {
            let mut data = attributes;
            data.extend(values);
            return Self::create(db, data).await;
        };

        let id = existing
            .get(Self::primary_key_name())
            .map(DatabaseValue::from)
            .ok_or_else(|| {
                ModelError::Configuration(format!(
                    "Rows of '{}' carry no '{}' column",
                    Self::table_name(),
                    Self::primary_key_name()
                ))
            })?;

        Self::update(db, id.clone(), values.clone()).await?;

        let refreshed = Self::query()
            .where_eq(Self::primary_key_name(), id)
            .first(db)
            .await?;
        Ok(refreshed.unwrap_or_else(|| {
            let mut merged = existing;
            merged.extend(values);
            merged
        }))
    }
}

impl<T: Model> UpsertOperations for T {}

/// Builder ANDing `column = value` for every attribute, `IS NULL` for nulls
fn matching<M: Model>(attributes: &Record) -> QueryBuilder<M> {
    attributes
        .iter()
        .fold(M::query(), |query, (column, value)| match value {
            Value::Null => query.where_null(column),
            value => query.where_eq(column, value),
        })
}
