//! Query Builder SQL generation
//!
//! SELECT statements are compiled from builder state. The INSERT, UPDATE and
//! DELETE statements used by model operations are assembled by the free
//! functions at the bottom of the module.

use super::builder::{QueryBuilder, DELETED_AT};
use super::types::*;
use crate::backends::{DatabaseValue, Record, SqlDialect};
use crate::error::ModelResult;
use crate::model::Model;
use crate::security::{quote_identifier, quote_table};

impl<M: Model> QueryBuilder<M> {
    /// Compile the SELECT for MySQL, without executing it
    pub fn to_sql(&self) -> ModelResult<(String, Vec<DatabaseValue>)> {
        self.to_sql_with_params(SqlDialect::MySql)
    }

    /// Compile the SELECT for `dialect` and return it with its parameters
    pub fn to_sql_with_params(
        &self,
        dialect: SqlDialect,
    ) -> ModelResult<(String, Vec<DatabaseValue>)> {
        self.build_select_sql(dialect, false)
    }

    pub(crate) fn build_select_sql(
        &self,
        dialect: SqlDialect,
        lock_for_update: bool,
    ) -> ModelResult<(String, Vec<DatabaseValue>)> {
        self.check()?;
        let table = quote_table(M::table_name())?;

        let mut sql = format!("SELECT * FROM {}", table);
        let mut params = Vec::new();

        self.build_join_clause(&mut sql);
        self.build_where_clause(&table, &mut sql, &mut params);
        self.build_order_limit_clause(dialect, &mut sql);

        if lock_for_update && dialect.supports_row_locks() {
            sql.push_str(" FOR UPDATE");
        }

        Ok((sql, params))
    }

    /// `SELECT AGG(column) AS aggregate ...` honoring joins and predicates
    pub(crate) fn build_aggregate_sql(
        &self,
        aggregate: Aggregate,
        column: Option<&str>,
    ) -> ModelResult<(String, Vec<DatabaseValue>)> {
        self.check()?;
        let table = quote_table(M::table_name())?;
        let target = match column {
            Some(column) => quote_identifier(column)?,
            None => "*".to_string(),
        };

        let mut sql = format!("SELECT {}({}) AS aggregate FROM {}", aggregate, target, table);
        let mut params = Vec::new();

        self.build_join_clause(&mut sql);
        self.build_where_clause(&table, &mut sql, &mut params);

        Ok((sql, params))
    }

    fn build_join_clause(&self, sql: &mut String) {
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.join_type.to_string());
            sql.push(' ');
            sql.push_str(&join.table);
            sql.push_str(&format!(" ON {} {} {}", join.left, join.operator, join.right));
        }
    }

    fn build_where_clause(&self, table: &str, sql: &mut String, params: &mut Vec<DatabaseValue>) {
        let mut conditions: Vec<&str> = Vec::with_capacity(self.wheres.len() + 1);
        for fragment in &self.wheres {
            conditions.push(&fragment.sql);
            params.extend(fragment.bindings.iter().cloned());
        }

        // Table-qualified so joined tables with their own deleted_at stay unambiguous
        let scope = if M::uses_soft_deletes() {
            match self.trashed {
                TrashedScope::Exclude if !self.has_deleted_at_predicate() => {
                    Some(format!("{}.`{}` IS NULL", table, DELETED_AT))
                }
                TrashedScope::Only => Some(format!("{}.`{}` IS NOT NULL", table, DELETED_AT)),
                _ => None,
            }
        } else {
            None
        };
        if let Some(scope) = &scope {
            conditions.push(scope);
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
    }

    fn build_order_limit_clause(&self, dialect: SqlDialect, sql: &mut String) {
        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        match (self.limit_count, self.offset_value) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(_)) => sql.push_str(&format!(" LIMIT {}", dialect.unbounded_limit())),
            (None, None) => {}
        }

        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
    }
}

/// `INSERT INTO table (...) VALUES (...)` for every column of `values`
pub(crate) fn build_insert_sql(
    dialect: SqlDialect,
    table: &str,
    values: &Record,
) -> ModelResult<(String, Vec<DatabaseValue>)> {
    let table = quote_table(table)?;
    if values.is_empty() {
        return Ok((dialect.insert_default_values(&table), Vec::new()));
    }

    let mut columns = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len());
    for (column, value) in values {
        columns.push(quote_identifier(column)?);
        params.push(DatabaseValue::from(value));
    }

    let placeholders = vec![dialect.parameter_placeholder(); columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    );
    Ok((sql, params))
}

/// `UPDATE table SET ... WHERE pk = ?`; `assignments` must not be empty
pub(crate) fn build_update_sql(
    table: &str,
    primary_key: &str,
    id: &DatabaseValue,
    assignments: &Record,
) -> ModelResult<(String, Vec<DatabaseValue>)> {
    let table = quote_table(table)?;

    let mut sets = Vec::with_capacity(assignments.len());
    let mut params = Vec::with_capacity(assignments.len() + 1);
    for (column, value) in assignments {
        sets.push(format!("{} = ?", quote_identifier(column)?));
        params.push(DatabaseValue::from(value));
    }
    params.push(id.clone());

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        sets.join(", "),
        quote_identifier(primary_key)?
    );
    Ok((sql, params))
}

/// `DELETE FROM table WHERE pk = ?`
pub(crate) fn build_delete_sql(table: &str, primary_key: &str) -> ModelResult<String> {
    Ok(format!(
        "DELETE FROM {} WHERE {} = ?",
        quote_table(table)?,
        quote_identifier(primary_key)?
    ))
}
