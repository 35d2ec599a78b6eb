//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;
use crate::error::ModelError;
use crate::security::quote_identifier;

impl<M> QueryBuilder<M> {
    /// Quote a column reference, recording the error on failure
    pub(crate) fn quoted(&mut self, column: &str) -> Option<String> {
        match quote_identifier(column) {
            Ok(quoted) => Some(quoted),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn comparison(
        &mut self,
        column: &str,
        operator: QueryOperator,
        value: DatabaseValue,
    ) -> Option<WhereFragment> {
        let quoted = self.quoted(column)?;
        Some(WhereFragment {
            sql: format!("{} {} ?", quoted, operator),
            bindings: vec![value],
            columns: vec![column.to_string()],
        })
    }

    fn parse_operator(&mut self, operator: &str) -> Option<QueryOperator> {
        match operator.parse() {
            Ok(op) => Some(op),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    /// Add WHERE condition with an operator given as text, e.g. `">="`
    pub fn where_<T>(mut self, column: &str, operator: &str, value: T) -> Self
    where
        T: Into<DatabaseValue>,
    {
        if let Some(op) = self.parse_operator(operator) {
            self = self.where_op(column, op, value);
        }
        self
    }

    /// Add WHERE condition with a typed operator
    pub fn where_op<T>(mut self, column: &str, operator: QueryOperator, value: T) -> Self
    where
        T: Into<DatabaseValue>,
    {
        if let Some(fragment) = self.comparison(column, operator, value.into()) {
            self.wheres.push(fragment);
        }
        self
    }

    /// Add WHERE condition with equality
    pub fn where_eq<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.where_op(column, QueryOperator::Equal, value)
    }

    pub fn where_ne<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.where_op(column, QueryOperator::NotEqual, value)
    }

    pub fn where_gt<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.where_op(column, QueryOperator::GreaterThan, value)
    }

    pub fn where_gte<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.where_op(column, QueryOperator::GreaterThanOrEqual, value)
    }

    pub fn where_lt<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.where_op(column, QueryOperator::LessThan, value)
    }

    pub fn where_lte<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.where_op(column, QueryOperator::LessThanOrEqual, value)
    }

    /// `column LIKE %value%`
    pub fn like(self, column: &str, value: &str) -> Self {
        self.where_op(column, QueryOperator::Like, format!("%{}%", value))
    }

    /// `column LIKE value%`
    pub fn starts_with(self, column: &str, value: &str) -> Self {
        self.where_op(column, QueryOperator::Like, format!("{}%", value))
    }

    /// `column LIKE %value`
    pub fn ends_with(self, column: &str, value: &str) -> Self {
        self.where_op(column, QueryOperator::Like, format!("%{}", value))
    }

    /// Add WHERE IN condition; an empty list matches nothing
    pub fn where_in<I, T>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DatabaseValue>,
    {
        self.membership(column, values, false)
    }

    /// Add WHERE NOT IN condition; an empty list matches everything
    pub fn where_not_in<I, T>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DatabaseValue>,
    {
        self.membership(column, values, true)
    }

    fn membership<I, T>(mut self, column: &str, values: I, negated: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DatabaseValue>,
    {
        let Some(quoted) = self.quoted(column) else {
            return self;
        };

        let bindings: Vec<DatabaseValue> = values.into_iter().map(Into::into).collect();
        let sql = if bindings.is_empty() {
            let constant = if negated { "1 = 1" } else { "1 = 0" };
            constant.to_string()
        } else {
            let placeholders = vec!["?"; bindings.len()].join(", ");
            let keyword = if negated { "NOT IN" } else { "IN" };
            format!("{} {} ({})", quoted, keyword, placeholders)
        };

        self.wheres.push(WhereFragment {
            sql,
            bindings,
            columns: vec![column.to_string()],
        });
        self
    }

    /// Add WHERE IS NULL condition
    pub fn where_null(mut self, column: &str) -> Self {
        if let Some(quoted) = self.quoted(column) {
            self.wheres.push(WhereFragment {
                sql: format!("{} IS NULL", quoted),
                bindings: Vec::new(),
                columns: vec![column.to_string()],
            });
        }
        self
    }

    /// Add WHERE IS NOT NULL condition
    pub fn where_not_null(mut self, column: &str) -> Self {
        if let Some(quoted) = self.quoted(column) {
            self.wheres.push(WhereFragment {
                sql: format!("{} IS NOT NULL", quoted),
                bindings: Vec::new(),
                columns: vec![column.to_string()],
            });
        }
        self
    }

    /// OR the condition with the most recently added one
    ///
    /// Only the previous fragment is regrouped: `a AND b` followed by
    /// `or_where(c)` reads `a AND (b OR c)`.
    pub fn or_where<T>(mut self, column: &str, operator: &str, value: T) -> Self
    where
        T: Into<DatabaseValue>,
    {
        let Some(op) = self.parse_operator(operator) else {
            return self;
        };
        let Some(new) = self.comparison(column, op, value.into()) else {
            return self;
        };
        let Some(previous) = self.wheres.pop() else {
            self.fail(ModelError::Precondition(
                "or_where requires a preceding where condition".to_string(),
            ));
            return self;
        };

        let mut bindings = previous.bindings;
        bindings.extend(new.bindings);
        let mut columns = previous.columns;
        columns.extend(new.columns);

        self.wheres.push(WhereFragment {
            sql: format!("({} OR {})", previous.sql, new.sql),
            bindings,
            columns,
        });
        self
    }
}
