//! Query Builder JOIN operations

use super::builder::QueryBuilder;
use super::types::*;
use crate::security::quote_table;

impl<M> QueryBuilder<M> {
    /// Add INNER JOIN to the query
    pub fn join(self, table: &str, left_col: &str, operator: &str, right_col: &str) -> Self {
        self.join_parsed(JoinType::Inner, table, left_col, operator, right_col)
    }

    /// Add LEFT JOIN to the query
    pub fn left_join(self, table: &str, left_col: &str, operator: &str, right_col: &str) -> Self {
        self.join_parsed(JoinType::Left, table, left_col, operator, right_col)
    }

    /// Add RIGHT JOIN to the query
    pub fn right_join(self, table: &str, left_col: &str, operator: &str, right_col: &str) -> Self {
        self.join_parsed(JoinType::Right, table, left_col, operator, right_col)
    }

    fn join_parsed(
        mut self,
        join_type: JoinType,
        table: &str,
        left_col: &str,
        operator: &str,
        right_col: &str,
    ) -> Self {
        match operator.parse::<QueryOperator>() {
            Ok(op) => self.join_with(join_type, table, left_col, op, right_col),
            Err(err) => {
                self.fail(err);
                self
            }
        }
    }

    /// Add a join of any kind with a typed operator
    pub fn join_with(
        mut self,
        join_type: JoinType,
        table: &str,
        left_col: &str,
        operator: QueryOperator,
        right_col: &str,
    ) -> Self {
        let table = match quote_table(table) {
            Ok(table) => table,
            Err(err) => {
                self.fail(err);
                return self;
            }
        };
        let (Some(left), Some(right)) = (self.quoted(left_col), self.quoted(right_col)) else {
            return self;
        };

        self.joins.push(JoinClause {
            join_type,
            table,
            left,
            operator,
            right,
        });
        self
    }
}
