//! Query Builder ORDER BY operations

use super::builder::QueryBuilder;
use super::types::*;

impl<M> QueryBuilder<M> {
    /// Add ORDER BY clause; `direction` is `asc` or `desc` in any case
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        match direction.parse::<OrderDirection>() {
            Ok(direction) => self.order_by_direction(column, direction),
            Err(err) => {
                self.fail(err);
                self
            }
        }
    }

    pub fn order_by_direction(mut self, column: &str, direction: OrderDirection) -> Self {
        if let Some(quoted) = self.quoted(column) {
            self.order_by.push((quoted, direction));
        }
        self
    }

    /// Add ORDER BY clause (ascending)
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by_direction(column, OrderDirection::Asc)
    }

    /// Add ORDER BY clause (descending)
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by_direction(column, OrderDirection::Desc)
    }
}
