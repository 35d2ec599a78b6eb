//! Query Builder pagination operations

use serde::Serialize;

use super::builder::QueryBuilder;
use crate::backends::Record;
use crate::database::Executor;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;

/// One window of a paginated result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T = Record> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }
}

impl<M> QueryBuilder<M> {
    /// Add LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_count = Some(count);
        self
    }

    /// Add OFFSET clause
    pub fn offset(mut self, count: u64) -> Self {
        self.offset_value = Some(count);
        self
    }
}

impl<M: Model> QueryBuilder<M> {
    /// Fetch page `page` (1-based) of `per_page` rows plus the total count
    pub async fn paginate(
        self,
        db: &dyn Executor,
        per_page: u64,
        page: u64,
    ) -> ModelResult<Page> {
        if per_page == 0 {
            return Err(ModelError::Validation("per_page must be at least 1".to_string()));
        }
        if page == 0 {
            return Err(ModelError::Validation("page must be at least 1".to_string()));
        }
        self.check()?;

        let mut counter = self.clone();
        counter.order_by.clear();
        counter.limit_count = None;
        counter.offset_value = None;
        let total = counter.count(db).await?;

        let data = self
            .limit(per_page)
            .offset((page - 1).saturating_mul(per_page))
            .get(db)
            .await?;

        Ok(Page {
            data,
            total,
            per_page,
            current_page: page,
            last_page: total.div_ceil(per_page),
        })
    }
}
