//! Query Builder - Core builder implementation
//!
//! Every fluent call consumes the builder and hands it back, and terminal
//! calls consume it for good. Fluent calls never fail: the first invalid
//! input is remembered and reported by the terminal call before any SQL is
//! sent.

use std::marker::PhantomData;

use super::types::*;
use crate::error::{ModelError, ModelResult};
pub(crate) use crate::model::core_trait::DELETED_AT;
use crate::model::Model;

/// Query builder for one model's table
#[derive(Debug)]
pub struct QueryBuilder<M> {
    pub(crate) wheres: Vec<WhereFragment>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) order_by: Vec<(String, OrderDirection)>,
    pub(crate) limit_count: Option<u64>,
    pub(crate) offset_value: Option<u64>,
    pub(crate) trashed: TrashedScope,
    pub(crate) error: Option<ModelError>,
    _phantom: PhantomData<fn() -> M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            wheres: self.wheres.clone(),
            joins: self.joins.clone(),
            order_by: self.order_by.clone(),
            limit_count: self.limit_count,
            offset_value: self.offset_value,
            trashed: self.trashed,
            error: self.error.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<M> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QueryBuilder<M> {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            wheres: Vec::new(),
            joins: Vec::new(),
            order_by: Vec::new(),
            limit_count: None,
            offset_value: None,
            trashed: TrashedScope::default(),
            error: None,
            _phantom: PhantomData,
        }
    }

    /// First error recorded by a fluent call, if any
    pub fn error(&self) -> Option<&ModelError> {
        self.error.as_ref()
    }

    pub(crate) fn fail(&mut self, err: ModelError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub(crate) fn check(&self) -> ModelResult<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl<M: Model> QueryBuilder<M> {
    /// Whether any predicate tests this model's own soft-delete column
    ///
    /// `deleted_at` on a joined table does not count.
    pub(crate) fn has_deleted_at_predicate(&self) -> bool {
        self.wheres
            .iter()
            .any(|w| w.references(M::table_name(), DELETED_AT))
    }

    /// Drop predicates that test nothing but this model's `deleted_at`
    fn strip_deleted_at_predicates(&mut self) {
        self.wheres
            .retain(|w| !w.only_references(M::table_name(), DELETED_AT));
    }

    /// Include soft-deleted rows
    pub fn with_trashed(mut self) -> Self {
        if M::uses_soft_deletes() {
            self.strip_deleted_at_predicates();
            self.trashed = TrashedScope::Include;
        }
        self
    }

    /// Restrict to soft-deleted rows
    pub fn only_trashed(mut self) -> Self {
        if !M::uses_soft_deletes() {
            self.fail(ModelError::Configuration(format!(
                "Model for table '{}' does not use soft deletes",
                M::table_name()
            )));
            return self;
        }
        self.strip_deleted_at_predicates();
        self.trashed = TrashedScope::Only;
        self
    }
}
