//! Model System - active record operations for database entities
//!
//! - `core_trait`: the [`Model`] trait describing a table
//! - `crud_operations`: create, read, update, delete, restore
//! - `query_methods`: builders, whole-table aggregates, row locking
//! - `upsert`: first-or-create and update-or-create

pub mod core_trait;
pub mod crud_operations;
pub mod query_methods;
pub mod upsert;

pub use core_trait::{timestamp_now, Model, TIMESTAMP_FORMAT};
pub use crud_operations::CrudOperations;
pub use query_methods::QueryMethods;
pub use upsert::UpsertOperations;

/// Composite trait that includes all model functionality
pub trait ActiveRecord: Model + CrudOperations + QueryMethods + UpsertOperations {}

impl<T> ActiveRecord for T where T: Model + CrudOperations + QueryMethods + UpsertOperations {}
