//! Query Builder Module - fluent, value-semantics query builder

pub mod builder;
pub mod execution;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use pagination::Page;
pub use types::{Aggregate, JoinType, OrderDirection, QueryOperator, TrashedScope};
