//! Core Model Trait - table metadata for database entities
//!
//! A model is a marker type describing one table. Rows travel as
//! [`Record`](crate::backends::Record)s, so the trait only carries the
//! metadata the operations need.

/// Timestamp format written to `created_at`, `updated_at` and `deleted_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const DELETED_AT: &str = "deleted_at";

/// Core trait for database models
pub trait Model: Sized + Send + Sync + 'static {
    /// Table name for this model
    fn table_name() -> &'static str;

    /// Columns mass assignment may write; everything else is dropped
    fn fillable() -> &'static [&'static str] {
        &[]
    }

    /// Primary key field name
    fn primary_key_name() -> &'static str {
        "id"
    }

    /// Check if this model uses timestamps (created_at, updated_at)
    fn uses_timestamps() -> bool {
        false
    }

    /// Check if this model supports soft deletes
    fn uses_soft_deletes() -> bool {
        false
    }
}

/// Current time in [`TIMESTAMP_FORMAT`]
pub fn timestamp_now() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}
