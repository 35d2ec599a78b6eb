//! Shared fixtures: an in-memory SQLite database and a few models

#![allow(dead_code)]

use mate_orm::{Database, DatabaseConfig, EventRegistry, Executor, Model, Record};
use serde_json::Value;

/// Soft-deleting model with timestamps
pub struct User;

impl Model for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn fillable() -> &'static [&'static str] {
        &["name", "email"]
    }

    fn uses_timestamps() -> bool {
        true
    }

    fn uses_soft_deletes() -> bool {
        true
    }
}

/// Soft-deleting model without timestamps, used for aggregates
pub struct Product;

impl Model for Product {
    fn table_name() -> &'static str {
        "products"
    }

    fn fillable() -> &'static [&'static str] {
        &["name", "price", "stock"]
    }

    fn uses_soft_deletes() -> bool {
        true
    }
}

/// Plain model: hard deletes, no timestamps
pub struct Tag;

impl Model for Tag {
    fn table_name() -> &'static str {
        "tags"
    }

    fn fillable() -> &'static [&'static str] {
        &["label"]
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        email TEXT UNIQUE,
        is_admin INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        deleted_at TEXT
    )",
    "CREATE TABLE products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price REAL NOT NULL DEFAULT 0,
        stock INTEGER NOT NULL DEFAULT 0,
        deleted_at TEXT
    )",
    "CREATE TABLE tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        label TEXT
    )",
];

pub async fn setup() -> Database {
    setup_with_events(EventRegistry::new()).await
}

pub async fn setup_with_events(events: EventRegistry) -> Database {
    let db = Database::connect_with_events(&DatabaseConfig::sqlite_memory(), events)
        .await
        .expect("in-memory database");

    for statement in SCHEMA {
        db.execute(statement, &[]).await.expect("schema");
    }
    db
}

/// Build a record from a `json!` object literal
pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("object literal")
}

pub fn id_of(record: &Record) -> i64 {
    record["id"].as_i64().expect("numeric id")
}
