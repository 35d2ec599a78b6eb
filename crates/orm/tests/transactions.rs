mod common;

use common::{id_of, record, setup, Product};
use mate_orm::{CrudOperations, Executor, ModelError, QueryMethods};
use serde_json::json;

#[tokio::test]
async fn test_lock_for_update_then_commit() {
    let db = setup().await;
    let product = Product::create(&db, record(json!({"name": "lamp", "price": 30.0, "stock": 2})))
        .await
        .unwrap();
    let id = id_of(&product);

    let (tx, rows) = Product::lock_for_update(&db, "id", "=", id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["stock"], json!(2));

    let updated = Product::update(&tx, id, record(json!({"stock": 1}))).await.unwrap();
    assert!(updated);
    tx.commit().await.unwrap();

    let stored = Product::find(&db, id).await.unwrap().unwrap();
    assert_eq!(stored["stock"], json!(1));
}

#[tokio::test]
async fn test_rollback_discards_writes() {
    let db = setup().await;
    let product = Product::create(&db, record(json!({"name": "lamp", "stock": 2})))
        .await
        .unwrap();
    let id = id_of(&product);

    let (tx, _) = Product::lock_for_update(&db, "stock", ">", 0).await.unwrap();
    Product::delete(&tx, id).await.unwrap();
    Product::create(&tx, record(json!({"name": "desk"}))).await.unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(Product::count(&db).await.unwrap(), 1);
    assert!(Product::find(&db, id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_lock_for_update_skips_trashed_rows() {
    let db = setup().await;
    let product = Product::create(&db, record(json!({"name": "lamp"}))).await.unwrap();
    Product::delete(&db, id_of(&product)).await.unwrap();

    let (tx, rows) = Product::lock_for_update(&db, "name", "=", "lamp").await.unwrap();
    assert!(rows.is_empty());
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_invalid_lock_query_opens_no_transaction() {
    let db = setup().await;

    let err = Product::lock_for_update(&db, "name", "=~", "lamp").await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    // The single pooled connection is still free
    let (tx, _) = Product::lock_for_update(&db, "name", "=", "lamp").await.unwrap();
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_begin_commit_through_the_handle() {
    let db = setup().await;

    let tx = db.begin().await.unwrap();
    tx.execute("INSERT INTO tags (label) VALUES (?)", &["queued".into()])
        .await
        .unwrap();
    let inside = tx.fetch_all("SELECT * FROM tags", &[]).await.unwrap();
    assert_eq!(inside.len(), 1);
    tx.commit().await.unwrap();

    let outside = db.fetch_all("SELECT * FROM tags", &[]).await.unwrap();
    assert_eq!(outside.len(), 1);
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let db = setup().await;

    {
        let tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO tags (label) VALUES ('lost')", &[])
            .await
            .unwrap();
    }

    let rows = db.fetch_all("SELECT * FROM tags", &[]).await.unwrap();
    assert!(rows.is_empty());
}
