mod common;

use common::{record, setup, Product};
use mate_orm::{CrudOperations, ModelError, QueryMethods};
use serde_json::json;

async fn seed(db: &mate_orm::Database, count: usize) {
    for i in 0..count {
        Product::create(db, record(json!({"name": format!("item-{:02}", i), "price": i})))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_page_window_and_metadata() {
    let db = setup().await;
    seed(&db, 7).await;

    let page = Product::query()
        .order_by("name", "asc")
        .paginate(&db, 3, 2)
        .await
        .unwrap();

    assert_eq!(page.total, 7);
    assert_eq!(page.per_page, 3);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.last_page, 3);
    assert!(page.has_more_pages());
    let names: Vec<_> = page.data.iter().map(|r| r["name"].clone()).collect();
    assert_eq!(names, vec![json!("item-03"), json!("item-04"), json!("item-05")]);
}

#[tokio::test]
async fn test_last_page_is_full_and_the_next_is_empty() {
    let db = setup().await;
    seed(&db, 7).await;

    let last = Product::paginate(&db, 3, 3).await.unwrap();
    assert_eq!(last.data.len(), 1);
    assert!(!last.has_more_pages());

    let beyond = Product::paginate(&db, 3, last.last_page + 1).await.unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.total, last.total);
}

#[tokio::test]
async fn test_total_follows_predicates_and_trash() {
    let db = setup().await;
    seed(&db, 10).await;
    Product::delete(&db, 10).await.unwrap();

    let page = Product::query()
        .where_gte("price", 5)
        .paginate(&db, 2, 1)
        .await
        .unwrap();
    // prices 5..=8 remain live
    assert_eq!(page.total, 4);
    assert_eq!(page.last_page, 2);
}

#[tokio::test]
async fn test_empty_table() {
    let db = setup().await;

    let page = Product::paginate(&db, 5, 1).await.unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.last_page, 0);
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_bounds_are_validated() {
    let db = setup().await;

    let err = Product::paginate(&db, 0, 1).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    let err = Product::paginate(&db, 10, 0).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

#[tokio::test]
async fn test_page_serializes_for_responses() {
    let db = setup().await;
    seed(&db, 1).await;

    let page = Product::paginate(&db, 10, 1).await.unwrap();
    let body = serde_json::to_value(&page).unwrap();
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["last_page"], json!(1));
    assert_eq!(body["data"][0]["name"], json!("item-00"));
}
