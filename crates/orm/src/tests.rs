//! SQL compilation tests for the query builder
//!
//! Nothing here touches a database: builders are compiled with
//! `to_sql_with_params` and the text and parameters are checked.

use crate::backends::{DatabaseValue, SqlDialect};
use crate::error::ModelError;
use crate::model::{Model, QueryMethods};
use crate::query::{JoinType, QueryBuilder, QueryOperator};

/// Soft-deleting model with timestamps
struct TestUser;

impl Model for TestUser {
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

/// Plain model without soft deletes
struct TestPost;

impl Model for TestPost {
    fn table_name() -> &'static str {
        "posts"
    }
}

/// Model whose table name cannot be quoted
struct BrokenModel;

impl Model for BrokenModel {
    fn table_name() -> &'static str {
        "users; DROP TABLE users"
    }
}

fn mysql<M: Model>(query: QueryBuilder<M>) -> (String, Vec<DatabaseValue>) {
    query.to_sql_with_params(SqlDialect::MySql).unwrap()
}

#[test]
fn test_plain_select() {
    let (sql, params) = mysql(TestPost::query());
    assert_eq!(sql, "SELECT * FROM `posts`");
    assert!(params.is_empty());
}

#[test]
fn test_soft_delete_scope_is_implicit() {
    let (sql, _) = mysql(TestUser::query());
    assert_eq!(sql, "SELECT * FROM `users` WHERE `users`.`deleted_at` IS NULL");
}

#[test]
fn test_predicates_are_anded_in_call_order() {
    let (sql, params) = mysql(
        TestUser::query()
            .where_("age", ">=", 18)
            .where_eq("status", "active")
            .where_null("banned_at"),
    );
    assert_eq!(
        sql,
        "SELECT * FROM `users` WHERE `age` >= ? AND `status` = ? AND `banned_at` IS NULL \
         AND `users`.`deleted_at` IS NULL"
    );
    assert_eq!(
        params,
        vec![DatabaseValue::Int64(18), DatabaseValue::String("active".to_string())]
    );
}

#[test]
fn test_like_helpers_wrap_the_value() {
    let (sql, params) = mysql(
        TestPost::query()
            .like("title", "rust")
            .starts_with("slug", "intro")
            .ends_with("email", "@example.com"),
    );
    assert_eq!(
        sql,
        "SELECT * FROM `posts` WHERE `title` LIKE ? AND `slug` LIKE ? AND `email` LIKE ?"
    );
    assert_eq!(
        params,
        vec![
            DatabaseValue::from("%rust%"),
            DatabaseValue::from("intro%"),
            DatabaseValue::from("%@example.com"),
        ]
    );
}

#[test]
fn test_where_in_binds_one_placeholder_per_value() {
    let (sql, params) = mysql(TestPost::query().where_in("id", vec![1, 2, 3]));
    assert_eq!(sql, "SELECT * FROM `posts` WHERE `id` IN (?, ?, ?)");
    assert_eq!(params.len(), 3);

    let (sql, _) = mysql(TestPost::query().where_not_in("id", vec![7]));
    assert_eq!(sql, "SELECT * FROM `posts` WHERE `id` NOT IN (?)");
}

#[test]
fn test_empty_membership_lists_stay_valid() {
    let (sql, params) = mysql(TestPost::query().where_in("id", Vec::<i64>::new()));
    assert_eq!(sql, "SELECT * FROM `posts` WHERE 1 = 0");
    assert!(params.is_empty());

    let (sql, _) = mysql(TestPost::query().where_not_in("id", Vec::<i64>::new()));
    assert_eq!(sql, "SELECT * FROM `posts` WHERE 1 = 1");
}

#[test]
fn test_or_where_regroups_the_previous_predicate() {
    let (sql, params) = mysql(
        TestPost::query()
            .where_eq("published", true)
            .where_eq("author_id", 1)
            .or_where("author_id", "=", 2),
    );
    assert_eq!(
        sql,
        "SELECT * FROM `posts` WHERE `published` = ? AND (`author_id` = ? OR `author_id` = ?)"
    );
    assert_eq!(
        params,
        vec![
            DatabaseValue::Bool(true),
            DatabaseValue::Int64(1),
            DatabaseValue::Int64(2)
        ]
    );
}

#[test]
fn test_or_where_without_predicate_is_a_precondition_error() {
    let query = TestPost::query().or_where("id", "=", 1).where_eq("id", 2);
    let err = query.to_sql_with_params(SqlDialect::MySql).unwrap_err();
    assert!(matches!(err, ModelError::Precondition(_)));
}

#[test]
fn test_invalid_input_surfaces_at_compile_time() {
    let err = TestPost::query()
        .where_("id", "= 1 OR 1 =", 1)
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    let err = TestPost::query()
        .where_eq("id`; DROP TABLE posts; --", 1)
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    let err = TestPost::query().order_by("id", "sideways").to_sql().unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));

    let err = BrokenModel::query().to_sql().unwrap_err();
    assert!(matches!(err, ModelError::Configuration(_)));
}

#[test]
fn test_first_error_wins() {
    let query = TestPost::query()
        .order_by("id", "up")
        .where_("id", "~", 1);
    let err = query.error().cloned().unwrap();
    assert!(err.to_string().contains("order direction"));
}

#[test]
fn test_joins_precede_where_and_keep_call_order() {
    let (sql, _) = mysql(
        TestUser::query()
            .join("posts", "posts.user_id", "=", "users.id")
            .left_join("profiles", "profiles.user_id", "=", "users.id")
            .join_with(
                JoinType::Right,
                "teams",
                "teams.id",
                QueryOperator::Equal,
                "users.team_id",
            )
            .where_eq("posts.published", true),
    );
    assert_eq!(
        sql,
        "SELECT * FROM `users` \
         INNER JOIN `posts` ON `posts`.`user_id` = `users`.`id` \
         LEFT JOIN `profiles` ON `profiles`.`user_id` = `users`.`id` \
         RIGHT JOIN `teams` ON `teams`.`id` = `users`.`team_id` \
         WHERE `posts`.`published` = ? AND `users`.`deleted_at` IS NULL"
    );
}

#[test]
fn test_order_limit_offset() {
    let (sql, _) = mysql(
        TestPost::query()
            .order_by("created_at", "DESC")
            .order_by_asc("id")
            .limit(10)
            .offset(20),
    );
    assert_eq!(
        sql,
        "SELECT * FROM `posts` ORDER BY `created_at` DESC, `id` ASC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_offset_without_limit_uses_unbounded_limit() {
    let query = TestPost::query().offset(5);
    let (sql, _) = query.to_sql_with_params(SqlDialect::MySql).unwrap();
    assert_eq!(sql, "SELECT * FROM `posts` LIMIT 18446744073709551615 OFFSET 5");

    let (sql, _) = query.to_sql_with_params(SqlDialect::Sqlite).unwrap();
    assert_eq!(sql, "SELECT * FROM `posts` LIMIT -1 OFFSET 5");
}

#[test]
fn test_explicit_deleted_at_predicate_replaces_scope() {
    let (sql, _) = mysql(TestUser::query().where_not_null("deleted_at"));
    assert_eq!(sql, "SELECT * FROM `users` WHERE `deleted_at` IS NOT NULL");

    let (sql, _) = mysql(TestUser::query().where_null("users.deleted_at"));
    assert_eq!(sql, "SELECT * FROM `users` WHERE `users`.`deleted_at` IS NULL");
}

#[test]
fn test_with_trashed_drops_every_deleted_at_predicate() {
    let (sql, _) = mysql(
        TestUser::query()
            .where_null("deleted_at")
            .where_eq("id", 1)
            .with_trashed(),
    );
    assert_eq!(sql, "SELECT * FROM `users` WHERE `id` = ?");
}

#[test]
fn test_only_trashed() {
    let (sql, params) = mysql(TestUser::query().where_eq("id", 3).only_trashed());
    assert_eq!(
        sql,
        "SELECT * FROM `users` WHERE `id` = ? AND `users`.`deleted_at` IS NOT NULL"
    );
    assert_eq!(params, vec![DatabaseValue::Int64(3)]);
}

#[test]
fn test_trashed_scopes_on_models_without_soft_deletes() {
    let (sql, _) = mysql(TestPost::query().with_trashed());
    assert_eq!(sql, "SELECT * FROM `posts`");

    let err = TestPost::query().only_trashed().to_sql().unwrap_err();
    assert!(matches!(err, ModelError::Configuration(_)));
}

#[test]
fn test_lock_for_update_suffix_depends_on_dialect() {
    let query = TestPost::query().where_eq("id", 1);
    let (sql, _) = query.build_select_sql(SqlDialect::MySql, true).unwrap();
    assert_eq!(sql, "SELECT * FROM `posts` WHERE `id` = ? FOR UPDATE");

    let (sql, _) = query.build_select_sql(SqlDialect::Sqlite, true).unwrap();
    assert_eq!(sql, "SELECT * FROM `posts` WHERE `id` = ?");
}

#[test]
fn test_aggregate_sql_ignores_order_and_window() {
    let query = TestUser::query()
        .where_gt("age", 30)
        .order_by_desc("age")
        .limit(5);
    let (sql, params) = query
        .build_aggregate_sql(crate::query::Aggregate::Sum, Some("age"))
        .unwrap();
    assert_eq!(
        sql,
        "SELECT SUM(`age`) AS aggregate FROM `users` WHERE `age` > ? \
         AND `users`.`deleted_at` IS NULL"
    );
    assert_eq!(params, vec![DatabaseValue::Int64(30)]);
}

#[test]
fn test_builder_is_reusable_through_clone() {
    let base = TestPost::query().where_eq("published", true);
    let (first, _) = mysql(base.clone().limit(1));
    let (all, _) = mysql(base);
    assert_eq!(first, "SELECT * FROM `posts` WHERE `published` = ? LIMIT 1");
    assert_eq!(all, "SELECT * FROM `posts` WHERE `published` = ?");
}

#[test]
fn test_joined_table_deleted_at_keeps_own_scope() {
    let (sql, _) = mysql(
        TestUser::query()
            .join("posts", "posts.user_id", "=", "users.id")
            .where_null("posts.deleted_at"),
    );
    assert_eq!(
        sql,
        "SELECT * FROM `users` INNER JOIN `posts` ON `posts`.`user_id` = `users`.`id` \
         WHERE `posts`.`deleted_at` IS NULL AND `users`.`deleted_at` IS NULL"
    );
}

#[test]
fn test_trashed_scopes_keep_joined_table_predicates() {
    let query = TestUser::query()
        .join("posts", "posts.user_id", "=", "users.id")
        .where_null("posts.deleted_at");

    let (sql, _) = mysql(query.clone().with_trashed());
    assert_eq!(
        sql,
        "SELECT * FROM `users` INNER JOIN `posts` ON `posts`.`user_id` = `users`.`id` \
         WHERE `posts`.`deleted_at` IS NULL"
    );

    let (sql, _) = mysql(query.only_trashed());
    assert_eq!(
        sql,
        "SELECT * FROM `users` INNER JOIN `posts` ON `posts`.`user_id` = `users`.`id` \
         WHERE `posts`.`deleted_at` IS NULL AND `users`.`deleted_at` IS NOT NULL"
    );
}

#[test]
fn test_with_trashed_keeps_mixed_or_group() {
    let (sql, params) = mysql(
        TestUser::query()
            .where_eq("name", "Ada")
            .or_where("deleted_at", "=", "2024-01-01 00:00:00")
            .with_trashed(),
    );
    assert_eq!(
        sql,
        "SELECT * FROM `users` WHERE (`name` = ? OR `deleted_at` = ?)"
    );
    assert_eq!(params.len(), 2);
}
