//! PgTaskRepository tests using SeaORM's mock database
//!
//! The mock connection records statements without a running PostgreSQL,
//! so these check the SQL that criteria produce and the row mapping.

use std::collections::BTreeMap;

use domain_tasks::*;
use query_filter::{Criterion, FieldCriterion, FilterOperator, PaginationSpec, QueryError, QueryHandle};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, Value};
use uuid::Uuid;

fn empty_db() -> sea_orm::DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(n))])
}

#[test]
fn test_filter_sql() {
    let repo = PgTaskRepository::new(empty_db());
    let owner = Uuid::nil();
    let filter = TaskFilter {
        owner_id: Some(owner),
        statuses: Some(vec![TaskStatus::Todo, TaskStatus::Done]),
        search: Some("docs".to_string()),
        ..Default::default()
    };

    let query = filter
        .criteria::<TaskQuery>()
        .unwrap()
        .apply_all(repo.base_query())
        .unwrap()
        .limit(10)
        .offset(20);
    let sql = query.statement().to_string();

    assert!(sql.contains(r#"FROM "tasks""#), "{sql}");
    assert!(sql.contains(r#""tasks"."owner_id" = "#), "{sql}");
    assert!(sql.contains(&owner.to_string()), "{sql}");
    assert!(sql.contains(r#""tasks"."status" IN"#), "{sql}");
    assert!(sql.contains(r#""tasks"."title" LIKE '%docs%'"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "tasks"."created_at" DESC"#), "{sql}");
    assert!(sql.contains("LIMIT 10"), "{sql}");
    assert!(sql.contains("OFFSET 20"), "{sql}");

    // predicates appear in insertion order
    let owner_at = sql.find("owner_id").unwrap();
    let status_at = sql.find(r#""status" IN"#).unwrap();
    let title_at = sql.find("LIKE").unwrap();
    assert!(owner_at < status_at && status_at < title_at, "{sql}");
}

#[test]
fn test_null_and_range_sql() {
    let repo = PgTaskRepository::new(empty_db());
    let query = repo
        .base_query()
        .filter_by_field("project_id", FilterOperator::Eq, query_filter::FieldValue::Null)
        .unwrap();
    let due = DueBetween::new(Some(chrono::Utc::now()), None).unwrap();
    let query = Criterion::<TaskQuery>::apply(&due, query).unwrap();

    let sql = query.statement().to_string();
    assert!(sql.contains(r#""tasks"."project_id" IS NULL"#), "{sql}");
    assert!(sql.contains(r#""tasks"."due_date" >= "#), "{sql}");
}

#[test]
fn test_unknown_column_is_rejected() {
    let repo = PgTaskRepository::new(empty_db());
    let criterion = FieldCriterion::new("assignee_id", FilterOperator::Eq, Uuid::nil()).unwrap();

    let result = query_filter::CriteriaSet::empty()
        .add(criterion)
        .apply_all(repo.base_query());

    assert!(matches!(result, Err(QueryError::UnknownField(field)) if field == "assignee_id"));
}

#[tokio::test]
async fn test_list_maps_rows() {
    let owner = Uuid::new_v4();
    let tasks: Vec<Task> = (0..3)
        .map(|i| Task::new(format!("task {i}"), owner))
        .collect();
    let models: Vec<entity::Model> = tasks.iter().cloned().map(Into::into).collect();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(13)]])
        .append_query_results([models])
        .into_connection();
    let repo = PgTaskRepository::new(db);

    let filter = TaskFilter {
        owner_id: Some(owner),
        ..Default::default()
    };
    let pagination = PaginationSpec::create(Some(5), Some(3)).unwrap();
    let page = repo.list(filter, pagination).await.unwrap();

    assert_eq!(page.records, tasks);
    assert_eq!(page.total, Some(13));
    assert_eq!((page.page, page.per_page), (5, 3));
}

#[tokio::test]
async fn test_database_errors_propagate() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("relation \"tasks\" does not exist".to_string())])
        .into_connection();
    let repo = PgTaskRepository::new(db);

    let err = repo.count(TaskFilter::default()).await.unwrap_err();

    assert!(matches!(err, TaskError::Query(QueryError::Execution(ref msg)) if msg.contains("tasks")));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_get_by_id() {
    let task = Task::new("lookup", Uuid::new_v4());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![entity::Model::from(task.clone())]])
        .into_connection();
    let repo = PgTaskRepository::new(db);

    assert_eq!(repo.get_by_id(task.id).await.unwrap(), Some(task));
}

#[test]
fn test_search_wildcards_are_literal() {
    let repo = PgTaskRepository::new(empty_db());
    let filter = TaskFilter {
        search: Some("100%_done".to_string()),
        ..Default::default()
    };

    let statement = filter
        .criteria::<TaskQuery>()
        .unwrap()
        .apply_all(repo.base_query())
        .unwrap()
        .statement();

    assert!(statement.sql.contains(r#""tasks"."title" LIKE"#), "{}", statement.sql);
    assert!(statement.sql.contains("ESCAPE"), "{}", statement.sql);
    let values = statement.values.unwrap().0;
    assert!(values.contains(&Value::from(r"%100\%\_done%")), "{values:?}");
}

#[tokio::test]
async fn test_search_wildcards_match_in_memory_backend() {
    let owner = Uuid::new_v4();
    let repo = InMemoryTaskRepository::new();
    repo.insert(Task::new("write docs", owner)).await;
    repo.insert(Task::new("100% coverage", owner)).await;

    let filter = TaskFilter {
        search: Some("%".to_string()),
        ..Default::default()
    };
    let page = repo
        .list(filter, PaginationSpec::default())
        .await
        .unwrap();

    assert_eq!(page.total, Some(1));
    assert_eq!(page.records[0].title, "100% coverage");
}

#[test]
fn test_huge_page_offset_fits_bigint() {
    let repo = PgTaskRepository::new(empty_db());
    let raw = serde_json::json!({ "page": i64::MAX, "per_page": 2 });
    let pagination = PaginationSpec::from_raw_map(raw.as_object().unwrap()).unwrap();
    assert!(pagination.offset() > i64::MAX as u64);

    let statement = repo
        .base_query()
        .limit(pagination.limit())
        .offset(pagination.offset())
        .statement();

    let values = statement.values.unwrap().0;
    assert!(values.contains(&Value::BigUnsigned(Some(i64::MAX as u64))), "{values:?}");
    for value in &values {
        if let Value::BigUnsigned(Some(n)) = value {
            assert!(i64::try_from(*n).is_ok(), "{n} does not fit BIGINT");
        }
    }
}

#[tokio::test]
async fn test_huge_page_is_empty_with_total() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(3)]])
        .append_query_results([Vec::<entity::Model>::new()])
        .into_connection();
    let repo = PgTaskRepository::new(db);

    let pagination = PaginationSpec::create(Some(i64::MAX), Some(2)).unwrap();
    let page = repo.list(TaskFilter::default(), pagination).await.unwrap();

    assert!(page.records.is_empty());
    assert_eq!(page.total, Some(3));
}
