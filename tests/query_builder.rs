use std::sync::Arc;

use pgmodel::builders::SelectQuery;
use pgmodel::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use pgmodel::error::ModelError;
use pgmodel::traits::{Column, DatabaseDriver, Table};
use pgmodel::types::SqlValue;
use pgmodel::{PgModelClient, WhereClause};

// Test table and columns
struct Users;
struct UsersColumns {
    pub id: UsersId,
    pub name: UsersName,
}
struct UsersId;
struct UsersName;

impl Table for Users {
    type Columns = UsersColumns;
    fn table_name() -> &'static str {
        "users"
    }
    fn columns() -> Self::Columns {
        UsersColumns {
            id: UsersId,
            name: UsersName,
        }
    }
}

impl Column for UsersId {
    fn column_name(&self) -> &'static str {
        "id"
    }
    fn table_name(&self) -> &'static str {
        "users"
    }
}

impl Column for UsersName {
    fn column_name(&self) -> &'static str {
        "name"
    }
    fn table_name(&self) -> &'static str {
        "users"
    }
}

fn client_for(driver: &Arc<InMemoryTestDriver>) -> PgModelClient {
    let driver: Arc<dyn DatabaseDriver> = Arc::clone(driver) as Arc<dyn DatabaseDriver>;
    PgModelClient::with_driver(driver)
}

#[tokio::test]
async fn test_simple_select_single_column() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(&["1"])
                .build(),
        ),
    );
    let querier = client_for(&in_memory_test_driver).querier();

    let result = querier
        .fetch(&SelectQuery::from_table::<Users>().columns(&[&Users::columns().id]))
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query("SELECT users.id FROM users", &[]);
    in_memory_test_driver.assert_query_count(1);

    let row = result.single_row().unwrap();
    assert_eq!(row.get(&Users::columns().id).unwrap(), Some("1"));
}

#[tokio::test]
async fn test_select_with_where_and_limit() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(&["1"])
                .row(&["2"])
                .row(&["3"])
                .build(),
        ),
    );
    let querier = client_for(&in_memory_test_driver).querier();

    let result = querier
        .fetch(
            &SelectQuery::from_table::<Users>()
                .columns(&[&Users::columns().id])
                .where_(WhereClause::eq(&Users::columns().name, "Test"))
                .limit(3),
        )
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query(
        "SELECT users.id FROM users WHERE users.name = $1 LIMIT 3",
        &[SqlValue::Text("Test".to_string())],
    );

    let rows = result.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get(&Users::columns().id).unwrap(), Some("1"));
    assert_eq!(rows[2].get(&Users::columns().id).unwrap(), Some("3"));
}

#[tokio::test]
async fn test_select_empty_result() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(
        InMemoryTestResponseBuilder::new().columns(&["id"]).build(), // No rows
    ));
    let querier = client_for(&in_memory_test_driver).querier();

    let result = querier
        .fetch(
            &SelectQuery::from_table::<Users>()
                .columns(&[&Users::columns().id])
                .where_(WhereClause::eq(&Users::columns().id, 999)),
        )
        .await
        .unwrap();

    assert!(result.is_empty());

    match result.single_row().unwrap_err() {
        ModelError::UnexpectedRowCount { expected, actual } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 0);
        }
        _ => panic!("Expected UnexpectedRowCount error"),
    }
}

#[tokio::test]
async fn test_compound_where_clause_and_count() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(InMemoryTestResponseBuilder::count(4)),
    );
    let querier = client_for(&in_memory_test_driver).querier();

    let query = SelectQuery::from_table::<Users>().where_(
        WhereClause::eq(&Users::columns().name, "Admin")
            .or(WhereClause::eq(&Users::columns().id, 1)),
    );
    let count = querier.count(&query.count()).await.unwrap();

    assert_eq!(count, 4);
    in_memory_test_driver.assert_last_query(
        "SELECT COUNT(*) AS numrows FROM users WHERE (users.name = $1) OR (users.id = $2)",
        &[SqlValue::Text("Admin".to_string()), SqlValue::Int32(1)],
    );
}

#[tokio::test]
async fn test_driver_failure_propagates() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_failure("relation \"users\" does not exist"));
    let querier = client_for(&in_memory_test_driver).querier();

    let err = querier
        .fetch(&SelectQuery::from_table::<Users>())
        .await
        .unwrap_err();

    match err {
        ModelError::QueryFailed(message) => {
            assert_eq!(message, "relation \"users\" does not exist")
        }
        other => panic!("Expected QueryFailed error, got {other:?}"),
    }
}
