use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

/// A recorded statement execution for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// A canned reply, consumed in FIFO order by `query` and `execute` alike.
#[derive(Debug, Clone)]
pub enum TestResponse {
    Rows(RawQueryResult),
    Affected(u64),
    Failure(String),
}

/// An in-memory database driver for testing.
///
/// Allows configuring expected responses and verifying executed statements.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use pgmodel::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
///
/// let driver = Arc::new(
///     InMemoryTestDriver::new()
///         .with_response(
///             InMemoryTestResponseBuilder::new()
///                 .columns(&["id", "name"])
///                 .row(&["1", "Alice"])
///                 .build(),
///         )
///         .with_affected(1),
/// );
/// driver.assert_query_count(0);
/// ```
pub struct InMemoryTestDriver {
    responses: Mutex<VecDeque<TestResponse>>,
    recorded_queries: Mutex<Vec<RecordedQuery>>,
    default_response: RawQueryResult,
}

impl InMemoryTestDriver {
    /// Create a new in-memory test driver with no pre-configured responses.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            recorded_queries: Mutex::new(Vec::new()),
            default_response: RawQueryResult::empty(),
        }
    }

    fn push(self, response: TestResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a row set for the next statement.
    pub fn with_response(self, response: RawQueryResult) -> Self {
        self.push(TestResponse::Rows(response))
    }

    /// Queue several row sets.
    pub fn with_responses(self, responses: impl IntoIterator<Item = RawQueryResult>) -> Self {
        responses
            .into_iter()
            .fold(self, |driver, response| driver.with_response(response))
    }

    /// Queue an affected-row count for the next statement.
    pub fn with_affected(self, affected: u64) -> Self {
        self.push(TestResponse::Affected(affected))
    }

    /// Queue a failure for the next statement.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(TestResponse::Failure(message.into()))
    }

    /// Set a default response to use when no queued responses remain.
    pub fn with_default_response(mut self, response: RawQueryResult) -> Self {
        self.default_response = response;
        self
    }

    /// Get all recorded statements that have been executed.
    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.recorded_queries.lock().unwrap().clone()
    }

    /// Get the last recorded statement, if any.
    pub fn last_query(&self) -> Option<RecordedQuery> {
        self.recorded_queries.lock().unwrap().last().cloned()
    }

    /// Clear all recorded statements.
    pub fn clear_recorded_queries(&self) {
        self.recorded_queries.lock().unwrap().clear();
    }

    /// Assert that the last statement matches the expected SQL and parameters.
    pub fn assert_last_query(&self, expected_sql: &str, expected_params: &[SqlValue]) {
        let last = self.last_query().expect("No queries were recorded");
        assert_eq!(
            last.sql, expected_sql,
            "SQL mismatch.\nExpected: {}\nActual: {}",
            expected_sql, last.sql
        );
        assert_eq!(
            last.params, expected_params,
            "Parameters mismatch.\nExpected: {:?}\nActual: {:?}",
            expected_params, last.params
        );
    }

    /// Assert that exactly n statements were executed.
    pub fn assert_query_count(&self, expected: usize) {
        let actual = self.recorded_queries.lock().unwrap().len();
        assert_eq!(
            actual, expected,
            "Query count mismatch. Expected: {}, Actual: {}",
            expected, actual
        );
    }

    fn next(&self, sql: &str, params: &[SqlValue]) -> Option<TestResponse> {
        self.recorded_queries.lock().unwrap().push(RecordedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.responses.lock().unwrap().pop_front()
    }
}

impl Default for InMemoryTestDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for InMemoryTestDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        match self.next(sql, params) {
            Some(TestResponse::Rows(rows)) => Ok(rows),
            Some(TestResponse::Affected(_)) => Ok(RawQueryResult::empty()),
            Some(TestResponse::Failure(message)) => Err(ModelError::QueryFailed(message)),
            None => Ok(self.default_response.clone()),
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        match self.next(sql, params) {
            Some(TestResponse::Affected(n)) => Ok(n),
            Some(TestResponse::Rows(rows)) => Ok(rows.rows.len() as u64),
            Some(TestResponse::Failure(message)) => Err(ModelError::QueryFailed(message)),
            None => Ok(0),
        }
    }
}

/// Builder for creating test responses easily.
pub struct InMemoryTestResponseBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl InMemoryTestResponseBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Set the column names for the response.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a row of non-null values.
    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows
            .push(values.iter().map(|s| Some(s.to_string())).collect());
        self
    }

    /// Add a row where `None` stands for NULL.
    pub fn nullable_row(mut self, values: &[Option<&str>]) -> Self {
        self.rows
            .push(values.iter().map(|v| v.map(str::to_string)).collect());
        self
    }

    /// Shorthand for the single-cell reply of a count statement.
    pub fn count(n: u64) -> RawQueryResult {
        let n = n.to_string();
        Self::new().columns(&["numrows"]).row(&[n.as_str()]).build()
    }

    /// Build the RawQueryResult.
    pub fn build(self) -> RawQueryResult {
        RawQueryResult::new(self.columns, self.rows)
    }
}

impl Default for InMemoryTestResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
