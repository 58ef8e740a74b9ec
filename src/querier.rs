use std::sync::Arc;

use tracing::debug;

use crate::builders::{CountQuery, Statement};
use crate::error::{ModelError, Result};
use crate::traits::DatabaseDriver;
use crate::types::QueryResult;

/// Executes statements against a driver.
/// Created from a PgModelClient and shared by every model built from it.
#[derive(Clone)]
pub struct Querier {
    driver: Arc<dyn DatabaseDriver>,
}

impl Querier {
    pub fn new(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self { driver }
    }

    /// Run a row-returning statement.
    pub async fn fetch<S: Statement + ?Sized>(&self, statement: &S) -> Result<QueryResult> {
        let (sql, params) = statement.build_sql();
        debug!(sql = %sql, params = params.len(), "fetch");
        let raw_result = self.driver.query(&sql, &params).await?;
        Ok(QueryResult::from_raw(raw_result))
    }

    /// Run a count and read back its single value.
    pub async fn count(&self, query: &CountQuery) -> Result<u64> {
        let row = self.fetch(query).await?.single_row()?;
        let raw = row.value(CountQuery::COLUMN)?.unwrap_or("0");
        raw.parse().map_err(|_| ModelError::InvalidValue {
            column: CountQuery::COLUMN.to_string(),
            value: raw.to_string(),
        })
    }

    /// Run a statement and return the number of affected rows.
    pub async fn execute<S: Statement + ?Sized>(&self, statement: &S) -> Result<u64> {
        let (sql, params) = statement.build_sql();
        debug!(sql = %sql, params = params.len(), "execute");
        let affected = self.driver.execute(&sql, &params).await?;
        debug!(affected, "execute finished");
        Ok(affected)
    }
}
