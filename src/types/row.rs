use std::str::FromStr;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    error::{ModelError, Result},
    Column,
};

/// Driver-agnostic raw result from a database query.
/// Values are converted to text by the driver; `None` is SQL `NULL`.
#[derive(Debug, Clone, Default)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single record returned by a query.
/// Values are stored as text and accessed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Option<String>>,
}

impl Row {
    pub(crate) fn new(columns: Arc<Vec<String>>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Gets a value by typed column. `Ok(None)` means the column holds `NULL`.
    pub fn get<T: Column + ?Sized>(&self, column: &T) -> Result<Option<&str>> {
        self.position(column.column_name())
            .map(|i| self.values[i].as_deref())
            .ok_or_else(|| ModelError::ColumnNotFound(column.qualified_name()))
    }

    /// Gets a value by column name.
    pub fn value(&self, name: &str) -> Result<Option<&str>> {
        self.position(name)
            .map(|i| self.values[i].as_deref())
            .ok_or_else(|| ModelError::ColumnNotFound(name.to_string()))
    }

    /// Parses a non-null value into `T`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let raw = self
            .value(name)?
            .ok_or_else(|| ModelError::InvalidValue {
                column: name.to_string(),
                value: "NULL".to_string(),
            })?;
        raw.parse().map_err(|_| ModelError::InvalidValue {
            column: name.to_string(),
            value: raw.to_string(),
        })
    }

    /// Returns all column names in this row, in select order.
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.as_str()).collect()
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Result of a query execution, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Arc<Vec<String>>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Creates a QueryResult from a RawQueryResult.
    pub fn from_raw(raw: RawQueryResult) -> Self {
        let columns = Arc::new(raw.columns);
        let rows = raw
            .rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect();
        Self { columns, rows }
    }

    /// Extracts a single row from the result.
    /// Returns an error if the result contains zero or more than one row.
    pub fn single_row(self) -> Result<Row> {
        if self.rows.len() != 1 {
            return Err(ModelError::UnexpectedRowCount {
                expected: 1,
                actual: self.rows.len(),
            });
        }
        self.first_row().ok_or(ModelError::UnexpectedRowCount {
            expected: 1,
            actual: 0,
        })
    }

    /// Returns the first row, if any.
    pub fn first_row(self) -> Option<Row> {
        self.rows.into_iter().next()
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
