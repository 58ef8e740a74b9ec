use crate::builders::Statement;
use crate::clauses::{ident, WhereClause};
use crate::error::{ModelError, Result};
use crate::types::{SqlValue, Values};

/// The right-hand side of a `SET column = ...` assignment.
///
/// Every variant binds its operand as a parameter; arithmetic is expressed by
/// the variant rather than by splicing an expression into the statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `column = $n`
    Value(SqlValue),
    /// `column = column + $n`
    Increment(i64),
    /// `column = column - $n`
    Decrement(i64),
}

/// An UPDATE of every row matching a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    table: String,
    assignments: Vec<(String, Assignment)>,
    where_clause: Option<WhereClause>,
}

impl UpdateQuery {
    pub fn new(table: &str) -> Result<Self> {
        Ok(Self {
            table: ident::validate(table)?.to_string(),
            assignments: Vec::new(),
            where_clause: None,
        })
    }

    /// Add one assignment.
    pub fn set(mut self, column: &str, assignment: Assignment) -> Result<Self> {
        let column = ident::validate(column)?.to_string();
        self.assignments.push((column, assignment));
        Ok(self)
    }

    /// Add a plain assignment for every entry of `values`.
    pub fn set_values(self, values: &Values) -> Result<Self> {
        values.iter().try_fold(self, |query, (column, value)| {
            query.set(column, Assignment::Value(value.clone()))
        })
    }

    /// Add a WHERE clause to the update.
    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl Statement for UpdateQuery {
    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::with_capacity(128);
        let mut params = Vec::new();

        sql.push_str("UPDATE ");
        sql.push_str(&self.table);
        sql.push_str(" SET ");
        for (i, (column, assignment)) in self.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let (operator, value) = match assignment {
                Assignment::Value(v) => (None, v.clone()),
                Assignment::Increment(n) => (Some('+'), SqlValue::Int64(*n)),
                Assignment::Decrement(n) => (Some('-'), SqlValue::Int64(*n)),
            };
            params.push(value);
            match operator {
                Some(op) => sql.push_str(&format!(
                    "{} = {} {} ${}",
                    column,
                    column,
                    op,
                    params.len()
                )),
                None => sql.push_str(&format!("{} = ${}", column, params.len())),
            }
        }

        if let Some(ref where_clause) = self.where_clause {
            sql.push_str(" WHERE ");
            let where_sql = where_clause.build_sql(&mut params);
            sql.push_str(&where_sql);
        }

        (sql, params)
    }
}

/// An UPDATE of several rows at once, each matched on `key`.
///
/// Renders one `CASE WHEN key = .. THEN .. ELSE column END` per column and
/// limits the statement to the listed keys.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBatchQuery {
    table: String,
    key: String,
    columns: Vec<String>,
    rows: Vec<Values>,
}

impl UpdateBatchQuery {
    pub fn new(table: &str, rows: &[Values], key: &str) -> Result<Self> {
        let key = ident::validate(key)?.to_string();
        if rows.is_empty() {
            return Err(ModelError::InvalidBatch("no rows to update".to_string()));
        }

        let mut columns: Vec<String> = Vec::new();
        for (n, row) in rows.iter().enumerate() {
            if !row.contains(&key) {
                return Err(ModelError::InvalidBatch(format!(
                    "row {} is missing key column {}",
                    n, key
                )));
            }
            for column in row.columns().filter(|c| *c != key) {
                ident::validate(column)?;
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }
        if columns.is_empty() {
            return Err(ModelError::InvalidBatch(
                "rows carry nothing but the key column".to_string(),
            ));
        }

        Ok(Self {
            table: ident::validate(table)?.to_string(),
            key,
            columns,
            rows: rows.to_vec(),
        })
    }

    fn key_of(row: &Values, key: &str) -> SqlValue {
        row.get(key).cloned().unwrap_or(SqlValue::Null)
    }
}

impl Statement for UpdateBatchQuery {
    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::with_capacity(256);
        let mut params = Vec::new();
        let key = self.key.as_str();

        sql.push_str("UPDATE ");
        sql.push_str(&self.table);
        sql.push_str(" SET ");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column);
            sql.push_str(" = CASE");
            for row in &self.rows {
                if let Some(value) = row.get(column) {
                    params.push(Self::key_of(row, &self.key));
                    sql.push_str(&format!(" WHEN {} = ${}", key, params.len()));
                    params.push(value.clone());
                    sql.push_str(&format!(" THEN ${}", params.len()));
                }
            }
            sql.push_str(&format!(" ELSE {} END", column));
        }

        sql.push_str(" WHERE ");
        sql.push_str(key);
        sql.push_str(" IN (");
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            params.push(Self::key_of(row, &self.key));
            sql.push_str(&format!("${}", params.len()));
        }
        sql.push(')');

        (sql, params)
    }
}
