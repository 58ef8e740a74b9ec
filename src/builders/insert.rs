use crate::builders::Statement;
use crate::clauses::ident;
use crate::error::{ModelError, Result};
use crate::types::{SqlValue, Values};

/// An INSERT of one or more rows sharing the same column set.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    returning: Option<String>,
}

impl InsertQuery {
    /// A single-row insert. An empty payload inserts `DEFAULT VALUES`.
    pub fn one(table: &str, values: &Values) -> Result<Self> {
        Self::many(table, std::slice::from_ref(values))
    }

    /// A multi-row insert. Every row must carry the same columns, in any order.
    pub fn many(table: &str, rows: &[Values]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| ModelError::InvalidBatch("no rows to insert".to_string()))?;
        let columns = first
            .columns()
            .map(|c| ident::validate(c).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        if columns.is_empty() && rows.len() > 1 {
            return Err(ModelError::InvalidBatch(
                "batch rows must carry at least one column".to_string(),
            ));
        }

        let mut ordered = Vec::with_capacity(rows.len());
        for (n, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ModelError::InvalidBatch(format!(
                    "row {} has {} columns, expected {}",
                    n,
                    row.len(),
                    columns.len()
                )));
            }
            let values = columns
                .iter()
                .map(|c| {
                    row.get(c).cloned().ok_or_else(|| {
                        ModelError::InvalidBatch(format!("row {} is missing column {}", n, c))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ordered.push(values);
        }

        Ok(Self {
            table: ident::validate(table)?.to_string(),
            columns,
            rows: ordered,
            returning: None,
        })
    }

    /// Append `RETURNING column` so the driver hands back the generated key.
    pub fn returning(mut self, column: &str) -> Result<Self> {
        self.returning = Some(ident::validate(column)?.to_string());
        Ok(self)
    }
}

impl Statement for InsertQuery {
    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::with_capacity(128);
        let mut params = Vec::new();

        sql.push_str("INSERT INTO ");
        sql.push_str(&self.table);

        if self.columns.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            sql.push_str(" (");
            sql.push_str(&self.columns.join(", "));
            sql.push_str(") VALUES ");
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push('(');
                for (j, value) in row.iter().enumerate() {
                    if j > 0 {
                        sql.push_str(", ");
                    }
                    params.push(value.clone());
                    sql.push('$');
                    sql.push_str(&params.len().to_string());
                }
                sql.push(')');
            }
        }

        if let Some(ref column) = self.returning {
            sql.push_str(" RETURNING ");
            sql.push_str(column);
        }

        (sql, params)
    }
}
