use crate::builders::Statement;
use crate::clauses::{ident, WhereClause};
use crate::error::Result;
use crate::types::SqlValue;

/// A DELETE restricted by a WHERE clause. There is no unrestricted form.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    table: String,
    where_clause: WhereClause,
}

impl DeleteQuery {
    pub fn new(table: &str, where_clause: WhereClause) -> Result<Self> {
        Ok(Self {
            table: ident::validate(table)?.to_string(),
            where_clause,
        })
    }
}

impl Statement for DeleteQuery {
    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut params = Vec::new();
        let where_sql = self.where_clause.build_sql(&mut params);
        (
            format!("DELETE FROM {} WHERE {}", self.table, where_sql),
            params,
        )
    }
}
