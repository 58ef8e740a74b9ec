use crate::builders::Statement;
use crate::clauses::{Join, WhereClause};
use crate::error::Result;
use crate::traits::{Column, ColumnRef, Table, TableRef};
use crate::types::SqlValue;

/// A SELECT statement. With no columns given it selects `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    columns: Vec<ColumnRef>,
    table: TableRef,
    joins: Vec<String>,
    where_clause: Option<WhereClause>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQuery {
    /// Start a SELECT against `table`.
    pub fn from(table: TableRef) -> Self {
        Self {
            columns: Vec::new(),
            table,
            joins: Vec::new(),
            where_clause: None,
            limit: None,
            offset: None,
        }
    }

    /// Start a SELECT against the table described by `T`.
    pub fn from_table<T: Table>() -> Self {
        Self::from(TableRef::of::<T>())
    }

    /// Specify the columns to select.
    pub fn columns(mut self, cols: &[&dyn Column]) -> Self {
        self.columns = cols.iter().map(|c| ColumnRef::from_column(*c)).collect();
        self
    }

    /// Specify the columns to select by reference.
    pub fn column_refs(mut self, cols: Vec<ColumnRef>) -> Self {
        self.columns = cols;
        self
    }

    /// Add a join. Fails when the join does not pass identifier checks.
    pub fn join(mut self, join: &Join) -> Result<Self> {
        self.joins.push(join.to_sql()?);
        Ok(self)
    }

    /// Add each join in order.
    pub fn joins(self, joins: &[Join]) -> Result<Self> {
        joins.iter().try_fold(self, |query, join| query.join(join))
    }

    /// Add a WHERE clause to the query.
    pub fn where_(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    /// Replace the WHERE clause, clearing it on `None`.
    pub fn where_opt(mut self, clause: Option<WhereClause>) -> Self {
        self.where_clause = clause;
        self
    }

    /// Add a LIMIT to the query.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Add an OFFSET to the query.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// The same table, joins and WHERE clause, counted instead of fetched.
    pub fn count(&self) -> CountQuery {
        CountQuery {
            select: self.clone(),
        }
    }

    fn push_from_where(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        sql.push_str(" FROM ");
        sql.push_str(&self.table.to_sql());

        for join in &self.joins {
            sql.push_str(join);
        }

        if let Some(ref where_clause) = self.where_clause {
            sql.push_str(" WHERE ");
            let where_sql = where_clause.build_sql(params);
            sql.push_str(&where_sql);
        }
    }
}

impl Statement for SelectQuery {
    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::with_capacity(256);
        let mut params = Vec::new();

        sql.push_str("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        }
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&col.qualified_name());
        }

        self.push_from_where(&mut sql, &mut params);

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&offset.to_string());
        }

        (sql, params)
    }
}

/// `SELECT COUNT(*)` over a [`SelectQuery`], ignoring its projection and window.
#[derive(Debug, Clone, PartialEq)]
pub struct CountQuery {
    select: SelectQuery,
}

impl CountQuery {
    /// Name of the single column the count comes back in.
    pub const COLUMN: &'static str = "numrows";
}

impl Statement for CountQuery {
    fn build_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::with_capacity(128);
        let mut params = Vec::new();
        sql.push_str("SELECT COUNT(*) AS ");
        sql.push_str(Self::COLUMN);
        self.select.push_from_where(&mut sql, &mut params);
        (sql, params)
    }
}
