use crate::error::{ModelError, Result};
use crate::traits::{Column, ColumnRef};
use crate::types::SqlValue;

/// Comparison operators accepted in WHERE conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
        }
    }

    /// Parses an operator as written after a column name in a filter key.
    pub fn parse(op: &str) -> Result<Self> {
        let normalized = op.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" => Ok(CompareOp::Eq),
            "!=" | "<>" => Ok(CompareOp::NotEq),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::LtEq),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::GtEq),
            "LIKE" => Ok(CompareOp::Like),
            "NOT LIKE" => Ok(CompareOp::NotLike),
            _ => Err(ModelError::InvalidIdentifier(op.to_string())),
        }
    }
}

/// Represents a WHERE clause condition.
/// Supports comparison operations, NULL checks and logical combinations.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// column <op> value
    Compare(ColumnRef, CompareOp, SqlValue),
    /// column IS NULL
    IsNull(ColumnRef),
    /// column IS NOT NULL
    IsNotNull(ColumnRef),
    /// clause AND clause
    And(Box<WhereClause>, Box<WhereClause>),
    /// clause OR clause
    Or(Box<WhereClause>, Box<WhereClause>),
}

impl WhereClause {
    /// Creates an equality condition: column = value
    pub fn eq<C: Column, V: Into<SqlValue>>(column: &C, value: V) -> Self {
        WhereClause::compare(ColumnRef::from_column(column), CompareOp::Eq, value)
    }

    /// Creates a comparison against a column reference.
    /// A NULL value compared with `=` or `<>` becomes `IS NULL` / `IS NOT NULL`.
    pub fn compare<V: Into<SqlValue>>(column: ColumnRef, op: CompareOp, value: V) -> Self {
        match (op, value.into()) {
            (CompareOp::Eq, SqlValue::Null) => WhereClause::IsNull(column),
            (CompareOp::NotEq, SqlValue::Null) => WhereClause::IsNotNull(column),
            (op, value) => WhereClause::Compare(column, op, value),
        }
    }

    /// Combines this clause with another using AND
    pub fn and(self, other: WhereClause) -> Self {
        WhereClause::And(Box::new(self), Box::new(other))
    }

    /// Combines this clause with another using OR
    pub fn or(self, other: WhereClause) -> Self {
        WhereClause::Or(Box::new(self), Box::new(other))
    }

    /// Builds the SQL fragment, pushing bound values onto `params`.
    /// Placeholders are numbered after whatever `params` already holds.
    pub fn build_sql(&self, params: &mut Vec<SqlValue>) -> String {
        match self {
            WhereClause::Compare(col, op, value) => {
                params.push(value.clone());
                format!("{} {} ${}", col.qualified_name(), op.as_sql(), params.len())
            }
            WhereClause::IsNull(col) => format!("{} IS NULL", col.qualified_name()),
            WhereClause::IsNotNull(col) => format!("{} IS NOT NULL", col.qualified_name()),
            WhereClause::And(left, right) => {
                let left_sql = left.build_sql(params);
                let right_sql = right.build_sql(params);
                format!("({}) AND ({})", left_sql, right_sql)
            }
            WhereClause::Or(left, right) => {
                let left_sql = left.build_sql(params);
                let right_sql = right.build_sql(params);
                format!("({}) OR ({})", left_sql, right_sql)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestColumn {
        table: &'static str,
        column: &'static str,
    }

    impl Column for TestColumn {
        fn column_name(&self) -> &'static str {
            self.column
        }
        fn table_name(&self) -> &'static str {
            self.table
        }
    }

    #[test]
    fn test_eq_clause() {
        let col = TestColumn {
            table: "users",
            column: "name",
        };
        let clause = WhereClause::eq(&col, "John");
        let mut params = Vec::new();
        let sql = clause.build_sql(&mut params);

        assert_eq!(sql, "users.name = $1");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0], SqlValue::Text("John".to_string()));
    }

    #[test]
    fn test_and_clause() {
        let name_col = TestColumn {
            table: "users",
            column: "name",
        };
        let age_col = TestColumn {
            table: "users",
            column: "age",
        };

        let clause = WhereClause::eq(&name_col, "John").and(WhereClause::eq(&age_col, 30));

        let mut params = Vec::new();
        let sql = clause.build_sql(&mut params);

        assert_eq!(sql, "(users.name = $1) AND (users.age = $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_placeholders_continue_after_existing_params() {
        let clause = WhereClause::compare(ColumnRef::bare("age"), CompareOp::GtEq, 18);
        let mut params = vec![SqlValue::Text("x".to_string())];
        assert_eq!(clause.build_sql(&mut params), "age >= $2");
    }

    #[test]
    fn test_null_comparisons() {
        let mut params = Vec::new();
        let is_null = WhereClause::compare(ColumnRef::bare("deleted_at"), CompareOp::Eq, SqlValue::Null);
        let not_null =
            WhereClause::compare(ColumnRef::bare("deleted_at"), CompareOp::NotEq, SqlValue::Null);

        assert_eq!(is_null.build_sql(&mut params), "deleted_at IS NULL");
        assert_eq!(not_null.build_sql(&mut params), "deleted_at IS NOT NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_ops() {
        assert_eq!(CompareOp::parse("!=").unwrap(), CompareOp::NotEq);
        assert_eq!(CompareOp::parse("not   like").unwrap(), CompareOp::NotLike);
        assert!(CompareOp::parse("; --").is_err());
    }
}
