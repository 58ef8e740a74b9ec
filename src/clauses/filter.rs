use once_cell::sync::Lazy;
use regex::Regex;

use crate::clauses::where_clause::{CompareOp, WhereClause};
use crate::error::{ModelError, Result};
use crate::traits::ColumnRef;
use crate::types::SqlValue;

static KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*([A-Za-z_][A-Za-z0-9_$]*(?:\.[A-Za-z_][A-Za-z0-9_$]*){0,2})\s*(=|!=|<>|<=|>=|<|>|not\s+like|like)?\s*$",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Keyed(String, SqlValue),
    Clause(WhereClause),
}

/// A column-to-value mapping used to narrow reads, deletes and existence checks.
///
/// Keys are a column name optionally followed by an operator, e.g. `"status"`,
/// `"u.age >="` or `"name like"`. Without an operator the term is an equality.
/// All terms are combined with AND. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<Term>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `Filter::new().and(key, value)`.
    pub fn by(key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new().and(key, value)
    }

    /// Adds a `key` term.
    pub fn and(mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.terms.push(Term::Keyed(key.into(), value.into()));
        self
    }

    /// Adds a prebuilt clause.
    pub fn clause(mut self, clause: WhereClause) -> Self {
        self.terms.push(Term::Clause(clause));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Resolves every term into a single clause, or `None` for an empty filter.
    pub fn to_clause(&self) -> Result<Option<WhereClause>> {
        let mut combined: Option<WhereClause> = None;
        for term in &self.terms {
            let clause = match term {
                Term::Keyed(key, value) => parse_term(key, value.clone())?,
                Term::Clause(clause) => clause.clone(),
            };
            combined = Some(match combined {
                Some(acc) => acc.and(clause),
                None => clause,
            });
        }
        Ok(combined)
    }
}

fn parse_term(key: &str, value: SqlValue) -> Result<WhereClause> {
    let caps = KEY
        .captures(key)
        .ok_or_else(|| ModelError::InvalidIdentifier(key.to_string()))?;
    let column = ColumnRef::parse(&caps[1])?;
    let op = match caps.get(2) {
        Some(op) => CompareOp::parse(op.as_str())?,
        None => CompareOp::Eq,
    };
    Ok(WhereClause::compare(column, op, value))
}

impl From<WhereClause> for Filter {
    fn from(clause: WhereClause) -> Self {
        Filter::new().clause(clause)
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Filter::new(), |filter, (k, v)| filter.and(k, v))
    }
}
