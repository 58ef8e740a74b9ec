use crate::clauses::ident;
use crate::error::Result;

/// The kind of JOIN to emit. No kind renders a plain `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
    LeftOuter,
    RightOuter,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Outer => "FULL OUTER",
            JoinKind::LeftOuter => "LEFT OUTER",
            JoinKind::RightOuter => "RIGHT OUTER",
        }
    }
}

/// A join against another table.
///
/// With escaping on (the default) the table must be a plain name with an
/// optional alias and the condition must be identifier comparisons joined by
/// AND. [`Join::escape`]`(false)` lifts that check and splices the condition
/// into the statement verbatim, so it must never carry caller input.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    table: String,
    condition: String,
    kind: Option<JoinKind>,
    escape: bool,
}

impl Join {
    pub fn new(table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            condition: condition.into(),
            kind: None,
            escape: true,
        }
    }

    pub fn kind(mut self, kind: JoinKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    /// Renders the clause, leading space included.
    pub fn to_sql(&self) -> Result<String> {
        let table = ident::validate_join_table(&self.table)?;
        let condition = if self.escape {
            ident::validate_join_condition(&self.condition)?
        } else {
            self.condition.as_str()
        };
        Ok(match self.kind {
            Some(kind) => format!(" {} JOIN {} ON {}", kind.as_sql(), table, condition),
            None => format!(" JOIN {} ON {}", table, condition),
        })
    }
}
