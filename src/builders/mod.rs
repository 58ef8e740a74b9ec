mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::{CountQuery, SelectQuery};
pub use update::{Assignment, UpdateBatchQuery, UpdateQuery};

use crate::types::SqlValue;

/// An immutable statement description.
/// Rendering has no side effects, so statements can be inspected without a connection.
pub trait Statement {
    /// Render the SQL text and its bound parameters.
    fn build_sql(&self) -> (String, Vec<SqlValue>);
}
