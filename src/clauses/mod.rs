mod filter;
pub mod ident;
mod join;
mod where_clause;

pub use filter::Filter;
pub use join::{Join, JoinKind};
pub use where_clause::{CompareOp, WhereClause};
