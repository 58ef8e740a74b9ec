mod page;
mod row;
mod sql_value;
mod values;

pub use page::Page;
pub use row::{QueryResult, RawQueryResult, Row};
pub use sql_value::SqlValue;
pub use values::Values;
