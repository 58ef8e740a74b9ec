mod column;
mod driver;
mod table;

pub use column::{Column, ColumnRef};
pub use driver::DatabaseDriver;
pub use table::{Table, TableRef};
