//! pgmodel - A generic, driver-agnostic table accessor for PostgreSQL
//!
//! # Example
//! ```ignore
//! use pgmodel::{Filter, PgModelClient, Table, Values};
//!
//! // Connect to database
//! let client = PgModelClient::connect("postgres://localhost/mydb").await?;
//! let mut users = client.model::<Users>()?;
//!
//! // Create, read and paginate
//! let id: i64 = users.create(&Values::new().set("name", "John")).await?;
//! let john = users.get_by_id(id, &[]).await?;
//! let page = users.get_page_by(&Filter::by("active", true), 2, &[]).await?;
//!
//! // Qualify reads with an alias
//! users.set_table_alias("u")?;
//! users.increment_field(id, "logins", 1).await?;
//! ```

pub mod builders;
pub mod clauses;
pub mod config;
pub mod drivers;
pub mod error;
pub mod model;
pub mod querier;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use builders::Statement;
pub use clauses::{CompareOp, Filter, Join, JoinKind, WhereClause};
pub use client::PgModelClient;
pub use config::ClientConfig;
pub use error::{ModelError, Result};
pub use model::{Model, TableDescriptor};
pub use querier::Querier;
pub use traits::{Column, ColumnRef, DatabaseDriver, Table, TableRef};
pub use types::{Page, QueryResult, RawQueryResult, Row, SqlValue, Values};
