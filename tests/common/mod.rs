#![allow(dead_code)]

use std::sync::Arc;

use pgmodel::drivers::InMemoryTestDriver;
use pgmodel::traits::{Column, DatabaseDriver, Table};
use pgmodel::{Model, PgModelClient};

pub struct Users;
pub struct UsersColumns {
    pub id: UsersId,
    pub name: UsersName,
}
pub struct UsersId;
pub struct UsersName;

impl Table for Users {
    type Columns = UsersColumns;
    fn table_name() -> &'static str {
        "users"
    }
    fn columns() -> Self::Columns {
        UsersColumns {
            id: UsersId,
            name: UsersName,
        }
    }
}

impl Column for UsersId {
    fn column_name(&self) -> &'static str {
        "id"
    }
    fn table_name(&self) -> &'static str {
        "users"
    }
}

impl Column for UsersName {
    fn column_name(&self) -> &'static str {
        "name"
    }
    fn table_name(&self) -> &'static str {
        "users"
    }
}

/// A table with a schema, a non-default key and a small page.
pub struct Posts;

impl Table for Posts {
    type Columns = ();
    fn table_name() -> &'static str {
        "posts"
    }
    fn schema() -> Option<&'static str> {
        Some("blog")
    }
    fn primary_key() -> &'static str {
        "post_id"
    }
    fn per_page() -> u64 {
        5
    }
    fn columns() -> Self::Columns {}
}

pub fn client(driver: &Arc<InMemoryTestDriver>) -> PgModelClient {
    let driver: Arc<dyn DatabaseDriver> = Arc::clone(driver) as Arc<dyn DatabaseDriver>;
    PgModelClient::with_driver(driver)
}

pub fn model<T: Table>(driver: InMemoryTestDriver) -> (Arc<InMemoryTestDriver>, Model<T>) {
    let driver = Arc::new(driver);
    let model = client(&driver).model::<T>().unwrap();
    (driver, model)
}
