use serde::Deserialize;

use crate::error::{ModelError, Result};

/// Environment variable holding the connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Optional environment variable overriding every model's page size.
pub const PER_PAGE_ENV: &str = "PGMODEL_PER_PAGE";

/// Connection settings for a [`PgModelClient`](crate::PgModelClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub database_url: String,
    /// When set, replaces the page size declared by each table.
    #[serde(default)]
    pub per_page: Option<u64>,
}

impl ClientConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            per_page: None,
        }
    }

    /// Read `DATABASE_URL` and, if present, `PGMODEL_PER_PAGE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup(DATABASE_URL_ENV)
            .ok_or_else(|| ModelError::InvalidConfig(format!("{} is not set", DATABASE_URL_ENV)))?;
        let per_page = match lookup(PER_PAGE_ENV) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| {
                ModelError::InvalidConfig(format!("{} is not a number: {:?}", PER_PAGE_ENV, raw))
            })?),
            None => None,
        };
        let config = Self {
            database_url,
            per_page,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(ModelError::InvalidConfig(
                "database_url is empty".to_string(),
            ));
        }
        if self.per_page == Some(0) {
            return Err(ModelError::InvalidConfig(
                "per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
