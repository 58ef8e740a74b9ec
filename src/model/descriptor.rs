use serde::Deserialize;

use crate::clauses::ident;
use crate::error::{ModelError, Result};
use crate::traits::{ColumnRef, Table, TableRef};

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_per_page() -> u64 {
    20
}

/// Per-model table settings: name, alias, primary key and page size.
///
/// Usually derived from a [`Table`] impl, but can also be deserialized so the
/// settings live in configuration. Deserialized values are checked by
/// [`TableDescriptor::validate`] before a model accepts them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableDescriptor {
    table: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default = "default_primary_key")]
    primary_key: String,
    #[serde(default = "default_per_page")]
    per_page: u64,
}

impl TableDescriptor {
    pub fn for_table<T: Table>() -> Self {
        Self {
            table: T::qualified_name(),
            alias: None,
            primary_key: T::primary_key().to_string(),
            per_page: T::per_page(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ident::validate(&self.table)?;
        ident::validate_simple(&self.primary_key)?;
        if let Some(ref alias) = self.alias {
            ident::validate_simple(alias)?;
        }
        if self.per_page == 0 {
            return Err(ModelError::InvalidConfig(
                "per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) -> Result<()> {
        let alias = alias.into();
        ident::validate_simple(&alias)?;
        self.alias = Some(alias);
        Ok(())
    }

    pub fn clear_alias(&mut self) {
        self.alias = None;
    }

    pub fn set_per_page(&mut self, per_page: u64) -> Result<()> {
        if per_page == 0 {
            return Err(ModelError::InvalidConfig(
                "per_page must be at least 1".to_string(),
            ));
        }
        self.per_page = per_page;
        Ok(())
    }

    /// The table as it appears in FROM, alias included.
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.table.as_str()).with_alias(self.alias.clone())
    }

    /// The primary key qualified by alias when set, by table name otherwise.
    pub fn qualified_primary_key(&self) -> ColumnRef {
        ColumnRef::new(self.table_ref().reference(), self.primary_key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let descriptor: TableDescriptor =
            serde_json::from_str(r#"{"table": "users"}"#).unwrap();
        assert_eq!(descriptor.primary_key(), "id");
        assert_eq!(descriptor.per_page(), 20);
        assert_eq!(descriptor.alias(), None);
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero: TableDescriptor =
            serde_json::from_str(r#"{"table": "users", "per_page": 0}"#).unwrap();
        assert!(matches!(zero.validate(), Err(ModelError::InvalidConfig(_))));

        let bad_alias: TableDescriptor =
            serde_json::from_str(r#"{"table": "users", "alias": "u; --"}"#).unwrap();
        assert!(matches!(
            bad_alias.validate(),
            Err(ModelError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_primary_key_follows_alias() {
        let mut descriptor: TableDescriptor =
            serde_json::from_str(r#"{"table": "users", "primary_key": "user_id"}"#).unwrap();
        assert_eq!(
            descriptor.qualified_primary_key().qualified_name(),
            "users.user_id"
        );

        descriptor.set_alias("u").unwrap();
        assert_eq!(descriptor.qualified_primary_key().qualified_name(), "u.user_id");
        assert_eq!(descriptor.table_ref().to_sql(), "users AS u");

        descriptor.clear_alias();
        assert_eq!(descriptor.table_ref().to_sql(), "users");
    }
}
