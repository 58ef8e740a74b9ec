//! Identifier checks for names that are spliced into SQL text.
//!
//! Values always travel as bound parameters. Column, table and alias names
//! cannot, so every name that reaches a statement passes through here first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ModelError, Result};

const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_$]*";

static QUALIFIED: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{IDENT}(?:\.{IDENT}){{0,2}}$")).expect("valid regex"));

static SIMPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{IDENT}$")).expect("valid regex"));

static ALIASED_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{IDENT}(?:\.{IDENT})?(?:\s+(?:AS\s+)?{IDENT})?$"
    ))
    .expect("valid regex")
});

static JOIN_CONDITION: Lazy<Regex> = Lazy::new(|| {
    let operand = format!(r"{IDENT}(?:\.{IDENT}){{0,2}}");
    let cmp = format!(r"{operand}\s*(?:=|!=|<>|<=|>=|<|>)\s*{operand}");
    Regex::new(&format!(r"(?i)^{cmp}(?:\s+AND\s+{cmp})*$")).expect("valid regex")
});

/// Accepts `name`, `table.name` or `schema.table.name`.
pub fn validate(name: &str) -> Result<&str> {
    if QUALIFIED.is_match(name) {
        Ok(name)
    } else {
        Err(ModelError::InvalidIdentifier(name.to_string()))
    }
}

/// Accepts a single unqualified name, as used for aliases.
pub fn validate_simple(name: &str) -> Result<&str> {
    if SIMPLE.is_match(name) {
        Ok(name)
    } else {
        Err(ModelError::InvalidIdentifier(name.to_string()))
    }
}

/// Accepts `table`, `table alias` or `table AS alias`.
pub fn validate_join_table(table: &str) -> Result<&str> {
    let trimmed = table.trim();
    if ALIASED_TABLE.is_match(trimmed) {
        Ok(trimmed)
    } else {
        Err(ModelError::InvalidIdentifier(table.to_string()))
    }
}

/// Accepts one or more `a.x = b.y` comparisons joined by AND.
pub fn validate_join_condition(condition: &str) -> Result<&str> {
    let trimmed = condition.trim();
    if JOIN_CONDITION.is_match(trimmed) {
        Ok(trimmed)
    } else {
        Err(ModelError::InvalidIdentifier(condition.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(validate("id").is_ok());
        assert!(validate("users.id").is_ok());
        assert!(validate("public.users.id").is_ok());
        assert!(validate("a.b.c.d").is_err());
        assert!(validate("1abc").is_err());
        assert!(validate("id + 1").is_err());
        assert!(validate("").is_err());
    }

    #[test]
    fn test_validate_simple() {
        assert!(validate_simple("u").is_ok());
        assert!(validate_simple("u.x").is_err());
    }

    #[test]
    fn test_join_table() {
        assert_eq!(validate_join_table(" posts ").unwrap(), "posts");
        assert!(validate_join_table("posts p").is_ok());
        assert!(validate_join_table("posts AS p").is_ok());
        assert!(validate_join_table("posts; DROP TABLE x").is_err());
    }

    #[test]
    fn test_join_condition() {
        assert!(validate_join_condition("posts.user_id = users.id").is_ok());
        assert!(validate_join_condition("p.a=u.a and p.b = u.b").is_ok());
        assert!(validate_join_condition("p.a = 1").is_err());
        assert!(validate_join_condition("p.a = u.a OR 1=1").is_err());
    }
}
