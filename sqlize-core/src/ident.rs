//! SQL identifiers and table references.
//!
//! An [`Ident`] is a dot-separated name such as `users`, `public.users` or
//! `users.id`. The final part may be `*` to express a wildcard (`*`, `users.*`).
//! Identifiers are stored unquoted; whether a part gets quoted is decided by
//! the [`Dialect`](crate::Dialect) at render time, so the same builder renders
//! `"order"` on Postgres and `` `order` `` on MySQL.

use crate::{Error, Result};

/// A possibly qualified SQL identifier (schema/table/column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse a dotted identifier: `users.id` becomes `["users", "id"]`.
    ///
    /// Parsing never fails; malformed identifiers (empty parts, NUL bytes,
    /// a `*` that is not the last part) are reported when the statement is
    /// rendered.
    pub fn parse(name: &str) -> Self {
        Self {
            parts: name.split('.').map(str::to_string).collect(),
        }
    }

    /// A single-part identifier that may itself contain dots.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            parts: vec![name.into()],
        }
    }

    /// Build an identifier from explicit parts.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// The bare `*` wildcard.
    pub fn wildcard() -> Self {
        Self {
            parts: vec!["*".to_string()],
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The last part (the column or table name without qualifier).
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_wildcard(&self) -> bool {
        self.name() == "*"
    }

    /// Check the structural rules that hold regardless of dialect.
    pub fn validate(&self) -> Result<()> {
        if self.parts.is_empty() {
            return Err(Error::build("identifier cannot be empty"));
        }
        let last = self.parts.len() - 1;
        for (i, part) in self.parts.iter().enumerate() {
            if part.is_empty() {
                return Err(Error::build(format!(
                    "identifier '{}' has an empty part",
                    self.parts.join(".")
                )));
            }
            if part.contains('\0') {
                return Err(Error::build("identifier cannot contain NUL character"));
            }
            if part == "*" && i != last {
                return Err(Error::build(format!(
                    "wildcard must be the last part of '{}'",
                    self.parts.join(".")
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::parse(name)
    }
}

impl From<String> for Ident {
    fn from(name: String) -> Self {
        Ident::parse(&name)
    }
}

impl From<&String> for Ident {
    fn from(name: &String) -> Self {
        Ident::parse(name)
    }
}

/// Validate an alias (a single, unqualified name).
pub(crate) fn validate_alias(alias: &str) -> Result<()> {
    if alias.is_empty() {
        return Err(Error::build("alias cannot be empty"));
    }
    if alias.contains('\0') {
        return Err(Error::build("alias cannot contain NUL character"));
    }
    Ok(())
}

/// A table in a FROM, JOIN, INSERT, UPDATE or DELETE position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: Ident,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Give the table an alias (`users AS u`)
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.name.validate()?;
        if self.name.is_wildcard() {
            return Err(Error::build("a table name cannot be a wildcard"));
        }
        if let Some(alias) = &self.alias {
            validate_alias(alias)?;
        }
        Ok(())
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::new(name)
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::new(name)
    }
}

impl From<Ident> for TableRef {
    fn from(name: Ident) -> Self {
        TableRef::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified() {
        let ident = Ident::parse("public.users");
        assert_eq!(ident.parts(), &["public".to_string(), "users".to_string()]);
        assert_eq!(ident.name(), "users");
        assert_eq!(ident.to_string(), "public.users");
    }

    #[test]
    fn test_wildcards() {
        assert!(Ident::parse("*").is_wildcard());
        assert!(Ident::parse("users.*").is_wildcard());
        assert!(Ident::parse("users.*").validate().is_ok());
        assert!(Ident::parse("*.id").validate().is_err());
    }

    #[test]
    fn test_unqualified_keeps_dots() {
        let ident = Ident::unqualified("odd.name");
        assert_eq!(ident.parts().len(), 1);
        assert!(ident.validate().is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(Ident::parse("").validate().is_err());
        assert!(Ident::parse("users.").validate().is_err());
        assert!(Ident::parse("bad\0name").validate().is_err());
    }

    #[test]
    fn test_table_ref_alias() {
        let table = TableRef::from("users").alias("u");
        assert_eq!(table.alias.as_deref(), Some("u"));
        assert!(table.validate().is_ok());
        assert!(TableRef::from("users").alias("").validate().is_err());
        assert!(TableRef::from("*").validate().is_err());
    }
}
