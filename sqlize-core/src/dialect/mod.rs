//! Dialect adapters.
//!
//! A [`Dialect`] is an immutable value that supplies every piece of
//! dialect-variable text the renderer emits: identifier quoting, placeholder
//! markers, reserved words, type names, escaped DDL literals and the set of
//! constructs the database understands. Builders never embed dialect-specific
//! strings themselves, so the same statement renders for Postgres, MySQL or
//! SQLite by passing a different dialect to `render`.
//!
//! # Examples
//! ```
//! use sqlize_core::{Dialect, PlaceholderStyle};
//!
//! let pg = Dialect::postgres();
//! assert_eq!(pg.placeholder(2), "$2");
//!
//! let named = Dialect::builder(sqlize_core::DialectFamily::Sqlite)
//!     .name("sqlite-named")
//!     .placeholder(PlaceholderStyle::Named)
//!     .build();
//! assert_eq!(named.placeholder(1), ":p1");
//! ```

pub mod reserved;
pub mod types;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Value};
pub use types::SqlType;

/// The database family a dialect belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectFamily {
    Postgres,
    Mysql,
    Sqlite,
}

impl DialectFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectFamily::Postgres => "postgres",
            DialectFamily::Mysql => "mysql",
            DialectFamily::Sqlite => "sqlite",
        }
    }
}

/// How bound parameters are marked in SQL text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `$1, $2, ...`
    Numbered,
    /// `?` for every parameter
    Question,
    /// `:p1, :p2, ...`
    Named,
}

/// Constructs whose availability differs between dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    ILike,
    FullJoin,
    Returning,
    NullsOrdering,
    ForUpdate,
    PartialIndex,
    CreateIndexIfNotExists,
    DropCascade,
    ArrayLiteral,
    OffsetWithoutLimit,
    Jsonb,
}

impl Feature {
    fn description(&self) -> &'static str {
        match self {
            Feature::ILike => "ILIKE",
            Feature::FullJoin => "FULL OUTER JOIN",
            Feature::Returning => "RETURNING",
            Feature::NullsOrdering => "NULLS FIRST/LAST",
            Feature::ForUpdate => "FOR UPDATE",
            Feature::PartialIndex => "partial indexes (CREATE INDEX ... WHERE)",
            Feature::CreateIndexIfNotExists => "CREATE INDEX IF NOT EXISTS",
            Feature::DropCascade => "DROP TABLE ... CASCADE",
            Feature::ArrayLiteral => "array literals",
            Feature::OffsetWithoutLimit => "OFFSET without LIMIT",
            Feature::Jsonb => "JSONB",
        }
    }
}

/// SQL dialect: quoting, placeholder, reserved-word and type-name rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    name: String,
    family: DialectFamily,
    quote: (char, char),
    placeholder: PlaceholderStyle,
    reserved: BTreeSet<String>,
    always_quote: bool,
    type_overrides: BTreeMap<String, String>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::postgres()
    }
}

impl Dialect {
    /// PostgreSQL: `"ident"`, `$n` placeholders
    pub fn postgres() -> Self {
        Self::for_family(DialectFamily::Postgres)
    }

    /// MySQL: `` `ident` ``, `?` placeholders
    pub fn mysql() -> Self {
        Self::for_family(DialectFamily::Mysql)
    }

    /// SQLite: `"ident"`, `?` placeholders
    pub fn sqlite() -> Self {
        Self::for_family(DialectFamily::Sqlite)
    }

    fn for_family(family: DialectFamily) -> Self {
        let (quote, placeholder, words) = match family {
            DialectFamily::Postgres => (
                ('"', '"'),
                PlaceholderStyle::Numbered,
                reserved::POSTGRES_RESERVED_WORDS,
            ),
            DialectFamily::Mysql => (
                ('`', '`'),
                PlaceholderStyle::Question,
                reserved::MYSQL_RESERVED_WORDS,
            ),
            DialectFamily::Sqlite => (
                ('"', '"'),
                PlaceholderStyle::Question,
                reserved::SQLITE_RESERVED_WORDS,
            ),
        };
        Self {
            name: family.as_str().to_string(),
            family,
            quote,
            placeholder,
            reserved: words.iter().map(|w| w.to_string()).collect(),
            always_quote: false,
            type_overrides: BTreeMap::new(),
        }
    }

    /// Start customizing a dialect from a family's defaults
    pub fn builder(family: DialectFamily) -> DialectBuilder {
        DialectBuilder::new(family)
    }

    /// Load a dialect from a JSON [`DialectConfig`] document
    ///
    /// ```
    /// use sqlize_core::Dialect;
    ///
    /// let dialect = Dialect::from_json(r#"{ "family": "postgres", "always_quote": true }"#).unwrap();
    /// assert_eq!(dialect.render_ident_part("users"), "\"users\"");
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DialectConfig = serde_json::from_str(json)?;
        let dialect = config.into_dialect()?;
        tracing::debug!(
            dialect = %dialect.name,
            family = dialect.family.as_str(),
            "loaded dialect configuration"
        );
        Ok(dialect)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> DialectFamily {
        self.family
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(&word.to_ascii_uppercase())
    }

    /// Whether an identifier part must be quoted in this dialect
    pub fn needs_quoting(&self, part: &str) -> bool {
        if self.always_quote || self.is_reserved(part) {
            return true;
        }
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() || c == '_' => {}
            _ => return true,
        }
        !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
    }

    /// Quote an identifier part unconditionally, doubling embedded quote characters
    pub fn quote_identifier(&self, part: &str) -> String {
        let (open, close) = self.quote;
        let mut quoted = String::with_capacity(part.len() + 2);
        quoted.push(open);
        for c in part.chars() {
            if c == close {
                quoted.push(close);
            }
            quoted.push(c);
        }
        quoted.push(close);
        quoted
    }

    /// Render one identifier part, quoting only when needed
    pub fn render_ident_part(&self, part: &str) -> String {
        if part == "*" {
            "*".to_string()
        } else if self.needs_quoting(part) {
            self.quote_identifier(part)
        } else {
            part.to_string()
        }
    }

    /// Placeholder marker for the `index`-th (1-based) parameter
    pub fn placeholder(&self, index: usize) -> String {
        match self.placeholder {
            PlaceholderStyle::Numbered => format!("${}", index),
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Named => format!(":p{}", index),
        }
    }

    pub fn supports(&self, feature: Feature) -> bool {
        use DialectFamily::*;
        match feature {
            Feature::ILike | Feature::ArrayLiteral | Feature::Jsonb => self.family == Postgres,
            Feature::FullJoin
            | Feature::Returning
            | Feature::NullsOrdering
            | Feature::PartialIndex
            | Feature::CreateIndexIfNotExists
            | Feature::OffsetWithoutLimit => self.family != Mysql,
            Feature::ForUpdate => self.family != Sqlite,
            Feature::DropCascade => self.family != Sqlite,
        }
    }

    /// Fail with a dialect error when `feature` is not supported
    pub fn require(&self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            return Ok(());
        }
        tracing::trace!(dialect = %self.name, feature = ?feature, "unsupported construct");
        Err(Error::dialect(
            self.name.clone(),
            format!("{} is not supported", feature.description()),
        ))
    }

    /// Boolean literal text (`TRUE` / `FALSE`, or `1` / `0` on SQLite)
    pub fn boolean_literal(&self, value: bool) -> &'static str {
        match (self.family, value) {
            (DialectFamily::Sqlite, true) => "1",
            (DialectFamily::Sqlite, false) => "0",
            (_, true) => "TRUE",
            (_, false) => "FALSE",
        }
    }

    /// Clause to emit in place of LIMIT when only OFFSET is set
    pub(crate) fn limit_for_bare_offset(&self) -> Result<Option<&'static str>> {
        self.require(Feature::OffsetWithoutLimit)?;
        Ok(match self.family {
            DialectFamily::Sqlite => Some("LIMIT -1"),
            _ => None,
        })
    }

    /// Whether string concatenation must be spelled `CONCAT(a, b)`
    pub(crate) fn concat_as_function(&self) -> bool {
        self.family == DialectFamily::Mysql
    }

    /// Column attribute for auto-incrementing keys
    pub(crate) fn auto_increment(&self) -> &'static str {
        match self.family {
            DialectFamily::Postgres => "GENERATED BY DEFAULT AS IDENTITY",
            DialectFamily::Mysql => "AUTO_INCREMENT",
            DialectFamily::Sqlite => "AUTOINCREMENT",
        }
    }

    /// Concrete type name for a portable [`SqlType`]
    pub fn type_name(&self, ty: &SqlType) -> Result<String> {
        if let SqlType::Custom(name) = ty {
            validate_custom_type(name)?;
            return Ok(name.clone());
        }
        let key = ty.key().unwrap_or_default();
        let base = match self.type_overrides.get(key) {
            Some(name) => name.clone(),
            None => self.builtin_type_name(ty)?.to_string(),
        };
        Ok(format!("{}{}", base, ty.modifiers()))
    }

    fn builtin_type_name(&self, ty: &SqlType) -> Result<&'static str> {
        use DialectFamily::*;
        let name = match (self.family, ty) {
            (_, SqlType::SmallInt) if self.family != Sqlite => "SMALLINT",
            (Postgres, SqlType::Integer) => "INTEGER",
            (Mysql, SqlType::Integer) => "INT",
            (Sqlite, SqlType::SmallInt | SqlType::Integer | SqlType::BigInt) => "INTEGER",
            (_, SqlType::BigInt) => "BIGINT",
            (Mysql, SqlType::Real) => "FLOAT",
            (_, SqlType::Real) => "REAL",
            (Postgres, SqlType::Double) => "DOUBLE PRECISION",
            (Mysql, SqlType::Double) => "DOUBLE",
            (Sqlite, SqlType::Double) => "REAL",
            (Sqlite, SqlType::Decimal { .. }) => "NUMERIC",
            (_, SqlType::Decimal { .. }) => "DECIMAL",
            (_, SqlType::Boolean) => "BOOLEAN",
            (_, SqlType::Text) => "TEXT",
            (_, SqlType::Varchar(_)) => "VARCHAR",
            (_, SqlType::Char(_)) => "CHAR",
            (Postgres, SqlType::Bytes) => "BYTEA",
            (_, SqlType::Bytes) => "BLOB",
            (_, SqlType::Date) => "DATE",
            (_, SqlType::Time) => "TIME",
            (Postgres, SqlType::Timestamp) => "TIMESTAMP",
            (Postgres, SqlType::TimestampTz) => "TIMESTAMPTZ",
            (Mysql, SqlType::Timestamp) => "DATETIME",
            (Mysql, SqlType::TimestampTz) => "TIMESTAMP",
            (Sqlite, SqlType::Timestamp | SqlType::TimestampTz) => "DATETIME",
            (Postgres, SqlType::Uuid) => "UUID",
            (Mysql, SqlType::Uuid) => "CHAR(36)",
            (Sqlite, SqlType::Uuid) => "TEXT",
            (Sqlite, SqlType::Json) => "TEXT",
            (_, SqlType::Json) => "JSON",
            (Postgres, SqlType::Jsonb) => "JSONB",
            (_, SqlType::Jsonb) => {
                self.require(Feature::Jsonb)?;
                unreachable_type(ty)?
            }
            (_, SqlType::SmallInt | SqlType::Custom(_)) => unreachable_type(ty)?,
        };
        Ok(name)
    }

    /// Render a value as an escaped SQL literal.
    ///
    /// Only used where databases refuse bind parameters (DDL defaults,
    /// CHECK constraints, partial index predicates).
    pub fn literal(&self, value: &Value) -> Result<String> {
        let literal = match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.boolean_literal(*b).to_string(),
            Value::I32(n) => n.to_string(),
            Value::I64(n) => n.to_string(),
            Value::F32(f) => self.float_literal(f64::from(*f))?,
            Value::F64(f) => self.float_literal(*f)?,
            Value::String(s) => self.string_literal(s)?,
            Value::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                match self.family {
                    DialectFamily::Postgres => format!("'\\x{}'", hex),
                    _ => format!("X'{}'", hex),
                }
            }
            Value::Json(json) => self.string_literal(&serde_json::to_string(json)?)?,
            Value::Array(items) => {
                self.require(Feature::ArrayLiteral)?;
                let items = items
                    .iter()
                    .map(|item| self.literal(item))
                    .collect::<Result<Vec<_>>>()?;
                format!("ARRAY[{}]", items.join(", "))
            }
            #[cfg(feature = "uuid-support")]
            Value::Uuid(uuid) => self.string_literal(&uuid.hyphenated().to_string())?,
            #[cfg(feature = "datetime-support")]
            Value::Date(date) => self.string_literal(&date.to_string())?,
            #[cfg(feature = "datetime-support")]
            Value::DateTime(dt) => self.string_literal(&dt.to_string())?,
            #[cfg(feature = "datetime-support")]
            Value::Timestamp(ts) => self.string_literal(&format!("{}+00:00", ts.naive_utc()))?,
            #[cfg(feature = "decimal-support")]
            Value::Decimal(d) => d.to_string(),
        };
        Ok(literal)
    }

    /// Quote a string literal, doubling single quotes (and backslashes on MySQL)
    pub fn string_literal(&self, s: &str) -> Result<String> {
        if s.contains('\0') {
            return Err(Error::build("string literal cannot contain NUL character"));
        }
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for c in s.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' if self.family == DialectFamily::Mysql => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('\'');
        Ok(out)
    }

    fn float_literal(&self, f: f64) -> Result<String> {
        if !f.is_finite() {
            return Err(Error::dialect(
                self.name.clone(),
                format!("non-finite float {} has no literal form", f),
            ));
        }
        Ok(f.to_string())
    }
}

fn unreachable_type(ty: &SqlType) -> Result<&'static str> {
    Err(Error::build(format!("no builtin type name for {:?}", ty)))
}

/// Custom type names are emitted as written. Statement separators and comment
/// markers are rejected, and parentheses must balance.
fn validate_custom_type(name: &str) -> Result<()> {
    let invalid = || Error::build(format!("invalid custom type name '{}'", name));
    if name.trim().is_empty()
        || name.contains(';')
        || name.contains('\0')
        || name.contains("--")
        || name.contains("/*")
        || name.contains("*/")
    {
        return Err(invalid());
    }
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(invalid)?,
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid());
    }
    Ok(())
}

/// Builder for [`Dialect`]
#[derive(Debug)]
pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    /// Create a new builder starting from the family defaults
    pub fn new(family: DialectFamily) -> Self {
        Self {
            dialect: Dialect::for_family(family),
        }
    }

    /// Set the dialect name used in error messages and logs
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.dialect.name = name.into();
        self
    }

    /// Set the placeholder style
    pub fn placeholder(mut self, style: PlaceholderStyle) -> Self {
        self.dialect.placeholder = style;
        self
    }

    /// Quote every identifier, not just reserved or mixed-case ones
    pub fn always_quote(mut self, enabled: bool) -> Self {
        self.dialect.always_quote = enabled;
        self
    }

    /// Add an extra reserved word
    pub fn reserved_word(mut self, word: &str) -> Self {
        self.dialect.reserved.insert(word.to_ascii_uppercase());
        self
    }

    /// Override the base type name rendered for `ty`; length and precision
    /// modifiers are still appended. Custom types cannot be overridden.
    pub fn type_override(mut self, ty: &SqlType, name: impl Into<String>) -> Self {
        if let Some(key) = ty.key() {
            self.dialect.type_overrides.insert(key.to_string(), name.into());
        }
        self
    }

    pub fn build(self) -> Dialect {
        self.dialect
    }
}

/// Serializable dialect configuration, see [`Dialect::from_json`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectConfig {
    pub family: DialectFamily,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub placeholder: Option<PlaceholderStyle>,
    #[serde(default)]
    pub always_quote: Option<bool>,
    #[serde(default)]
    pub reserved_words: Vec<String>,
    /// Keyed by [`SqlType::KEYS`]
    #[serde(default)]
    pub type_overrides: BTreeMap<String, String>,
}

impl DialectConfig {
    pub fn into_dialect(self) -> Result<Dialect> {
        let mut dialect = Dialect::for_family(self.family);
        if let Some(name) = self.name {
            if name.is_empty() {
                return Err(Error::config("dialect name cannot be empty"));
            }
            dialect.name = name;
        }
        if let Some(style) = self.placeholder {
            dialect.placeholder = style;
        }
        if let Some(always_quote) = self.always_quote {
            dialect.always_quote = always_quote;
        }
        for word in self.reserved_words {
            if word.is_empty() {
                return Err(Error::config("reserved word cannot be empty"));
            }
            dialect.reserved.insert(word.to_ascii_uppercase());
        }
        for (key, name) in self.type_overrides {
            if !SqlType::KEYS.contains(&key.as_str()) {
                return Err(Error::config(format!(
                    "unknown type key '{}' in type_overrides (expected one of: {})",
                    key,
                    SqlType::KEYS.join(", ")
                )));
            }
            if name.trim().is_empty() {
                return Err(Error::config(format!("empty type name for '{}'", key)));
            }
            dialect.type_overrides.insert(key, name);
        }
        Ok(dialect)
    }
}
