//! Portable column types for DDL rendering and CAST expressions

use serde::{Deserialize, Serialize};

/// A dialect-independent SQL type. The concrete type name is chosen by
/// [`Dialect::type_name`](super::Dialect::type_name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal { precision: u32, scale: u32 },
    Boolean,
    Text,
    Varchar(u32),
    Char(u32),
    Bytes,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    Jsonb,
    /// A type name passed through verbatim (e.g. `GEOMETRY(Point, 4326)`).
    /// Names containing `;`, comment markers or unbalanced parentheses are
    /// rejected at render time.
    Custom(String),
}

impl SqlType {
    /// Keys accepted in `type_overrides` of a dialect configuration
    pub const KEYS: &'static [&'static str] = &[
        "smallint",
        "integer",
        "bigint",
        "real",
        "double",
        "decimal",
        "boolean",
        "text",
        "varchar",
        "char",
        "bytes",
        "date",
        "time",
        "timestamp",
        "timestamptz",
        "uuid",
        "json",
        "jsonb",
    ];

    /// Stable lowercase key for this type; `None` for custom types
    pub fn key(&self) -> Option<&'static str> {
        let key = match self {
            SqlType::SmallInt => "smallint",
            SqlType::Integer => "integer",
            SqlType::BigInt => "bigint",
            SqlType::Real => "real",
            SqlType::Double => "double",
            SqlType::Decimal { .. } => "decimal",
            SqlType::Boolean => "boolean",
            SqlType::Text => "text",
            SqlType::Varchar(_) => "varchar",
            SqlType::Char(_) => "char",
            SqlType::Bytes => "bytes",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Timestamp => "timestamp",
            SqlType::TimestampTz => "timestamptz",
            SqlType::Uuid => "uuid",
            SqlType::Json => "json",
            SqlType::Jsonb => "jsonb",
            SqlType::Custom(_) => return None,
        };
        Some(key)
    }

    /// Length/precision suffix appended after the base type name
    pub(crate) fn modifiers(&self) -> String {
        match self {
            SqlType::Decimal { precision, scale } => format!("({}, {})", precision, scale),
            SqlType::Varchar(len) | SqlType::Char(len) => format!("({})", len),
            _ => String::new(),
        }
    }
}
