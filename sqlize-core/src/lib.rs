//! sqlize core - statement builders and the dialect-aware SQL renderer
//!
//! This crate provides the core functionality for building SQL statements as
//! persistent values and rendering them to SQL text plus ordered parameters
//! for PostgreSQL, MySQL or SQLite.
//!
//! ```
//! use sqlize_core::{eq, select, Dialect, QueryBuilder, Value};
//!
//! let query = select(["id", "name"]).from("users").where_(eq("age", 30)).limit(10);
//! let rendered = query.render(&Dialect::postgres()).unwrap();
//! assert_eq!(rendered.sql, "SELECT id, name FROM users WHERE age = $1 LIMIT 10");
//! assert_eq!(rendered.params, vec![Value::I32(30)]);
//! ```

pub mod builder;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod ident;
pub mod operator;
pub mod query;
pub mod render;
pub mod value;

// Re-export main types
pub use builder::{
    ColumnDef, CreateIndexBuilder, CreateTableBuilder, DeleteBuilder, DropTableBuilder,
    ForeignKey, InsertBuilder, IntoColumns, IntoCondition, IntoInsertData, IntoSelectItems,
    IntoUpdateData, Join, JoinKind, NullsOrder, OrderBy, QueryBuilder, ReferentialAction, Row,
    SelectBuilder, SelectItem, SortDirection, StatementKind, TableSource, UpdateBuilder,
};
pub use dialect::{
    Dialect, DialectBuilder, DialectConfig, DialectFamily, Feature, PlaceholderStyle, SqlType,
};
pub use error::{Error, ErrorKind, Result};
pub use expr::{
    all_eq, and, avg, between, binary, cast, col, count, count_all, count_distinct, eq, exists,
    func, gt, gte, ilike, in_list, in_subquery, is_not_null, is_null, like, lt, lte, max, min,
    ne, neg, not, not_between, not_exists, not_ilike, not_in, not_in_subquery, not_like, or, raw,
    raw_with, sum, val, Expr, IntoColumnExpr, IntoExpr,
};
pub use ident::{Ident, TableRef};
pub use operator::{op, BinaryOp, UnaryOp};
pub use query::Query;
pub use render::{RenderedQuery, Renderer};
pub use value::Value;

/// Start a SELECT with the given items
pub fn select<T: IntoSelectItems>(items: T) -> SelectBuilder {
    SelectBuilder::new().columns(items)
}

/// Start a `SELECT *`
pub fn select_all() -> SelectBuilder {
    SelectBuilder::new()
}

/// Start a `SELECT *` from the given table
pub fn table(source: impl Into<TableSource>) -> SelectBuilder {
    SelectBuilder::new().from(source)
}

/// Create a new INSERT query builder for the given table
pub fn insert_into(table: impl Into<TableRef>) -> InsertBuilder {
    InsertBuilder::new(table)
}

/// Create a new UPDATE query builder for the given table
pub fn update(table: impl Into<TableRef>) -> UpdateBuilder {
    UpdateBuilder::new(table)
}

/// Create a new DELETE query builder for the given table
pub fn delete_from(table: impl Into<TableRef>) -> DeleteBuilder {
    DeleteBuilder::new(table)
}

pub fn create_table(name: &str) -> CreateTableBuilder {
    CreateTableBuilder::new(name)
}

pub fn create_index(name: &str) -> CreateIndexBuilder {
    CreateIndexBuilder::new(name)
}

pub fn drop_table(name: &str) -> DropTableBuilder {
    DropTableBuilder::new(name)
}
