//! sqlize - a lightweight SQL query builder
//!
//! Statements are built as persistent values: every clause method consumes the
//! builder and returns the extended one, so a base query can be cloned and
//! branched freely. Rendering is a pure function of the statement and a
//! [`Dialect`], producing SQL text plus the ordered bound parameters.
//!
//! ```
//! use sqlize::prelude::*;
//!
//! let recent_orders = select("user_id").from("orders").where_(gt("total", 100));
//!
//! let query = select(("id", "name"))
//!     .from("users")
//!     .where_(("active", true))
//!     .where_in("id", recent_orders)
//!     .order_by_desc("name");
//!
//! let rendered = query.render(&Dialect::postgres()).unwrap();
//! assert_eq!(
//!     rendered.sql,
//!     "SELECT id, name FROM users WHERE active = $1 AND id IN \
//!      (SELECT user_id FROM orders WHERE total > $2) ORDER BY name DESC"
//! );
//! assert_eq!(rendered.params, vec![Value::Bool(true), Value::I32(100)]);
//! ```
//!
//! The same builder renders for every dialect:
//!
//! ```
//! use sqlize::prelude::*;
//!
//! let query = select_all().from("order").where_(eq("userId", 7));
//! assert_eq!(
//!     query.to_sql(&Dialect::postgres()).unwrap(),
//!     r#"SELECT * FROM "order" WHERE "userId" = $1"#
//! );
//! assert_eq!(
//!     query.to_sql(&Dialect::mysql()).unwrap(),
//!     "SELECT * FROM `order` WHERE `userId` = ?"
//! );
//! ```

pub use sqlize_core::*;

/// Everything needed to build and render statements
pub mod prelude {
    pub use sqlize_core::{
        all_eq, and, avg, between, binary, cast, col, count, count_all, count_distinct,
        create_index, create_table, delete_from, drop_table, eq, exists, func, gt, gte, ilike,
        in_list, in_subquery, insert_into, is_not_null, is_null, like, lt, lte, max, min, ne,
        neg, not, not_between, not_exists, not_ilike, not_in, not_in_subquery, not_like, or, raw,
        raw_with, select, select_all, sum, table, update, val,
    };
    pub use sqlize_core::{
        op, ColumnDef, Dialect, Error, ErrorKind, Expr, ForeignKey, IntoExpr, JoinKind,
        NullsOrder, Query, QueryBuilder, ReferentialAction, RenderedQuery, Result,
        SortDirection, SqlType, Value,
    };
}
