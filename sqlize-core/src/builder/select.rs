//! SELECT query builder implementation

use crate::expr::{col, eq, exists, in_subquery, Expr, IntoColumnExpr};
use crate::render::Renderer;
use crate::{Error, Feature, Result};

use super::common::{
    conjoin, disjoin, IntoColumns, IntoCondition, IntoSelectItems, Join, JoinKind, NullsOrder,
    OrderBy, QueryBuilder, SelectItem, SortDirection, StatementKind, TableSource,
};

/// SELECT query builder.
///
/// Every method consumes the builder and returns the extended one; clone a
/// builder to branch it.
///
/// ```
/// use sqlize_core::{eq, select, Dialect, QueryBuilder};
///
/// let query = select(["id", "name"]).from("users").where_(eq("age", 30)).limit(10);
/// let rendered = query.render(&Dialect::postgres()).unwrap();
/// assert_eq!(rendered.sql, "SELECT id, name FROM users WHERE age = $1 LIMIT 10");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectBuilder {
    items: Vec<SelectItem>,
    distinct: bool,
    sources: Vec<TableSource>,
    joins: Vec<Join>,
    where_clause: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    for_update: bool,
}

impl SelectBuilder {
    /// Create an empty SELECT; without items it selects `*`
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one select item
    pub fn column(mut self, item: impl Into<SelectItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Append select items
    pub fn columns<T>(mut self, items: T) -> Self
    where
        T: IntoSelectItems,
    {
        self.items.extend(items.into_select_items());
        self
    }

    /// Select only distinct rows
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append a FROM source; several sources are comma separated
    pub fn from(mut self, table: impl Into<TableSource>) -> Self {
        self.sources.push(table.into());
        self
    }

    /// Append a derived table: `FROM (SELECT ...) AS alias`
    pub fn from_subquery(mut self, query: SelectBuilder, alias: &str) -> Self {
        self.sources.push(query.as_table(alias));
        self
    }

    /// Use this query as a derived table in another query's FROM or JOIN
    pub fn as_table(self, alias: &str) -> TableSource {
        TableSource::Subquery {
            query: Box::new(self),
            alias: alias.to_string(),
        }
    }

    /// Append a JOIN clause.
    ///
    /// CROSS joins must not have an ON condition; every other kind must.
    pub fn join(
        mut self,
        kind: JoinKind,
        table: impl Into<TableSource>,
        on: Option<Expr>,
    ) -> Result<Self> {
        self.joins.push(Join::new(kind, table, on)?);
        Ok(self)
    }

    fn join_columns(
        mut self,
        kind: JoinKind,
        table: impl Into<TableSource>,
        left_column: &str,
        right_column: &str,
    ) -> Self {
        self.joins.push(Join {
            kind,
            source: table.into(),
            on: Some(eq(left_column, col(right_column))),
        });
        self
    }

    /// Add an INNER JOIN clause on `left_column = right_column`
    pub fn inner_join(
        self,
        table: impl Into<TableSource>,
        left_column: &str,
        right_column: &str,
    ) -> Self {
        self.join_columns(JoinKind::Inner, table, left_column, right_column)
    }

    /// Add a LEFT JOIN clause on `left_column = right_column`
    pub fn left_join(
        self,
        table: impl Into<TableSource>,
        left_column: &str,
        right_column: &str,
    ) -> Self {
        self.join_columns(JoinKind::Left, table, left_column, right_column)
    }

    /// Add a RIGHT JOIN clause on `left_column = right_column`
    pub fn right_join(
        self,
        table: impl Into<TableSource>,
        left_column: &str,
        right_column: &str,
    ) -> Self {
        self.join_columns(JoinKind::Right, table, left_column, right_column)
    }

    /// Add a FULL OUTER JOIN clause on `left_column = right_column`
    pub fn full_join(
        self,
        table: impl Into<TableSource>,
        left_column: &str,
        right_column: &str,
    ) -> Self {
        self.join_columns(JoinKind::Full, table, left_column, right_column)
    }

    /// Add a CROSS JOIN clause
    pub fn cross_join(mut self, table: impl Into<TableSource>) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            source: table.into(),
            on: None,
        });
        self
    }

    /// Add a WHERE condition, conjoined with AND to any existing one
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_clause = conjoin(self.where_clause, condition.into_condition());
        self
    }

    /// Add an AND WHERE condition (same as where_)
    pub fn and_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_(condition)
    }

    /// Make the WHERE clause `(existing) OR condition`
    pub fn or_where<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_clause = disjoin(self.where_clause, condition.into_condition());
        self
    }

    /// Add a WHERE IN condition with a subquery
    pub fn where_in(self, column: &str, subquery: SelectBuilder) -> Self {
        self.where_(in_subquery(column, subquery))
    }

    /// Add a WHERE EXISTS condition with a subquery
    pub fn where_exists(self, subquery: SelectBuilder) -> Self {
        self.where_(exists(subquery))
    }

    /// Append GROUP BY columns
    pub fn group_by<C>(mut self, columns: C) -> Self
    where
        C: IntoColumns,
    {
        self.group_by
            .extend(columns.into_columns().iter().map(|column| col(column)));
        self
    }

    /// Append a GROUP BY expression
    pub fn group_by_expr(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    /// Add a HAVING condition, conjoined with AND to any existing one
    pub fn having<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.having = conjoin(self.having, condition.into_condition());
        self
    }

    /// Make the HAVING clause `(existing) OR condition`
    pub fn or_having<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.having = disjoin(self.having, condition.into_condition());
        self
    }

    /// Append an ORDER BY term
    pub fn order_by(mut self, column: impl IntoColumnExpr, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            expr: column.into_column_expr(),
            direction,
            nulls: None,
        });
        self
    }

    /// Append an ascending ORDER BY term
    pub fn order_by_asc(self, column: impl IntoColumnExpr) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    /// Append a descending ORDER BY term
    pub fn order_by_desc(self, column: impl IntoColumnExpr) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    /// Append an ORDER BY term with explicit NULLS FIRST / NULLS LAST
    pub fn order_by_nulls(
        mut self,
        column: impl IntoColumnExpr,
        direction: SortDirection,
        nulls: NullsOrder,
    ) -> Self {
        self.order_by.push(OrderBy {
            expr: column.into_column_expr(),
            direction,
            nulls: Some(nulls),
        });
        self
    }

    /// Set the LIMIT; a later call replaces an earlier one
    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    /// Set the OFFSET; a later call replaces an earlier one
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Lock the selected rows (`FOR UPDATE`)
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    pub fn items(&self) -> &[SelectItem] {
        &self.items
    }

    pub fn where_clause(&self) -> Option<&Expr> {
        self.where_clause.as_ref()
    }

    fn check_sources(&self) -> Result<()> {
        if !self.sources.is_empty() {
            return Ok(());
        }
        if !self.joins.is_empty() {
            return Err(Error::usage("SELECT with JOIN requires a FROM source"));
        }
        if self.items.is_empty() {
            return Err(Error::usage("SELECT * requires a FROM source"));
        }
        if self.items.iter().any(|item| item.expr.references_columns()) {
            return Err(Error::usage(
                "SELECT references columns but has no FROM source",
            ));
        }
        Ok(())
    }
}

impl QueryBuilder for SelectBuilder {
    fn statement_kind(&self) -> StatementKind {
        StatementKind::Select
    }

    fn render_into(&self, r: &mut Renderer<'_>) -> Result<()> {
        self.check_sources()?;

        r.push("SELECT ");
        if self.distinct {
            r.push("DISTINCT ");
        }
        if self.items.is_empty() {
            r.push("*");
        } else {
            r.write_list(&self.items, |r, item| item.render(r))?;
        }

        if !self.sources.is_empty() {
            r.push(" FROM ");
            r.write_list(&self.sources, |r, source| source.render(r))?;
        }

        for join in &self.joins {
            r.push(" ");
            join.render(r)?;
        }

        if let Some(condition) = &self.where_clause {
            r.push(" WHERE ");
            r.write_expr(condition)?;
        }

        if !self.group_by.is_empty() {
            r.push(" GROUP BY ");
            r.write_list(&self.group_by, |r, expr| r.write_expr(expr))?;
        }

        if let Some(condition) = &self.having {
            r.push(" HAVING ");
            r.write_expr(condition)?;
        }

        if !self.order_by.is_empty() {
            r.push(" ORDER BY ");
            r.write_list(&self.order_by, |r, term| term.render(r))?;
        }

        match (self.limit, self.offset) {
            (Some(limit), _) => r.push(&format!(" LIMIT {}", limit)),
            (None, Some(_)) => {
                if let Some(clause) = r.dialect().limit_for_bare_offset()? {
                    r.push(" ");
                    r.push(clause);
                }
            }
            (None, None) => {}
        }
        if let Some(offset) = self.offset {
            r.push(&format!(" OFFSET {}", offset));
        }

        if self.for_update {
            r.dialect().require(Feature::ForUpdate)?;
            r.push(" FOR UPDATE");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{and, count_all, gt, or, IntoExpr};
    use crate::operator::op;
    use crate::{select, select_all, table, Dialect, ErrorKind, TableRef, Value};

    fn pg(query: &SelectBuilder) -> String {
        query.to_sql(&Dialect::postgres()).unwrap()
    }

    #[test]
    fn test_basic_select() {
        assert_eq!(pg(&table("users")), "SELECT * FROM users");
        assert_eq!(pg(&select_all().from("users")), "SELECT * FROM users");
    }

    #[test]
    fn test_select_columns() {
        let query = select(("id", "name")).from("users");
        assert_eq!(pg(&query), "SELECT id, name FROM users");
    }

    #[test]
    fn test_columns_append() {
        let query = select("id").from("users").columns(["name", "email"]).column("age");
        assert_eq!(pg(&query), "SELECT id, name, email, age FROM users");
    }

    #[test]
    fn test_select_with_where() {
        let query = table("users").where_(("age", op::GT, 18));
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.sql, "SELECT * FROM users WHERE age > $1");
        assert_eq!(rendered.params, vec![Value::I32(18)]);
    }

    #[test]
    fn test_multiple_where_conditions() {
        let query = table("users")
            .where_(("age", op::GT, 18))
            .and_where(("name", "John"));
        assert_eq!(pg(&query), "SELECT * FROM users WHERE age > $1 AND name = $2");
    }

    #[test]
    fn test_or_where_wraps_existing_predicate() {
        let query = table("users")
            .where_(("age", op::GT, 18))
            .where_(("active", true))
            .or_where(("status", "admin"));
        assert_eq!(
            pg(&query),
            "SELECT * FROM users WHERE (age > $1 AND active = $2) OR status = $3"
        );
    }

    #[test]
    fn test_or_where_without_existing_predicate() {
        let query = table("users").or_where(("status", "admin"));
        assert_eq!(pg(&query), "SELECT * FROM users WHERE status = $1");
    }

    #[test]
    fn test_limit_and_offset() {
        let query = table("users").limit(10).offset(5);
        assert_eq!(pg(&query), "SELECT * FROM users LIMIT 10 OFFSET 5");
    }

    #[test]
    fn test_limit_last_call_wins() {
        let query = table("users").limit(10).limit(20);
        assert_eq!(pg(&query), "SELECT * FROM users LIMIT 20");
    }

    #[test]
    fn test_offset_without_limit() {
        let query = table("users").offset(5);
        assert_eq!(pg(&query), "SELECT * FROM users OFFSET 5");
        assert_eq!(
            query.to_sql(&Dialect::sqlite()).unwrap(),
            "SELECT * FROM users LIMIT -1 OFFSET 5"
        );
        let err = query.render(&Dialect::mysql()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dialect);
    }

    #[test]
    fn test_inner_join() {
        let query = table("users").inner_join("profiles", "users.id", "profiles.user_id");
        assert_eq!(
            pg(&query),
            "SELECT * FROM users INNER JOIN profiles ON users.id = profiles.user_id"
        );
    }

    #[test]
    fn test_left_and_right_join() {
        let query = table("users").left_join("profiles", "users.id", "profiles.user_id");
        assert_eq!(
            pg(&query),
            "SELECT * FROM users LEFT JOIN profiles ON users.id = profiles.user_id"
        );
        let query = table("users").right_join("profiles", "users.id", "profiles.user_id");
        assert_eq!(
            pg(&query),
            "SELECT * FROM users RIGHT JOIN profiles ON users.id = profiles.user_id"
        );
    }

    #[test]
    fn test_join_with_expression() {
        let query = table(TableRef::new("users").alias("u"))
            .join(
                JoinKind::Left,
                TableRef::new("orders").alias("o"),
                Some(and([eq("o.user_id", col("u.id")), gt("o.total", 100)])),
            )
            .unwrap();
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(
            rendered.sql,
            "SELECT * FROM users AS u LEFT JOIN orders AS o ON o.user_id = u.id AND o.total > $1"
        );
    }

    #[test]
    fn test_join_requires_condition() {
        let err = table("users").join(JoinKind::Inner, "orders", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
        let query = table("users").join(JoinKind::Cross, "orders", None).unwrap();
        assert_eq!(pg(&query), "SELECT * FROM users CROSS JOIN orders");
    }

    #[test]
    fn test_full_join_not_on_mysql() {
        let query = table("a").full_join("b", "a.id", "b.id");
        assert_eq!(pg(&query), "SELECT * FROM a FULL OUTER JOIN b ON a.id = b.id");
        assert!(query.render(&Dialect::mysql()).is_err());
    }

    #[test]
    fn test_order_by_with_direction() {
        let query = table("users").order_by("name", SortDirection::Desc);
        assert_eq!(pg(&query), "SELECT * FROM users ORDER BY name DESC");

        let query = table("users").order_by_asc("name").order_by_desc("created_at");
        assert_eq!(pg(&query), "SELECT * FROM users ORDER BY name ASC, created_at DESC");
    }

    #[test]
    fn test_order_by_nulls() {
        let query = table("users").order_by_nulls("last_login", SortDirection::Desc, NullsOrder::Last);
        assert_eq!(pg(&query), "SELECT * FROM users ORDER BY last_login DESC NULLS LAST");
        assert!(query.render(&Dialect::mysql()).is_err());
    }

    #[test]
    fn test_group_by_and_having() {
        let query = select(("department", count_all().alias("n")))
            .from("users")
            .group_by(("department", "status"))
            .having(gt(count_all(), 5));
        assert_eq!(
            pg(&query),
            "SELECT department, COUNT(*) AS n FROM users GROUP BY department, status HAVING COUNT(*) > $1"
        );
    }

    #[test]
    fn test_or_having() {
        let query = table("users")
            .group_by("department")
            .having(gt(count_all(), 5))
            .or_having(eq("department", "ops"));
        assert_eq!(
            pg(&query),
            "SELECT * FROM users GROUP BY department HAVING COUNT(*) > $1 OR department = $2"
        );
    }

    #[test]
    fn test_distinct_basic() {
        let query = select("status").distinct().from("users");
        assert_eq!(pg(&query), "SELECT DISTINCT status FROM users");
    }

    #[test]
    fn test_where_in_subquery_numbering() {
        let inner = select("user_id").from("orders").where_(gt("total", 100));
        let query = select("name")
            .from("users")
            .where_(("active", true))
            .where_in("id", inner)
            .limit(5);
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(
            rendered.sql,
            "SELECT name FROM users WHERE active = $1 AND id IN (SELECT user_id FROM orders WHERE total > $2) LIMIT 5"
        );
        assert_eq!(rendered.params, vec![Value::Bool(true), Value::I32(100)]);
    }

    #[test]
    fn test_where_exists() {
        let inner = select_all().from("orders").where_(eq("orders.user_id", col("users.id")));
        let query = select("id").from("users").where_exists(inner);
        assert_eq!(
            pg(&query),
            "SELECT id FROM users WHERE EXISTS (SELECT * FROM orders WHERE orders.user_id = users.id)"
        );
    }

    #[test]
    fn test_from_subquery() {
        let inner = select(("user_id", count_all().alias("n"))).from("orders").group_by("user_id");
        let query = select_all().from_subquery(inner, "counts").where_(gt("n", 3));
        assert_eq!(
            pg(&query),
            "SELECT * FROM (SELECT user_id, COUNT(*) AS n FROM orders GROUP BY user_id) AS counts WHERE n > $1"
        );
    }

    #[test]
    fn test_scalar_subquery_in_select_list() {
        let latest = select(crate::expr::max("created_at"))
            .from("orders")
            .where_(eq("orders.user_id", col("u.id")));
        let query = select(("u.id", latest.into_expr().alias("last_order")))
            .from(TableRef::new("users").alias("u"));
        assert_eq!(
            pg(&query),
            "SELECT u.id, (SELECT MAX(created_at) FROM orders WHERE orders.user_id = u.id) AS last_order FROM users AS u"
        );
    }

    #[test]
    fn test_for_update() {
        let query = table("accounts").where_(("id", 1)).for_update();
        assert_eq!(pg(&query), "SELECT * FROM accounts WHERE id = $1 FOR UPDATE");
        assert!(query.render(&Dialect::sqlite()).is_err());
    }

    #[test]
    fn test_missing_source_is_usage_error() {
        let err = select("id").render(&Dialect::postgres()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        let err = select_all().render(&Dialect::postgres()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        // constant selects need no source
        let rendered = select(crate::expr::val(1).alias("one")).render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.sql, "SELECT $1 AS one");
    }

    #[test]
    fn test_reserved_words_are_quoted() {
        let query = select(("order", "user")).from("group");
        assert_eq!(pg(&query), "SELECT \"order\", \"user\" FROM \"group\"");
        assert_eq!(
            query.to_sql(&Dialect::mysql()).unwrap(),
            "SELECT `order`, user FROM `group`"
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        let query = table("users").where_(or([eq("a", 1), eq("b", 2)])).limit(3);
        let first = query.render(&Dialect::postgres()).unwrap();
        let second = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_branching_with_clone() {
        let base = table("users").where_(("active", true));
        let admins = base.clone().where_(("role", "admin"));
        assert_eq!(pg(&base), "SELECT * FROM users WHERE active = $1");
        assert_eq!(pg(&admins), "SELECT * FROM users WHERE active = $1 AND role = $2");
    }
}
