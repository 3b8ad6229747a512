//! DELETE query builder module

use crate::expr::Expr;
use crate::render::Renderer;
use crate::{Error, Result, TableRef};

use super::common::{
    conjoin, disjoin, render_returning, IntoCondition, IntoSelectItems, QueryBuilder, SelectItem,
    StatementKind,
};

/// DELETE query builder.
///
/// A DELETE without WHERE refuses to render unless [`all_rows`](Self::all_rows)
/// was called.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBuilder {
    table: TableRef,
    where_clause: Option<Expr>,
    all_rows: bool,
    returning: Vec<SelectItem>,
}

impl DeleteBuilder {
    /// Create a new DELETE query builder
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
            all_rows: false,
            returning: Vec::new(),
        }
    }

    /// Add a WHERE condition, conjoined with AND to any existing one
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_clause = conjoin(self.where_clause, condition.into_condition());
        self
    }

    /// Make the WHERE clause `(existing) OR condition`
    pub fn or_where<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_clause = disjoin(self.where_clause, condition.into_condition());
        self
    }

    /// Add an AND WHERE condition (same as where_)
    pub fn and_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_(condition)
    }

    /// Explicitly allow deleting every row of the table
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    /// Append RETURNING items
    pub fn returning<T>(mut self, items: T) -> Self
    where
        T: IntoSelectItems,
    {
        self.returning.extend(items.into_select_items());
        self
    }
}

impl QueryBuilder for DeleteBuilder {
    fn statement_kind(&self) -> StatementKind {
        StatementKind::Delete
    }

    fn render_into(&self, r: &mut Renderer<'_>) -> Result<()> {
        if self.where_clause.is_none() && !self.all_rows {
            return Err(Error::usage(
                "DELETE requires WHERE condition for safety; call .all_rows() to delete everything",
            ));
        }

        r.push("DELETE FROM ");
        r.push_table(&self.table)?;

        if let Some(condition) = &self.where_clause {
            r.push(" WHERE ");
            r.write_expr(condition)?;
        }

        render_returning(r, &self.returning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{in_list, lt};
    use crate::operator::op;
    use crate::{delete_from, Dialect, ErrorKind};

    #[test]
    fn test_delete_builder() {
        let query = delete_from("users").where_(("age", op::LT, 18));
        assert_eq!(
            query.to_sql(&Dialect::postgres()).unwrap(),
            "DELETE FROM users WHERE age < $1"
        );
    }

    #[test]
    fn test_delete_multiple_conditions() {
        let query = delete_from("users")
            .where_(lt("age", 18))
            .or_where(("status", "inactive"));
        assert_eq!(
            query.to_sql(&Dialect::sqlite()).unwrap(),
            "DELETE FROM users WHERE age < ? OR status = ?"
        );
    }

    #[test]
    fn test_delete_with_in_list() {
        let query = delete_from("sessions").where_(in_list("id", [3, 5, 8]).unwrap());
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.sql, "DELETE FROM sessions WHERE id IN ($1, $2, $3)");
        assert_eq!(rendered.params.len(), 3);
    }

    #[test]
    fn test_delete_without_where_fails() {
        let result = delete_from("users").render(&Dialect::postgres());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.to_string().contains("DELETE requires WHERE condition for safety"));
    }

    #[test]
    fn test_delete_all_rows_opt_in() {
        let query = delete_from("audit_log").all_rows();
        assert_eq!(
            query.to_sql(&Dialect::postgres()).unwrap(),
            "DELETE FROM audit_log"
        );
    }

    #[test]
    fn test_delete_returning() {
        let query = delete_from("users").where_(("id", 1)).returning("*");
        assert_eq!(
            query.to_sql(&Dialect::postgres()).unwrap(),
            "DELETE FROM users WHERE id = $1 RETURNING *"
        );
        assert!(query.render(&Dialect::mysql()).is_err());
    }
}
