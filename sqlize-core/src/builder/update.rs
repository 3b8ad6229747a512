//! UPDATE query builder module

use crate::expr::Expr;
use crate::render::Renderer;
use crate::{Error, Result, TableRef};

use super::common::{
    conjoin, disjoin, render_returning, IntoCondition, IntoSelectItems, IntoUpdateData,
    QueryBuilder, SelectItem, StatementKind,
};

/// UPDATE query builder
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBuilder {
    table: TableRef,
    assignments: Vec<(String, Expr)>,
    where_clause: Option<Expr>,
    returning: Vec<SelectItem>,
}

impl UpdateBuilder {
    /// Create a new UPDATE query builder
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            where_clause: None,
            returning: Vec::new(),
        }
    }

    /// Set column values.
    ///
    /// Assignments are appended in the order given; setting a column that is
    /// already assigned replaces its value in place.
    ///
    /// # Examples
    /// ```
    /// use sqlize_core::{col, update, Dialect, QueryBuilder};
    /// use std::collections::HashMap;
    ///
    /// let mut updates = HashMap::new();
    /// updates.insert("name", "Jane");
    /// updates.insert("email", "jane@example.com");
    ///
    /// let query = update("users")
    ///     .set(updates)
    ///     .set(("visits", col("visits") + 1))
    ///     .where_(("id", 7));
    /// assert_eq!(
    ///     query.to_sql(&Dialect::postgres()).unwrap(),
    ///     "UPDATE users SET email = $1, name = $2, visits = visits + $3 WHERE id = $4"
    /// );
    /// ```
    pub fn set<T>(mut self, data: T) -> Self
    where
        T: IntoUpdateData,
    {
        for (column, value) in data.into_update_data() {
            match self.assignments.iter_mut().find(|(name, _)| *name == column) {
                Some(existing) => existing.1 = value,
                None => self.assignments.push((column, value)),
            }
        }
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

    /// Append RETURNING items
    pub fn returning<T>(mut self, items: T) -> Self
    where
        T: IntoSelectItems,
    {
        self.returning.extend(items.into_select_items());
        self
    }

    pub fn assignments(&self) -> &[(String, Expr)] {
        &self.assignments
    }
}

impl QueryBuilder for UpdateBuilder {
    fn statement_kind(&self) -> StatementKind {
        StatementKind::Update
    }

    fn render_into(&self, r: &mut Renderer<'_>) -> Result<()> {
        if self.assignments.is_empty() {
            return Err(Error::usage("UPDATE requires SET clauses"));
        }

        r.push("UPDATE ");
        r.push_table(&self.table)?;

        r.push(" SET ");
        r.write_list(&self.assignments, |r, (column, value)| {
            r.push_name(column)?;
            r.push(" = ");
            r.write_expr(value)
        })?;

        if let Some(condition) = &self.where_clause {
            r.push(" WHERE ");
            r.write_expr(condition)?;
        }

        render_returning(r, &self.returning)
    }
}
