//! INSERT query builder implementation

use crate::expr::Expr;
use crate::render::Renderer;
use crate::{Error, Result, TableRef};

use super::common::{
    ensure_unique_columns, render_returning, IntoColumns, IntoInsertData, IntoSelectItems,
    QueryBuilder, Row, SelectItem, StatementKind,
};

/// INSERT query builder.
///
/// Every stored value stays bound to the column it was given for. Rows are
/// checked against the declared columns as they are added and again at
/// render, after any later `columns()` call.
///
/// ```
/// use sqlize_core::{insert_into, Dialect, QueryBuilder, Value};
///
/// let query = insert_into("users")
///     .columns(["name", "age"])
///     .values([("age", Value::from(30)), ("name", Value::from("John"))])
///     .unwrap();
/// let rendered = query.render(&Dialect::postgres()).unwrap();
/// assert_eq!(rendered.sql, "INSERT INTO users (name, age) VALUES ($1, $2)");
/// assert_eq!(rendered.params, vec![Value::from("John"), Value::from(30)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBuilder {
    table: TableRef,
    columns: Vec<String>,
    rows: Vec<Vec<(String, Expr)>>,
    returning: Vec<SelectItem>,
}

impl InsertBuilder {
    /// Create a new INSERT query builder
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            returning: Vec::new(),
        }
    }

    /// Declare the target columns, replacing any earlier declaration.
    ///
    /// Rows already added keep their values under the column names they were
    /// added with; rendering fails if those names no longer match.
    pub fn columns<C>(mut self, columns: C) -> Self
    where
        C: IntoColumns,
    {
        self.columns = columns.into_columns();
        self
    }

    /// Append one row of values.
    ///
    /// Named rows (pairs, maps) are reordered to the declared columns; when no
    /// columns are declared yet, the first named row declares them. Positional
    /// rows must match the declared column count and are bound to the declared
    /// names. Any mismatch is a build error.
    pub fn values<T>(mut self, data: T) -> Result<Self>
    where
        T: IntoInsertData,
    {
        let row = self.arrange_row(data.into_insert_data())?;
        self.rows.push(row);
        Ok(self)
    }

    /// Append several rows, stopping at the first invalid one
    pub fn values_many<I, T>(self, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoInsertData,
    {
        rows.into_iter().try_fold(self, |builder, row| builder.values(row))
    }

    /// Append RETURNING items
    pub fn returning<T>(mut self, items: T) -> Self
    where
        T: IntoSelectItems,
    {
        self.returning.extend(items.into_select_items());
        self
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn arrange_row(&mut self, row: Row) -> Result<Vec<(String, Expr)>> {
        match row {
            Row::Positional(values) => {
                if self.columns.is_empty() {
                    return Err(Error::build(
                        "positional INSERT values require declared columns",
                    ));
                }
                if values.len() != self.columns.len() {
                    return Err(Error::build(format!(
                        "INSERT row has {} value(s) but {} column(s) are declared",
                        values.len(),
                        self.columns.len()
                    )));
                }
                Ok(self.columns.iter().cloned().zip(values).collect())
            }
            Row::Named(pairs) => {
                ensure_unique_columns("INSERT row", pairs.iter().map(|(column, _)| column))?;
                if self.columns.is_empty() {
                    if pairs.is_empty() {
                        return Err(Error::build("INSERT row cannot be empty"));
                    }
                    self.columns = pairs.iter().map(|(column, _)| column.clone()).collect();
                    return Ok(pairs);
                }
                self.in_column_order(&pairs, "INSERT row")?;
                Ok(pairs)
            }
        }
    }

    /// Values of `pairs` in declared column order
    fn in_column_order<'a>(
        &self,
        pairs: &'a [(String, Expr)],
        label: &str,
    ) -> Result<Vec<&'a Expr>> {
        let missing: Vec<&str> = self
            .columns
            .iter()
            .filter(|column| !pairs.iter().any(|(name, _)| name == *column))
            .map(String::as_str)
            .collect();
        let extra: Vec<&str> = pairs
            .iter()
            .filter(|(name, _)| !self.columns.contains(name))
            .map(|(name, _)| name.as_str())
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            let mut problems = Vec::new();
            if !missing.is_empty() {
                problems.push(format!("missing column(s): {}", missing.join(", ")));
            }
            if !extra.is_empty() {
                problems.push(format!("unknown column(s): {}", extra.join(", ")));
            }
            return Err(Error::build(format!(
                "{} does not match declared columns; {}",
                label,
                problems.join("; ")
            )));
        }

        Ok(self
            .columns
            .iter()
            .filter_map(|column| {
                pairs
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value)
            })
            .collect())
    }
}

impl QueryBuilder for InsertBuilder {
    fn statement_kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn render_into(&self, r: &mut Renderer<'_>) -> Result<()> {
        if self.rows.is_empty() {
            return Err(Error::usage("INSERT requires values to be specified with .values()"));
        }
        ensure_unique_columns("INSERT", &self.columns)?;

        // columns may have been redeclared after rows were added
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.in_column_order(row, &format!("INSERT row {}", i + 1)))
            .collect::<Result<Vec<_>>>()?;

        r.push("INSERT INTO ");
        r.push_table(&self.table)?;

        r.push(" (");
        r.write_list(&self.columns, |r, column| r.push_name(column))?;
        r.push(") VALUES ");

        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                r.push(", ");
            }
            r.push("(");
            r.write_list(row, |r, value| r.write_expr(value))?;
            r.push(")");
        }

        render_returning(r, &self.returning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::raw;
    use crate::{insert_into, Dialect, ErrorKind, Value};
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_insert_builder() {
        let mut data = HashMap::new();
        data.insert("name".to_string(), Value::from("John"));
        data.insert("age".to_string(), Value::from(30));

        let query = insert_into("users").values(data).unwrap();
        let rendered = query.render(&Dialect::postgres()).unwrap();
        // hash map keys are sorted
        assert_eq!(rendered.sql, "INSERT INTO users (age, name) VALUES ($1, $2)");
        assert_eq!(rendered.params, vec![Value::I32(30), Value::from("John")]);
    }

    #[test]
    fn test_insert_many() {
        let rows = vec![
            vec![("name", Value::from("John")), ("age", Value::from(30))],
            vec![("age", Value::from(25)), ("name", Value::from("Jane"))],
        ];
        let query = insert_into("users").values_many(rows).unwrap();
        let rendered = query.render(&Dialect::mysql()).unwrap();
        assert_eq!(rendered.sql, "INSERT INTO users (name, age) VALUES (?, ?), (?, ?)");
        assert_eq!(
            rendered.params,
            vec![
                Value::from("John"),
                Value::I32(30),
                Value::from("Jane"),
                Value::I32(25)
            ]
        );
    }

    #[test]
    fn test_named_rows_follow_declared_order() {
        let mut row = BTreeMap::new();
        row.insert("b", 2);
        row.insert("a", 1);
        let query = insert_into("t").columns(("b", "a")).values(row).unwrap();
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.sql, "INSERT INTO t (b, a) VALUES ($1, $2)");
        assert_eq!(rendered.params, vec![Value::I32(2), Value::I32(1)]);
    }

    #[test]
    fn test_mismatched_named_row_is_build_error() {
        let err = insert_into("t")
            .columns(["a", "c"])
            .values([("a", 1), ("b", 2)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
        let message = err.to_string();
        assert!(message.contains("missing column(s): c"));
        assert!(message.contains("unknown column(s): b"));
    }

    #[test]
    fn test_duplicate_names_in_row() {
        let err = insert_into("t").values([("a", 1), ("a", 2)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
    }

    #[test]
    fn test_positional_rows() {
        let query = insert_into("t")
            .columns(["a", "b"])
            .values(vec![Value::from(1), Value::from("x")])
            .unwrap();
        assert_eq!(
            query.to_sql(&Dialect::sqlite()).unwrap(),
            "INSERT INTO t (a, b) VALUES (?, ?)"
        );

        let err = insert_into("t")
            .columns(["a", "b"])
            .values(vec![Value::from(1)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);

        let err = insert_into("t").values(vec![Value::from(1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
    }

    #[test]
    fn test_expression_values() {
        let query = insert_into("events")
            .columns(["name", "created_at"])
            .values(Row::positional([crate::expr::val("signup"), raw("now()")]))
            .unwrap();
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.sql, "INSERT INTO events (name, created_at) VALUES ($1, now())");
        assert_eq!(rendered.params.len(), 1);
    }

    #[test]
    fn test_returning() {
        let query = insert_into("users")
            .values([("email", "a@example.com")])
            .unwrap()
            .returning("id");
        assert_eq!(
            query.to_sql(&Dialect::postgres()).unwrap(),
            "INSERT INTO users (email) VALUES ($1) RETURNING id"
        );
        let err = query.render(&Dialect::mysql()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dialect);
    }

    #[test]
    fn test_insert_empty_data_fails() {
        let result = insert_into("users").render(&Dialect::postgres());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.to_string().contains("INSERT requires values"));
    }

    #[test]
    fn test_redeclared_columns_checked_at_render() {
        let query = insert_into("t")
            .values([("a", 1)])
            .unwrap()
            .columns(["a", "b"]);
        let err = query.render(&Dialect::postgres()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
        assert!(err.to_string().contains("INSERT row 1"));
        assert!(err.to_string().contains("missing column(s): b"));
    }

    #[test]
    fn test_redeclared_columns_keep_values_with_their_names() {
        let query = insert_into("t")
            .values([("a", 1), ("b", 2)])
            .unwrap()
            .columns(["b", "a"]);
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.sql, "INSERT INTO t (b, a) VALUES ($1, $2)");
        assert_eq!(rendered.params, vec![Value::I32(2), Value::I32(1)]);

        let query = insert_into("t")
            .columns(["a", "b"])
            .values(vec![Value::from(1), Value::from(2)])
            .unwrap()
            .columns(["b", "a"]);
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.params, vec![Value::I32(2), Value::I32(1)]);
    }

    #[test]
    fn test_redeclared_columns_with_new_names_fail() {
        let err = insert_into("t")
            .values([("a", 1), ("b", 2)])
            .unwrap()
            .columns(["a", "c"])
            .render(&Dialect::postgres())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
        assert!(err.to_string().contains("unknown column(s): b"));

        let err = insert_into("t")
            .columns(["a", "b"])
            .values(vec![Value::from(1), Value::from(2)])
            .unwrap()
            .columns(["x", "y"])
            .render(&Dialect::sqlite())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
    }
}
