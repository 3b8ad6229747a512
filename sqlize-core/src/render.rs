//! SQL text rendering.
//!
//! A [`Renderer`] accumulates SQL text and bound parameters while statements
//! and expressions are written into it. Subqueries render into the same
//! renderer as their parent, so placeholder numbering runs continuously across
//! the whole statement and the parameter order always matches the placeholder
//! order in the text.

use serde::Serialize;

use crate::builder::QueryBuilder;
use crate::dialect::Feature;
use crate::expr::Expr;
use crate::ident::validate_alias;
use crate::operator::{prec, BinaryOp, Precedence, UnaryOp};
use crate::{Dialect, Error, Ident, PlaceholderStyle, Result, TableRef, Value};

/// Final SQL text plus the values bound to its placeholders, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl RenderedQuery {
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl std::fmt::Display for RenderedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Accumulates SQL text and parameters for one statement
#[derive(Debug)]
pub struct Renderer<'d> {
    dialect: &'d Dialect,
    sql: String,
    params: Vec<Value>,
    inline_literals: bool,
}

impl<'d> Renderer<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
            inline_literals: false,
        }
    }

    /// Renderer for DDL, where values are written as escaped literals
    pub(crate) fn inline(dialect: &'d Dialect) -> Self {
        Self {
            inline_literals: true,
            ..Self::new(dialect)
        }
    }

    pub fn dialect(&self) -> &'d Dialect {
        self.dialect
    }

    /// Number of parameters bound so far
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Write a possibly qualified identifier, quoting parts as the dialect requires
    pub fn push_ident(&mut self, ident: &Ident) -> Result<()> {
        ident.validate()?;
        for (i, part) in ident.parts().iter().enumerate() {
            if i > 0 {
                self.sql.push('.');
            }
            let rendered = self.dialect.render_ident_part(part);
            self.sql.push_str(&rendered);
        }
        Ok(())
    }

    /// Write a single unqualified name (alias, column definition, index name)
    pub fn push_name(&mut self, name: &str) -> Result<()> {
        validate_alias(name)?;
        if name == "*" {
            return Err(Error::build("'*' is not a valid name here"));
        }
        let rendered = self.dialect.render_ident_part(name);
        self.sql.push_str(&rendered);
        Ok(())
    }

    pub fn push_table(&mut self, table: &TableRef) -> Result<()> {
        table.validate()?;
        self.push_ident(&table.name)?;
        if let Some(alias) = &table.alias {
            self.push(" AS ");
            self.push_name(alias)?;
        }
        Ok(())
    }

    /// Bind a value and write its placeholder, or its literal form for DDL
    pub fn push_value(&mut self, value: &Value) -> Result<()> {
        if self.inline_literals {
            let literal = self.dialect.literal(value)?;
            self.sql.push_str(&literal);
            return Ok(());
        }
        self.params.push(value.clone());
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
        Ok(())
    }

    /// Write `items` separated by commas
    pub fn write_list<T>(
        &mut self,
        items: &[T],
        mut write: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            write(self, item)?;
        }
        Ok(())
    }

    /// Write a statement nested in parentheses, continuing the parameter numbering
    pub fn write_subquery(&mut self, query: &dyn QueryBuilder) -> Result<()> {
        self.push("(");
        query.render_into(self)?;
        self.push(")");
        Ok(())
    }

    pub fn write_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Column(ident) => self.push_ident(ident),
            Expr::Literal(value) => self.push_value(value),
            Expr::Binary { left, op, right } => self.write_binary(left, *op, right),
            Expr::Unary { op, expr } => self.write_unary(*op, expr),
            Expr::And(items) => self.write_group(items, true),
            Expr::Or(items) => self.write_group(items, false),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                if list.is_empty() {
                    return Err(Error::build("IN list cannot be empty"));
                }
                self.write_operand(expr, prec::COMPARISON + 1)?;
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                self.write_list(list, |r, item| r.write_expr(item))?;
                self.push(")");
                Ok(())
            }
            Expr::InSubquery {
                expr,
                query,
                negated,
            } => {
                self.write_operand(expr, prec::COMPARISON + 1)?;
                self.push(if *negated { " NOT IN " } else { " IN " });
                self.write_subquery(&**query)
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                self.write_operand(expr, prec::COMPARISON + 1)?;
                self.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.write_operand(low, prec::COMPARISON + 1)?;
                self.push(" AND ");
                self.write_operand(high, prec::COMPARISON + 1)
            }
            Expr::Exists { query, negated } => {
                self.push(if *negated { "NOT EXISTS " } else { "EXISTS " });
                self.write_subquery(&**query)
            }
            Expr::Function {
                name,
                args,
                distinct,
            } => {
                validate_function_name(name)?;
                self.push(name);
                self.push("(");
                if *distinct {
                    self.push("DISTINCT ");
                }
                self.write_list(args, |r, arg| r.write_expr(arg))?;
                self.push(")");
                Ok(())
            }
            Expr::Cast { expr, ty } => {
                let type_name = self.dialect.type_name(ty)?;
                self.push("CAST(");
                self.write_expr(expr)?;
                self.push(" AS ");
                self.push(&type_name);
                self.push(")");
                Ok(())
            }
            Expr::Subquery(query) => self.write_subquery(&**query),
            Expr::Raw { sql, params } => self.write_raw(sql, params),
        }
    }

    fn write_operand(&mut self, expr: &Expr, min: Precedence) -> Result<()> {
        self.write_wrapped(expr, expr.precedence() < min)
    }

    fn write_wrapped(&mut self, expr: &Expr, parenthesize: bool) -> Result<()> {
        if parenthesize {
            self.push("(");
            self.write_expr(expr)?;
            self.push(")");
            Ok(())
        } else {
            self.write_expr(expr)
        }
    }

    fn write_group(&mut self, items: &[Expr], conjunction: bool) -> Result<()> {
        match items {
            [] => {
                let literal = self.dialect.boolean_literal(conjunction);
                self.push(literal);
                Ok(())
            }
            [single] => self.write_expr(single),
            _ => {
                let (separator, level) = if conjunction {
                    (" AND ", prec::AND)
                } else {
                    (" OR ", prec::OR)
                };
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(separator);
                    }
                    let inner = item.unwrap_single();
                    // AND nested in OR is always parenthesized
                    let and_in_or =
                        !conjunction && matches!(inner, Expr::And(group) if group.len() > 1);
                    self.write_wrapped(item, and_in_or || inner.precedence() < level)?;
                }
                Ok(())
            }
        }
    }

    fn write_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<()> {
        match op {
            BinaryOp::ILike | BinaryOp::NotILike => self.dialect.require(Feature::ILike)?,
            BinaryOp::Concat if self.dialect.concat_as_function() => {
                self.push("CONCAT(");
                self.write_expr(left)?;
                self.push(", ");
                self.write_expr(right)?;
                self.push(")");
                return Ok(());
            }
            _ => {}
        }
        let level = op.precedence();
        // comparisons do not chain; arithmetic is left-associative
        let left_min = if op.is_comparison() { level + 1 } else { level };
        if op == BinaryOp::Concat {
            self.write_concat_operand(left, left_min)?;
        } else {
            self.write_operand(left, left_min)?;
        }
        self.push(" ");
        self.push(op.as_str());
        self.push(" ");
        if op == BinaryOp::Concat {
            self.write_concat_operand(right, level + 1)
        } else {
            self.write_operand(right, level + 1)
        }
    }

    /// Arithmetic under `||` is always parenthesized; the reverse case falls
    /// out of `||` ranking below arithmetic.
    fn write_concat_operand(&mut self, expr: &Expr, min: Precedence) -> Result<()> {
        let arithmetic = matches!(
            expr.unwrap_single(),
            Expr::Binary { op, .. } if op.is_arithmetic()
        );
        self.write_wrapped(expr, arithmetic || expr.precedence() < min)
    }

    fn write_unary(&mut self, op: UnaryOp, expr: &Expr) -> Result<()> {
        match op {
            UnaryOp::Not => {
                self.push("NOT ");
                self.write_operand(expr, prec::ATOM)
            }
            UnaryOp::Negate => {
                self.push("-");
                self.write_operand(expr, prec::ATOM)
            }
            UnaryOp::IsNull => {
                self.write_operand(expr, prec::COMPARISON + 1)?;
                self.push(" IS NULL");
                Ok(())
            }
            UnaryOp::IsNotNull => {
                self.write_operand(expr, prec::COMPARISON + 1)?;
                self.push(" IS NOT NULL");
                Ok(())
            }
        }
    }

    fn write_raw(&mut self, sql: &str, params: &[Value]) -> Result<()> {
        let mut values = params.iter();
        let mut chars = sql.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '?' {
                self.sql.push(c);
                continue;
            }
            if chars.peek() == Some(&'?') {
                chars.next();
                if self.dialect.placeholder_style() == PlaceholderStyle::Question {
                    return Err(Error::dialect(
                        self.dialect.name(),
                        "a literal '?' in raw SQL would be read as a bind parameter",
                    ));
                }
                self.sql.push('?');
                continue;
            }
            match values.next() {
                Some(value) => self.push_value(value)?,
                None => {
                    return Err(Error::build(format!(
                        "raw SQL has more placeholders than the {} supplied parameter(s)",
                        params.len()
                    )))
                }
            }
        }
        if values.next().is_some() {
            return Err(Error::build(
                "raw SQL has fewer placeholders than supplied parameters",
            ));
        }
        Ok(())
    }

    pub fn finish(self) -> RenderedQuery {
        RenderedQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Function names are emitted unquoted, so they must be plain (optionally
/// schema-qualified) names.
fn validate_function_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
        Ok(())
    } else {
        Err(Error::build(format!("invalid function name '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, eq, raw, raw_with};
    use crate::ErrorKind;

    #[test]
    fn test_placeholders_follow_bind_order() {
        let dialect = Dialect::postgres();
        let mut renderer = Renderer::new(&dialect);
        renderer.push_value(&Value::from(1)).unwrap();
        renderer.push(", ");
        renderer.push_value(&Value::from("a")).unwrap();
        let rendered = renderer.finish();
        assert_eq!(rendered.sql, "$1, $2");
        assert_eq!(rendered.params, vec![Value::I32(1), Value::from("a")]);
    }

    #[test]
    fn test_named_placeholders() {
        let dialect = Dialect::builder(crate::DialectFamily::Postgres)
            .placeholder(PlaceholderStyle::Named)
            .build();
        let rendered = eq("a", 1).and(eq("b", 2)).render(&dialect).unwrap();
        assert_eq!(rendered.sql, "a = :p1 AND b = :p2");
    }

    #[test]
    fn test_inline_literals() {
        let dialect = Dialect::postgres();
        let mut renderer = Renderer::inline(&dialect);
        renderer.write_expr(&eq("status", "it's")).unwrap();
        let rendered = renderer.finish();
        assert_eq!(rendered.sql, "status = 'it''s'");
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn test_identifier_quoting() {
        let dialect = Dialect::postgres();
        let mut renderer = Renderer::new(&dialect);
        renderer.write_expr(&col("public.order.userId")).unwrap();
        assert_eq!(renderer.finish().sql, "public.\"order\".\"userId\"");
    }

    #[test]
    fn test_invalid_identifier_is_build_error() {
        let err = col("users..id").render(&Dialect::postgres()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
        let err = col("*.id").render(&Dialect::postgres()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
    }

    #[test]
    fn test_table_alias() {
        let dialect = Dialect::mysql();
        let mut renderer = Renderer::new(&dialect);
        renderer.push_table(&TableRef::new("order").alias("o")).unwrap();
        assert_eq!(renderer.finish().sql, "`order` AS o");
    }

    #[test]
    fn test_raw_mismatch_detected_at_render() {
        let expr = Expr::Raw {
            sql: "a = ? AND b = ?".into(),
            params: vec![Value::I32(1)],
        };
        let err = expr.render(&Dialect::postgres()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
    }

    #[test]
    fn test_raw_on_question_mark_dialect() {
        let expr = raw_with("x = ? OR y ?? z", [1]).unwrap();
        assert_eq!(expr.render(&Dialect::postgres()).unwrap().sql, "x = $1 OR y ? z");
        let err = expr.render(&Dialect::sqlite()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dialect);

        let expr = raw_with("data ?? 'key'", Vec::<Value>::new()).unwrap();
        assert_eq!(expr.render(&Dialect::postgres()).unwrap().sql, "data ? 'key'");
        let err = expr.render(&Dialect::mysql()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dialect);

        let expr = raw("tags ? 'rust'");
        assert_eq!(expr.render(&Dialect::postgres()).unwrap().sql, "tags ? 'rust'");
        assert!(expr.render(&Dialect::sqlite()).is_err());
        assert_eq!(raw("now()").render(&Dialect::sqlite()).unwrap().sql, "now()");
    }

    #[test]
    fn test_function_name_validation() {
        assert!(validate_function_name("COUNT").is_ok());
        assert!(validate_function_name("pg_catalog.lower").is_ok());
        assert!(validate_function_name("1abc").is_err());
        assert!(validate_function_name("now()").is_err());
        assert!(validate_function_name("").is_err());
    }

    #[test]
    fn test_rendered_query_serializes() {
        let rendered = eq("id", 7).render(&Dialect::postgres()).unwrap();
        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!(json["sql"], "id = $1");
        assert_eq!(json["params"][0]["I32"], 7);
    }
}
