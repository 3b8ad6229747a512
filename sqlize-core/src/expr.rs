//! Expression tree for WHERE / HAVING / ON predicates, select items and values.
//!
//! Every node owns its children, so an [`Expr`] is always a tree. Literal
//! values are never spliced into SQL text: they render as dialect placeholders
//! and are appended to the parameter list in visit order. The only way to put
//! caller-supplied text into the output is [`raw`] / [`raw_with`].
//!
//! ```
//! use sqlize_core::{and, eq, gt, or, Dialect};
//!
//! let expr = and([eq("active", true), or([gt("age", 18), eq("role", "admin")])]);
//! let rendered = expr.render(&Dialect::postgres()).unwrap();
//! assert_eq!(rendered.sql, "active = $1 AND (age > $2 OR role = $3)");
//! assert_eq!(rendered.params.len(), 3);
//! ```

use std::collections::BTreeMap;
use std::ops::{Add, Div, Mul, Not, Rem, Sub};

use crate::builder::{SelectBuilder, SelectItem};
use crate::dialect::SqlType;
use crate::operator::{prec, BinaryOp, Precedence, UnaryOp};
use crate::render::{RenderedQuery, Renderer};
use crate::{Dialect, Error, Ident, Result, Value};

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference, possibly qualified, or a `*` / `t.*` wildcard
    Column(Ident),
    /// Literal value, rendered as a placeholder
    Literal(Value),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    /// All conditions must hold; an empty list is TRUE
    And(Vec<Expr>),
    /// At least one condition must hold; an empty list is FALSE
    Or(Vec<Expr>),
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        query: Box<SelectBuilder>,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    Exists {
        query: Box<SelectBuilder>,
        negated: bool,
    },
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },
    Cast {
        expr: Box<Expr>,
        ty: SqlType,
    },
    /// Scalar subquery
    Subquery(Box<SelectBuilder>),
    /// Trusted SQL fragment. `?` marks a parameter, `??` a literal question mark.
    Raw {
        sql: String,
        params: Vec<Value>,
    },
}

impl Expr {
    /// Binding strength used by the renderer to decide on parentheses
    pub fn precedence(&self) -> Precedence {
        match self.unwrap_single() {
            Expr::Column(_)
            | Expr::Literal(_)
            | Expr::Function { .. }
            | Expr::Cast { .. }
            | Expr::Subquery(_)
            | Expr::Exists { .. } => prec::ATOM,
            Expr::And(items) | Expr::Or(items) if items.is_empty() => prec::ATOM,
            Expr::And(_) => prec::AND,
            Expr::Or(_) => prec::OR,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { op, .. } => op.precedence(),
            Expr::InList { .. } | Expr::InSubquery { .. } | Expr::Between { .. } => {
                prec::COMPARISON
            }
            Expr::Raw { .. } => prec::RAW,
        }
    }

    /// Skip through single-element AND / OR groups, which render as their element
    pub(crate) fn unwrap_single(&self) -> &Expr {
        match self {
            Expr::And(items) | Expr::Or(items) if items.len() == 1 => items[0].unwrap_single(),
            other => other,
        }
    }

    /// Whether the expression names a column of the enclosing statement.
    /// Subqueries bring their own sources and are not inspected.
    pub fn references_columns(&self) -> bool {
        match self {
            Expr::Column(_) => true,
            Expr::Literal(_)
            | Expr::Exists { .. }
            | Expr::Subquery(_)
            | Expr::Raw { .. } => false,
            Expr::Binary { left, right, .. } => {
                left.references_columns() || right.references_columns()
            }
            Expr::Unary { expr, .. } | Expr::Cast { expr, .. } => expr.references_columns(),
            Expr::InSubquery { expr, .. } => expr.references_columns(),
            Expr::And(items) | Expr::Or(items) => items.iter().any(Expr::references_columns),
            Expr::Function { args, .. } => args.iter().any(Expr::references_columns),
            Expr::InList { expr, list, .. } => {
                expr.references_columns() || list.iter().any(Expr::references_columns)
            }
            Expr::Between {
                expr, low, high, ..
            } => expr.references_columns() || low.references_columns() || high.references_columns(),
        }
    }

    /// Conjoin with another condition, flattening an existing AND group
    pub fn and(self, other: Expr) -> Expr {
        match self {
            Expr::And(mut items) => {
                items.push(other);
                Expr::And(items)
            }
            first => Expr::And(vec![first, other]),
        }
    }

    /// Disjoin with another condition, flattening an existing OR group
    pub fn or(self, other: Expr) -> Expr {
        match self {
            Expr::Or(mut items) => {
                items.push(other);
                Expr::Or(items)
            }
            first => Expr::Or(vec![first, other]),
        }
    }

    /// `self % other`, same as the `%` operator
    pub fn modulo(self, other: impl IntoExpr) -> Expr {
        binary_expr(self, BinaryOp::Mod, other.into_expr())
    }

    /// String concatenation (`a || b`, `CONCAT(a, b)` on MySQL)
    pub fn concat(self, other: impl IntoExpr) -> Expr {
        binary_expr(self, BinaryOp::Concat, other.into_expr())
    }

    /// Use this expression as a select item with an alias
    pub fn alias(self, alias: &str) -> SelectItem {
        SelectItem {
            expr: self,
            alias: Some(alias.to_string()),
        }
    }

    /// Render this expression as a standalone fragment
    pub fn render(&self, dialect: &Dialect) -> Result<RenderedQuery> {
        let mut renderer = Renderer::new(dialect);
        renderer.write_expr(self)?;
        Ok(renderer.finish())
    }
}

fn binary_expr(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        not(self)
    }
}

macro_rules! arithmetic_ops {
    ($($trait:ident $method:ident => $op:expr),* $(,)?) => {
        $(
            impl<R: IntoExpr> $trait<R> for Expr {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    binary_expr(self, $op, rhs.into_expr())
                }
            }
        )*
    };
}

arithmetic_ops! {
    Add add => BinaryOp::Add,
    Sub sub => BinaryOp::Sub,
    Mul mul => BinaryOp::Mul,
    Div div => BinaryOp::Div,
    Rem rem => BinaryOp::Mod,
}

/// Types usable on the value side of a comparison.
///
/// Plain Rust values become [`Expr::Literal`] placeholders; expressions and
/// sub-selects are used as they are.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for SelectBuilder {
    fn into_expr(self) -> Expr {
        Expr::Subquery(Box::new(self))
    }
}

impl<T: IntoExpr> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        match self {
            Some(value) => value.into_expr(),
            None => Expr::Literal(Value::Null),
        }
    }
}

impl<T: Into<Value>> IntoExpr for Vec<T> {
    fn into_expr(self) -> Expr {
        Expr::Literal(Value::from(self))
    }
}

macro_rules! literal_into_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Literal(Value::from(self))
                }
            }
        )*
    };
}

literal_into_expr!(
    Value,
    bool,
    i8,
    i16,
    u16,
    i32,
    u32,
    i64,
    f32,
    f64,
    String,
    &String,
    &str,
    serde_json::Value,
);

#[cfg(feature = "uuid-support")]
literal_into_expr!(uuid::Uuid);

#[cfg(feature = "datetime-support")]
literal_into_expr!(
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
);

#[cfg(feature = "decimal-support")]
literal_into_expr!(rust_decimal::Decimal);

/// Types usable on the column side of a comparison: strings name columns.
pub trait IntoColumnExpr {
    fn into_column_expr(self) -> Expr;
}

impl IntoColumnExpr for Expr {
    fn into_column_expr(self) -> Expr {
        self
    }
}

impl IntoColumnExpr for Ident {
    fn into_column_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl IntoColumnExpr for &str {
    fn into_column_expr(self) -> Expr {
        Expr::Column(Ident::parse(self))
    }
}

impl IntoColumnExpr for String {
    fn into_column_expr(self) -> Expr {
        Expr::Column(Ident::parse(&self))
    }
}

impl IntoColumnExpr for &String {
    fn into_column_expr(self) -> Expr {
        Expr::Column(Ident::parse(self))
    }
}

/// Column reference: `col("users.id")`
pub fn col(name: &str) -> Expr {
    Expr::Column(Ident::parse(name))
}

/// Literal value rendered as a placeholder
pub fn val(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// `left op right`
pub fn binary(left: impl IntoColumnExpr, op: BinaryOp, right: impl IntoExpr) -> Expr {
    binary_expr(left.into_column_expr(), op, right.into_expr())
}

macro_rules! comparison_fns {
    ($($(#[$doc:meta])* $name:ident => $op:expr),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(left: impl IntoColumnExpr, right: impl IntoExpr) -> Expr {
                binary(left, $op, right)
            }
        )*
    };
}

comparison_fns! {
    /// `left = right`
    eq => BinaryOp::Eq,
    /// `left <> right`
    ne => BinaryOp::NotEq,
    /// `left < right`
    lt => BinaryOp::Lt,
    /// `left <= right`
    lte => BinaryOp::Lte,
    /// `left > right`
    gt => BinaryOp::Gt,
    /// `left >= right`
    gte => BinaryOp::Gte,
    /// `left LIKE pattern`
    like => BinaryOp::Like,
    /// `left NOT LIKE pattern`
    not_like => BinaryOp::NotLike,
    /// `left ILIKE pattern` (Postgres only)
    ilike => BinaryOp::ILike,
    /// `left NOT ILIKE pattern` (Postgres only)
    not_ilike => BinaryOp::NotILike,
}

/// AND of all given conditions
pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::And(exprs.into_iter().collect())
}

/// OR of all given conditions
pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Or(exprs.into_iter().collect())
}

/// `NOT (expr)`
pub fn not(expr: Expr) -> Expr {
    Expr::Unary {
        op: UnaryOp::Not,
        expr: Box::new(expr),
    }
}

/// Arithmetic negation: `-expr`
pub fn neg(expr: impl IntoColumnExpr) -> Expr {
    Expr::Unary {
        op: UnaryOp::Negate,
        expr: Box::new(expr.into_column_expr()),
    }
}

/// `left IS NULL`
pub fn is_null(left: impl IntoColumnExpr) -> Expr {
    Expr::Unary {
        op: UnaryOp::IsNull,
        expr: Box::new(left.into_column_expr()),
    }
}

/// `left IS NOT NULL`
pub fn is_not_null(left: impl IntoColumnExpr) -> Expr {
    Expr::Unary {
        op: UnaryOp::IsNotNull,
        expr: Box::new(left.into_column_expr()),
    }
}

fn in_list_expr<I, V>(left: impl IntoColumnExpr, values: I, negated: bool) -> Result<Expr>
where
    I: IntoIterator<Item = V>,
    V: IntoExpr,
{
    let list: Vec<Expr> = values.into_iter().map(IntoExpr::into_expr).collect();
    let left = left.into_column_expr();
    if list.is_empty() {
        return Err(Error::build(format!(
            "{} list for {:?} cannot be empty",
            if negated { "NOT IN" } else { "IN" },
            left
        )));
    }
    Ok(Expr::InList {
        expr: Box::new(left),
        list,
        negated,
    })
}

/// `left IN (v1, v2, ...)`; an empty list is a build error
pub fn in_list<I, V>(left: impl IntoColumnExpr, values: I) -> Result<Expr>
where
    I: IntoIterator<Item = V>,
    V: IntoExpr,
{
    in_list_expr(left, values, false)
}

/// `left NOT IN (v1, v2, ...)`; an empty list is a build error
pub fn not_in<I, V>(left: impl IntoColumnExpr, values: I) -> Result<Expr>
where
    I: IntoIterator<Item = V>,
    V: IntoExpr,
{
    in_list_expr(left, values, true)
}

/// `left IN (SELECT ...)`
pub fn in_subquery(left: impl IntoColumnExpr, query: SelectBuilder) -> Expr {
    Expr::InSubquery {
        expr: Box::new(left.into_column_expr()),
        query: Box::new(query),
        negated: false,
    }
}

/// `left NOT IN (SELECT ...)`
pub fn not_in_subquery(left: impl IntoColumnExpr, query: SelectBuilder) -> Expr {
    Expr::InSubquery {
        expr: Box::new(left.into_column_expr()),
        query: Box::new(query),
        negated: true,
    }
}

/// `EXISTS (SELECT ...)`
pub fn exists(query: SelectBuilder) -> Expr {
    Expr::Exists {
        query: Box::new(query),
        negated: false,
    }
}

/// `NOT EXISTS (SELECT ...)`
pub fn not_exists(query: SelectBuilder) -> Expr {
    Expr::Exists {
        query: Box::new(query),
        negated: true,
    }
}

/// `left BETWEEN low AND high`
pub fn between(left: impl IntoColumnExpr, low: impl IntoExpr, high: impl IntoExpr) -> Expr {
    Expr::Between {
        expr: Box::new(left.into_column_expr()),
        low: Box::new(low.into_expr()),
        high: Box::new(high.into_expr()),
        negated: false,
    }
}

/// `left NOT BETWEEN low AND high`
pub fn not_between(left: impl IntoColumnExpr, low: impl IntoExpr, high: impl IntoExpr) -> Expr {
    Expr::Between {
        expr: Box::new(left.into_column_expr()),
        low: Box::new(low.into_expr()),
        high: Box::new(high.into_expr()),
        negated: true,
    }
}

/// Function call: `func("lower", [col("email")])`
pub fn func(name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Function {
        name: name.to_string(),
        args: args.into_iter().collect(),
        distinct: false,
    }
}

fn aggregate(name: &str, arg: Expr, distinct: bool) -> Expr {
    Expr::Function {
        name: name.to_string(),
        args: vec![arg],
        distinct,
    }
}

/// `COUNT(*)`
pub fn count_all() -> Expr {
    aggregate("COUNT", Expr::Column(Ident::wildcard()), false)
}

/// `COUNT(column)`
pub fn count(column: impl IntoColumnExpr) -> Expr {
    aggregate("COUNT", column.into_column_expr(), false)
}

/// `COUNT(DISTINCT column)`
pub fn count_distinct(column: impl IntoColumnExpr) -> Expr {
    aggregate("COUNT", column.into_column_expr(), true)
}

/// `SUM(column)`
pub fn sum(column: impl IntoColumnExpr) -> Expr {
    aggregate("SUM", column.into_column_expr(), false)
}

/// `AVG(column)`
pub fn avg(column: impl IntoColumnExpr) -> Expr {
    aggregate("AVG", column.into_column_expr(), false)
}

/// `MIN(column)`
pub fn min(column: impl IntoColumnExpr) -> Expr {
    aggregate("MIN", column.into_column_expr(), false)
}

/// `MAX(column)`
pub fn max(column: impl IntoColumnExpr) -> Expr {
    aggregate("MAX", column.into_column_expr(), false)
}

/// `CAST(expr AS type)` with the type name chosen by the dialect
pub fn cast(expr: impl IntoColumnExpr, ty: SqlType) -> Expr {
    Expr::Cast {
        expr: Box::new(expr.into_column_expr()),
        ty,
    }
}

/// Raw SQL fragment emitted verbatim.
///
/// This is the one trusted escape hatch of the builder: the text is not
/// escaped or validated in any way, so the caller is responsible for making
/// sure it cannot carry SQL injection. Never build it from user input; bind
/// values with [`raw_with`] instead.
///
/// Every `?` in `sql` is literal. On dialects that use `?` placeholders a
/// literal question mark would be read as a bind marker, so rendering such a
/// fragment there is a dialect error.
pub fn raw(sql: &str) -> Expr {
    Expr::Raw {
        sql: sql.replace('?', "??"),
        params: Vec::new(),
    }
}

/// Raw SQL fragment with bound parameters.
///
/// Every `?` in `sql` is replaced by the dialect's next placeholder and bound
/// to the next value of `params`; write `??` for a literal question mark. The
/// number of markers must match the number of values. The same injection
/// caveat as [`raw`] applies to the text itself, and so does the rule that a
/// literal question mark cannot be rendered for a `?`-placeholder dialect.
pub fn raw_with<I, V>(sql: &str, params: I) -> Result<Expr>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let params: Vec<Value> = params.into_iter().map(Into::into).collect();
    let markers = count_raw_markers(sql);
    if markers != params.len() {
        return Err(Error::build(format!(
            "raw SQL has {} placeholder(s) but {} parameter(s) were supplied",
            markers,
            params.len()
        )));
    }
    Ok(Expr::Raw {
        sql: sql.to_string(),
        params,
    })
}

fn count_raw_markers(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '?' {
            if chars.peek() == Some(&'?') {
                chars.next();
            } else {
                count += 1;
            }
        }
    }
    count
}

/// Build an equality conjunction from a column/value map, keyed in sorted order
pub fn all_eq<K, V>(pairs: BTreeMap<K, V>) -> Expr
where
    K: AsRef<str>,
    V: IntoExpr,
{
    Expr::And(
        pairs
            .into_iter()
            .map(|(column, value)| eq(column.as_ref(), value))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn pg(expr: &Expr) -> RenderedQuery {
        expr.render(&Dialect::postgres()).unwrap()
    }

    #[test]
    fn test_comparison_binds_value() {
        let rendered = pg(&eq("age", 30));
        assert_eq!(rendered.sql, "age = $1");
        assert_eq!(rendered.params, vec![Value::I32(30)]);
    }

    #[test]
    fn test_column_to_column_comparison() {
        let rendered = pg(&eq("users.id", col("orders.user_id")));
        assert_eq!(rendered.sql, "users.id = orders.user_id");
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn test_and_wraps_or() {
        let expr = and([eq("a", 1), or([eq("b", 2), eq("c", 3)])]);
        assert_eq!(pg(&expr).sql, "a = $1 AND (b = $2 OR c = $3)");
    }

    #[test]
    fn test_or_of_ands_is_parenthesized() {
        let expr = or([and([eq("a", 1), eq("b", 2)]), eq("c", 3)]);
        assert_eq!(pg(&expr).sql, "(a = $1 AND b = $2) OR c = $3");
    }

    #[test]
    fn test_single_and_empty_groups() {
        assert_eq!(pg(&and([eq("a", 1)])).sql, "a = $1");
        assert_eq!(pg(&and([])).sql, "TRUE");
        assert_eq!(pg(&or([])).sql, "FALSE");
        assert_eq!(and([]).render(&Dialect::sqlite()).unwrap().sql, "1");
        // a one-element OR inside AND needs no parentheses
        assert_eq!(pg(&and([or([eq("a", 1)]), eq("b", 2)])).sql, "a = $1 AND b = $2");
    }

    #[test]
    fn test_not_wraps_operand() {
        assert_eq!(pg(&not(eq("a", 1))).sql, "NOT (a = $1)");
        assert_eq!(pg(&!col("active")).sql, "NOT active");
        assert_eq!(
            pg(&and([not(or([eq("a", 1), eq("b", 2)])), eq("c", 3)])).sql,
            "NOT (a = $1 OR b = $2) AND c = $3"
        );
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(pg(&is_null("deleted_at")).sql, "deleted_at IS NULL");
        assert_eq!(pg(&is_not_null("email")).sql, "email IS NOT NULL");
    }

    #[test]
    fn test_in_list() {
        let rendered = pg(&in_list("id", [1, 2, 3]).unwrap());
        assert_eq!(rendered.sql, "id IN ($1, $2, $3)");
        assert_eq!(rendered.params.len(), 3);
        assert_eq!(pg(&not_in("id", vec!["a"]).unwrap()).sql, "id NOT IN ($1)");
    }

    #[test]
    fn test_empty_in_list_is_build_error() {
        let err = in_list("id", Vec::<i32>::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
    }

    #[test]
    fn test_between() {
        let rendered = pg(&between("age", 18, 65));
        assert_eq!(rendered.sql, "age BETWEEN $1 AND $2");
        assert_eq!(rendered.params, vec![Value::I32(18), Value::I32(65)]);
        assert_eq!(pg(&not_between("age", 1, 2)).sql, "age NOT BETWEEN $1 AND $2");
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = (col("a") + col("b")) * 2;
        assert_eq!(pg(&expr).sql, "(a + b) * $1");

        let expr = col("a") - (col("b") - col("c"));
        assert_eq!(pg(&expr).sql, "a - (b - c)");

        let expr = gt(col("price") * col("qty"), 100);
        assert_eq!(pg(&expr).sql, "price * qty > $1");
    }

    #[test]
    fn test_negation_never_emits_comment() {
        assert_eq!(pg(&neg(neg("a"))).sql, "-(-a)");
    }

    #[test]
    fn test_functions_and_aggregates() {
        assert_eq!(pg(&count_all()).sql, "COUNT(*)");
        assert_eq!(pg(&count_distinct("email")).sql, "COUNT(DISTINCT email)");
        assert_eq!(pg(&func("lower", [col("email")])).sql, "lower(email)");
        assert!(func("drop table x;--", []).render(&Dialect::postgres()).is_err());
    }

    #[test]
    fn test_cast_uses_dialect_type() {
        assert_eq!(pg(&cast("price", SqlType::Double)).sql, "CAST(price AS DOUBLE PRECISION)");
        assert_eq!(
            cast("price", SqlType::Double).render(&Dialect::mysql()).unwrap().sql,
            "CAST(price AS DOUBLE)"
        );
    }

    #[test]
    fn test_raw_markers() {
        let expr = raw_with("age > ? AND data ?? 'key'", [21]).unwrap();
        let rendered = pg(&expr);
        assert_eq!(rendered.sql, "age > $1 AND data ? 'key'");
        assert_eq!(rendered.params, vec![Value::I32(21)]);

        let err = raw_with("a = ? AND b = ?", [1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Build);
    }

    #[test]
    fn test_raw_is_parenthesized_as_operand() {
        let expr = and([raw("a = 1 OR b = 2"), eq("c", 3)]);
        assert_eq!(pg(&expr).sql, "(a = 1 OR b = 2) AND c = $1");
        assert_eq!(pg(&raw("now()")).sql, "now()");
    }

    #[test]
    fn test_concat_per_dialect() {
        let expr = col("first").concat(" ").concat(col("last"));
        assert_eq!(pg(&expr).sql, "first || $1 || last");
        assert_eq!(
            expr.render(&Dialect::mysql()).unwrap().sql,
            "CONCAT(CONCAT(first, ?), last)"
        );
    }

    #[test]
    fn test_ilike_requires_postgres() {
        assert_eq!(pg(&ilike("name", "%jo%")).sql, "name ILIKE $1");
        let err = ilike("name", "%jo%").render(&Dialect::sqlite()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dialect);
    }

    #[test]
    fn test_option_values() {
        let rendered = pg(&eq("manager_id", None::<i32>));
        assert_eq!(rendered.params, vec![Value::Null]);
    }

    #[test]
    fn test_and_method_flattens() {
        let expr = eq("a", 1).and(eq("b", 2)).and(eq("c", 3));
        assert!(matches!(&expr, Expr::And(items) if items.len() == 3));
    }

    #[test]
    fn test_all_eq_is_sorted() {
        let mut pairs = BTreeMap::new();
        pairs.insert("b", 2);
        pairs.insert("a", 1);
        let rendered = pg(&all_eq(pairs));
        assert_eq!(rendered.sql, "a = $1 AND b = $2");
        assert_eq!(rendered.params, vec![Value::I32(1), Value::I32(2)]);
    }
}
