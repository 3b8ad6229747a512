//! Common types and traits shared across all query builders

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::expr::{binary, eq, Expr, IntoColumnExpr, IntoExpr};
use crate::render::{RenderedQuery, Renderer};
use crate::{BinaryOp, Dialect, Error, Ident, Result, TableRef, Value};

use super::select::SelectBuilder;

/// Core trait for all statement builders
pub trait QueryBuilder {
    /// Which kind of statement this builder produces
    fn statement_kind(&self) -> StatementKind;

    /// Write the statement into an existing renderer. Used directly for
    /// subqueries so that placeholder numbering continues from the parent.
    fn render_into(&self, renderer: &mut Renderer<'_>) -> Result<()>;

    /// Render the statement into SQL text and its ordered parameters
    fn render(&self, dialect: &Dialect) -> Result<RenderedQuery> {
        let kind = self.statement_kind();
        let mut renderer = if kind.is_ddl() {
            Renderer::inline(dialect)
        } else {
            Renderer::new(dialect)
        };
        if let Err(err) = self.render_into(&mut renderer) {
            tracing::debug!(dialect = dialect.name(), statement = kind.as_str(), error = %err, "render failed");
            return Err(err);
        }
        let rendered = renderer.finish();
        tracing::debug!(
            dialect = dialect.name(),
            statement = kind.as_str(),
            params = rendered.params.len(),
            sql = %rendered.sql,
            "rendered statement"
        );
        Ok(rendered)
    }

    /// Render and keep only the SQL text
    fn to_sql(&self, dialect: &Dialect) -> Result<String> {
        Ok(self.render(dialect)?.sql)
    }
}

/// Statement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    CreateIndex,
    DropTable,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::DropTable => "DROP TABLE",
        }
    }

    /// Schema statements, which render values as literals instead of parameters
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            StatementKind::CreateTable | StatementKind::CreateIndex | StatementKind::DropTable
        )
    }
}

/// Trait for conditions that can be used in WHERE, HAVING and ON clauses
pub trait IntoCondition {
    fn into_condition(self) -> Expr;
}

impl IntoCondition for Expr {
    fn into_condition(self) -> Expr {
        self
    }
}

// Shorthand equality: where_(("age", 18))
impl<T> IntoCondition for (&str, T)
where
    T: IntoExpr,
{
    fn into_condition(self) -> Expr {
        eq(self.0, self.1)
    }
}

// Explicit operators: where_(("age", op::GT, 18))
impl<T> IntoCondition for (&str, BinaryOp, T)
where
    T: IntoExpr,
{
    fn into_condition(self) -> Expr {
        binary(self.0, self.1, self.2)
    }
}

/// Conjoin `condition` onto an optional existing predicate
pub(crate) fn conjoin(existing: Option<Expr>, condition: Expr) -> Option<Expr> {
    Some(match existing {
        Some(current) => current.and(condition),
        None => condition,
    })
}

/// Make `(existing) OR condition`; with nothing to extend the condition stands alone
pub(crate) fn disjoin(existing: Option<Expr>, condition: Expr) -> Option<Expr> {
    Some(match existing {
        Some(current) => current.or(condition),
        None => condition,
    })
}

/// One entry of a select list (or RETURNING list), optionally aliased
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub(crate) fn render(&self, renderer: &mut Renderer<'_>) -> Result<()> {
        renderer.write_expr(&self.expr)?;
        if let Some(alias) = &self.alias {
            renderer.push(" AS ");
            renderer.push_name(alias)?;
        }
        Ok(())
    }
}

impl From<Expr> for SelectItem {
    fn from(expr: Expr) -> Self {
        Self { expr, alias: None }
    }
}

impl From<&str> for SelectItem {
    fn from(column: &str) -> Self {
        Self::from(column.into_column_expr())
    }
}

impl From<String> for SelectItem {
    fn from(column: String) -> Self {
        Self::from(column.into_column_expr())
    }
}

impl From<&String> for SelectItem {
    fn from(column: &String) -> Self {
        Self::from(column.into_column_expr())
    }
}

/// Trait to convert various types into select items
pub trait IntoSelectItems {
    fn into_select_items(self) -> Vec<SelectItem>;
}

impl IntoSelectItems for &str {
    fn into_select_items(self) -> Vec<SelectItem> {
        vec![self.into()]
    }
}

impl IntoSelectItems for String {
    fn into_select_items(self) -> Vec<SelectItem> {
        vec![self.into()]
    }
}

impl IntoSelectItems for Expr {
    fn into_select_items(self) -> Vec<SelectItem> {
        vec![self.into()]
    }
}

impl IntoSelectItems for SelectItem {
    fn into_select_items(self) -> Vec<SelectItem> {
        vec![self]
    }
}

impl<T: Into<SelectItem>> IntoSelectItems for Vec<T> {
    fn into_select_items(self) -> Vec<SelectItem> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<SelectItem>, const N: usize> IntoSelectItems for [T; N] {
    fn into_select_items(self) -> Vec<SelectItem> {
        self.into_iter().map(Into::into).collect()
    }
}

// Mixed tuples: select(("id", count_all().alias("n")))
macro_rules! tuple_select_items {
    ($($name:ident),+) => {
        impl<$($name: Into<SelectItem>),+> IntoSelectItems for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_select_items(self) -> Vec<SelectItem> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

tuple_select_items!(A, B);
tuple_select_items!(A, B, C);
tuple_select_items!(A, B, C, D);
tuple_select_items!(A, B, C, D, E);
tuple_select_items!(A, B, C, D, E, F);

/// Trait to convert various types into plain column names
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

macro_rules! tuple_columns {
    (@str $idx:tt) => { &str };
    ($($idx:tt),+) => {
        impl IntoColumns for ($(tuple_columns!(@str $idx),)+) {
            fn into_columns(self) -> Vec<String> {
                vec![$(self.$idx.to_string()),+]
            }
        }
    };
}

tuple_columns!(0, 1);
tuple_columns!(0, 1, 2);
tuple_columns!(0, 1, 2, 3);
tuple_columns!(0, 1, 2, 3, 4);

/// JOIN types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
            JoinKind::Right => write!(f, "RIGHT JOIN"),
            JoinKind::Full => write!(f, "FULL OUTER JOIN"),
            JoinKind::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

/// A table-like source in FROM or JOIN position
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(TableRef),
    /// Derived table: `(SELECT ...) AS alias`
    Subquery {
        query: Box<SelectBuilder>,
        alias: String,
    },
}

impl TableSource {
    pub(crate) fn render(&self, renderer: &mut Renderer<'_>) -> Result<()> {
        match self {
            TableSource::Table(table) => renderer.push_table(table),
            TableSource::Subquery { query, alias } => {
                renderer.write_subquery(&**query)?;
                renderer.push(" AS ");
                renderer.push_name(alias)
            }
        }
    }
}

impl From<TableRef> for TableSource {
    fn from(table: TableRef) -> Self {
        TableSource::Table(table)
    }
}

impl From<&str> for TableSource {
    fn from(name: &str) -> Self {
        TableSource::Table(TableRef::new(name))
    }
}

impl From<String> for TableSource {
    fn from(name: String) -> Self {
        TableSource::Table(TableRef::new(name))
    }
}

impl From<Ident> for TableSource {
    fn from(name: Ident) -> Self {
        TableSource::Table(TableRef::new(name))
    }
}

/// A complete JOIN clause with its table and ON condition
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub source: TableSource,
    pub on: Option<Expr>,
}

impl Join {
    /// Build a join, enforcing that CROSS joins have no condition and all
    /// other kinds have one
    pub fn new(kind: JoinKind, source: impl Into<TableSource>, on: Option<Expr>) -> Result<Self> {
        match (kind, &on) {
            (JoinKind::Cross, Some(_)) => {
                return Err(Error::build("CROSS JOIN cannot have an ON condition"))
            }
            (JoinKind::Cross, None) | (_, Some(_)) => {}
            (_, None) => return Err(Error::build(format!("{} requires an ON condition", kind))),
        }
        Ok(Self {
            kind,
            source: source.into(),
            on,
        })
    }

    pub(crate) fn render(&self, renderer: &mut Renderer<'_>) -> Result<()> {
        if self.kind == JoinKind::Full {
            renderer.dialect().require(crate::Feature::FullJoin)?;
        }
        renderer.push(&self.kind.to_string());
        renderer.push(" ");
        self.source.render(renderer)?;
        if let Some(on) = &self.on {
            renderer.push(" ON ");
            renderer.write_expr(on)?;
        }
        Ok(())
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Placement of NULLs in ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// An ORDER BY term
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: SortDirection,
    pub nulls: Option<NullsOrder>,
}

impl OrderBy {
    pub(crate) fn render(&self, renderer: &mut Renderer<'_>) -> Result<()> {
        renderer.write_expr(&self.expr)?;
        renderer.push(" ");
        renderer.push(&self.direction.to_string());
        if let Some(nulls) = self.nulls {
            renderer.dialect().require(crate::Feature::NullsOrdering)?;
            renderer.push(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
        Ok(())
    }
}

/// One row of INSERT values
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Values keyed by column name; reordered to the declared column order
    Named(Vec<(String, Expr)>),
    /// Values in declared column order
    Positional(Vec<Expr>),
}

impl Row {
    pub fn named<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: IntoExpr,
    {
        Row::Named(
            pairs
                .into_iter()
                .map(|(column, value)| (column.into(), value.into_expr()))
                .collect(),
        )
    }

    pub fn positional<V: IntoExpr>(values: impl IntoIterator<Item = V>) -> Self {
        Row::Positional(values.into_iter().map(IntoExpr::into_expr).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Named(pairs) => pairs.len(),
            Row::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait to convert various types into an INSERT row
pub trait IntoInsertData {
    fn into_insert_data(self) -> Row;
}

impl IntoInsertData for Row {
    fn into_insert_data(self) -> Row {
        self
    }
}

impl<K: Into<String>, V: IntoExpr> IntoInsertData for Vec<(K, V)> {
    fn into_insert_data(self) -> Row {
        Row::named(self)
    }
}

impl<K: Into<String>, V: IntoExpr, const N: usize> IntoInsertData for [(K, V); N] {
    fn into_insert_data(self) -> Row {
        Row::named(self)
    }
}

impl<K: Into<String>, V: IntoExpr> IntoInsertData for BTreeMap<K, V> {
    fn into_insert_data(self) -> Row {
        Row::named(self)
    }
}

impl<K: Into<String>, V: IntoExpr, S: BuildHasher> IntoInsertData for HashMap<K, V, S> {
    fn into_insert_data(self) -> Row {
        Row::Named(sorted_pairs(self))
    }
}

impl IntoInsertData for Vec<Value> {
    fn into_insert_data(self) -> Row {
        Row::positional(self)
    }
}

impl IntoInsertData for Vec<Expr> {
    fn into_insert_data(self) -> Row {
        Row::Positional(self)
    }
}

/// Trait to convert various types into UPDATE assignments
pub trait IntoUpdateData {
    fn into_update_data(self) -> Vec<(String, Expr)>;
}

impl<K: Into<String>, V: IntoExpr> IntoUpdateData for (K, V) {
    fn into_update_data(self) -> Vec<(String, Expr)> {
        vec![(self.0.into(), self.1.into_expr())]
    }
}

impl<K: Into<String>, V: IntoExpr> IntoUpdateData for Vec<(K, V)> {
    fn into_update_data(self) -> Vec<(String, Expr)> {
        self.into_iter()
            .map(|(column, value)| (column.into(), value.into_expr()))
            .collect()
    }
}

impl<K: Into<String>, V: IntoExpr, const N: usize> IntoUpdateData for [(K, V); N] {
    fn into_update_data(self) -> Vec<(String, Expr)> {
        self.into_iter()
            .map(|(column, value)| (column.into(), value.into_expr()))
            .collect()
    }
}

impl<K: Into<String>, V: IntoExpr> IntoUpdateData for BTreeMap<K, V> {
    fn into_update_data(self) -> Vec<(String, Expr)> {
        self.into_iter()
            .map(|(column, value)| (column.into(), value.into_expr()))
            .collect()
    }
}

impl<K: Into<String>, V: IntoExpr, S: BuildHasher> IntoUpdateData for HashMap<K, V, S> {
    fn into_update_data(self) -> Vec<(String, Expr)> {
        sorted_pairs(self)
    }
}

/// Hash maps have no stable order; sort by column name so output is deterministic
fn sorted_pairs<K, V, S>(map: HashMap<K, V, S>) -> Vec<(String, Expr)>
where
    K: Into<String>,
    V: IntoExpr,
{
    let mut pairs: Vec<(String, Expr)> = map
        .into_iter()
        .map(|(column, value)| (column.into(), value.into_expr()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Write ` RETURNING items` when any were requested
pub(crate) fn render_returning(renderer: &mut Renderer<'_>, items: &[SelectItem]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    renderer.dialect().require(crate::Feature::Returning)?;
    renderer.push(" RETURNING ");
    renderer.write_list(items, |r, item| item.render(r))
}

/// Reject a column list that names the same column twice
pub(crate) fn ensure_unique_columns<'a>(
    what: &str,
    columns: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(Error::build(format!(
                "{} lists column '{}' more than once",
                what, column
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;
    use crate::operator::op;

    fn pg_expr(expr: &Expr) -> String {
        expr.render(&Dialect::postgres()).unwrap().sql
    }

    #[test]
    fn test_condition_trait_implementations() {
        // shorthand equality
        assert_eq!(pg_expr(&("name", "John").into_condition()), "name = $1");

        // explicit operators
        assert_eq!(pg_expr(&("age", op::GT, 18).into_condition()), "age > $1");

        // expressions pass through
        let condition = col("a").into_condition();
        assert_eq!(condition, col("a"));
    }

    #[test]
    fn test_into_columns_implementations() {
        assert_eq!("name".into_columns(), vec!["name"]);
        assert_eq!(vec!["a", "b"].into_columns(), vec!["a", "b"]);
        assert_eq!(["a", "b", "c"].into_columns(), vec!["a", "b", "c"]);
        assert_eq!(("a", "b").into_columns(), vec!["a", "b"]);
        assert_eq!(("a", "b", "c", "d", "e").into_columns().len(), 5);
    }

    #[test]
    fn test_into_select_items() {
        let items = ("id", col("name").alias("n")).into_select_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].alias.as_deref(), Some("n"));

        let items = vec!["a", "b"].into_select_items();
        assert_eq!(items[0].expr, col("a"));
    }

    #[test]
    fn test_join_condition_rules() {
        assert!(Join::new(JoinKind::Inner, "orders", None).is_err());
        assert!(Join::new(JoinKind::Cross, "sizes", Some(col("a"))).is_err());
        assert!(Join::new(JoinKind::Cross, "sizes", None).is_ok());
        assert!(Join::new(JoinKind::Left, "orders", Some(col("a"))).is_ok());
    }

    #[test]
    fn test_hash_map_rows_are_sorted() {
        let mut data = HashMap::new();
        data.insert("name", Value::from("John"));
        data.insert("age", Value::from(30));
        data.insert("email", Value::from("j@example.com"));

        match data.into_insert_data() {
            Row::Named(pairs) => {
                let names: Vec<&str> = pairs.iter().map(|(c, _)| c.as_str()).collect();
                assert_eq!(names, vec!["age", "email", "name"]);
            }
            Row::Positional(_) => panic!("expected a named row"),
        }
    }

    #[test]
    fn test_update_data_from_pair() {
        let data = ("age", 25).into_update_data();
        assert_eq!(data, vec![("age".to_string(), Expr::Literal(Value::I32(25)))]);
    }

    #[test]
    fn test_duplicate_columns_detected() {
        let columns = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert!(ensure_unique_columns("INSERT", &columns).is_err());
        assert!(ensure_unique_columns("INSERT", &columns[..2]).is_ok());
    }

    #[test]
    fn test_ddl_kinds() {
        assert!(StatementKind::CreateTable.is_ddl());
        assert!(!StatementKind::Select.is_ddl());
        assert_eq!(StatementKind::DropTable.as_str(), "DROP TABLE");
    }
}
