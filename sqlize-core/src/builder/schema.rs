//! Schema statement builders: CREATE TABLE, CREATE INDEX, DROP TABLE.
//!
//! Databases do not accept bind parameters in DDL, so these statements render
//! values (defaults, CHECK constraints, partial index predicates) as escaped
//! literals through [`Dialect::literal`](crate::Dialect::literal). A rendered
//! schema statement therefore always has an empty parameter list.

use crate::dialect::{DialectFamily, SqlType};
use crate::expr::Expr;
use crate::render::Renderer;
use crate::{Error, Feature, Ident, Result};

use super::common::{ensure_unique_columns, IntoColumns, QueryBuilder, StatementKind};

/// Action taken on referencing rows when the referenced row changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
}

impl ReferentialAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

/// A column definition inside CREATE TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    name: String,
    ty: SqlType,
    not_null: bool,
    primary_key: bool,
    unique: bool,
    auto_increment: bool,
    default: Option<Expr>,
    check: Option<Expr>,
    references: Option<(Ident, String)>,
    on_delete: Option<ReferentialAction>,
}

impl ColumnDef {
    pub fn new(name: &str, ty: SqlType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            not_null: false,
            primary_key: false,
            unique: false,
            auto_increment: false,
            default: None,
            check: None,
            references: None,
            on_delete: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Let the database generate values (identity / AUTO_INCREMENT / AUTOINCREMENT)
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Column default, rendered as a literal (use `raw` for functions like `now()`)
    pub fn default(mut self, value: impl crate::IntoExpr) -> Self {
        self.default = Some(value.into_expr());
        self
    }

    pub fn check(mut self, condition: Expr) -> Self {
        self.check = Some(condition);
        self
    }

    /// Inline foreign key: `REFERENCES table (column)`
    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.references = Some((Ident::parse(table), column.to_string()));
        self
    }

    /// ON DELETE action of the inline foreign key
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, r: &mut Renderer<'_>) -> Result<()> {
        let dialect = r.dialect();
        r.push_name(&self.name)?;
        r.push(" ");
        r.push(&dialect.type_name(&self.ty)?);
        if self.primary_key {
            r.push(" PRIMARY KEY");
        }
        if self.auto_increment {
            if dialect.family() == DialectFamily::Sqlite && !self.primary_key {
                return Err(Error::dialect(
                    dialect.name(),
                    format!(
                        "AUTOINCREMENT on '{}' requires a column-level PRIMARY KEY",
                        self.name
                    ),
                ));
            }
            r.push(" ");
            r.push(dialect.auto_increment());
        }
        if self.not_null {
            r.push(" NOT NULL");
        }
        if self.unique {
            r.push(" UNIQUE");
        }
        if let Some(default) = &self.default {
            r.push(" DEFAULT ");
            r.write_expr(default)?;
        }
        if let Some(check) = &self.check {
            r.push(" CHECK (");
            r.write_expr(check)?;
            r.push(")");
        }
        if let Some((table, column)) = &self.references {
            r.push(" REFERENCES ");
            r.push_ident(table)?;
            r.push(" (");
            r.push_name(column)?;
            r.push(")");
            if let Some(action) = self.on_delete {
                r.push(" ON DELETE ");
                r.push(action.as_str());
            }
        } else if self.on_delete.is_some() {
            return Err(Error::build(format!(
                "column '{}' has ON DELETE without REFERENCES",
                self.name
            )));
        }
        Ok(())
    }
}

/// Table-level foreign key constraint
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    columns: Vec<String>,
    table: Ident,
    referenced: Vec<String>,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    /// `FOREIGN KEY (columns) REFERENCES table (referenced)`
    pub fn new<C, R>(columns: C, table: &str, referenced: R) -> Self
    where
        C: IntoColumns,
        R: IntoColumns,
    {
        Self {
            columns: columns.into_columns(),
            table: Ident::parse(table),
            referenced: referenced.into_columns(),
            on_delete: None,
            on_update: None,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    fn render(&self, r: &mut Renderer<'_>) -> Result<()> {
        if self.columns.is_empty() || self.columns.len() != self.referenced.len() {
            return Err(Error::build(format!(
                "foreign key to '{}' must pair each column with a referenced column",
                self.table
            )));
        }
        r.push("FOREIGN KEY (");
        r.write_list(&self.columns, |r, column| r.push_name(column))?;
        r.push(") REFERENCES ");
        r.push_ident(&self.table)?;
        r.push(" (");
        r.write_list(&self.referenced, |r, column| r.push_name(column))?;
        r.push(")");
        if let Some(action) = self.on_delete {
            r.push(" ON DELETE ");
            r.push(action.as_str());
        }
        if let Some(action) = self.on_update {
            r.push(" ON UPDATE ");
            r.push(action.as_str());
        }
        Ok(())
    }
}

/// CREATE TABLE builder
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableBuilder {
    name: Ident,
    if_not_exists: bool,
    columns: Vec<ColumnDef>,
    primary_key: Option<Vec<String>>,
    unique: Vec<Vec<String>>,
    foreign_keys: Vec<ForeignKey>,
    checks: Vec<Expr>,
}

impl CreateTableBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::parse(name),
            if_not_exists: false,
            columns: Vec::new(),
            primary_key: None,
            unique: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Append a column definition
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Table-level (possibly composite) primary key; replaces an earlier one
    pub fn primary_key<C: IntoColumns>(mut self, columns: C) -> Self {
        self.primary_key = Some(columns.into_columns());
        self
    }

    /// Append a UNIQUE constraint over `columns`
    pub fn unique<C: IntoColumns>(mut self, columns: C) -> Self {
        self.unique.push(columns.into_columns());
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Append a table CHECK constraint
    pub fn check(mut self, condition: Expr) -> Self {
        self.checks.push(condition);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::usage(format!(
                "CREATE TABLE {} requires at least one column",
                self.name
            )));
        }
        ensure_unique_columns("CREATE TABLE", self.columns.iter().map(|c| &c.name))?;

        let inline_keys = self.columns.iter().filter(|c| c.primary_key).count();
        if inline_keys + usize::from(self.primary_key.is_some()) > 1 {
            return Err(Error::build(format!(
                "CREATE TABLE {} declares more than one primary key",
                self.name
            )));
        }

        let constrained = self
            .primary_key
            .iter()
            .chain(self.unique.iter())
            .chain(self.foreign_keys.iter().map(|fk| &fk.columns));
        for columns in constrained {
            if columns.is_empty() {
                return Err(Error::build("table constraint needs at least one column"));
            }
            if let Some(unknown) = columns
                .iter()
                .find(|name| !self.columns.iter().any(|c| &c.name == *name))
            {
                return Err(Error::build(format!(
                    "constraint references unknown column '{}'",
                    unknown
                )));
            }
        }
        Ok(())
    }
}

impl QueryBuilder for CreateTableBuilder {
    fn statement_kind(&self) -> StatementKind {
        StatementKind::CreateTable
    }

    fn render_into(&self, r: &mut Renderer<'_>) -> Result<()> {
        self.validate()?;

        r.push("CREATE TABLE ");
        if self.if_not_exists {
            r.push("IF NOT EXISTS ");
        }
        r.push_ident(&self.name)?;
        r.push(" (");
        r.write_list(&self.columns, |r, column| column.render(r))?;

        if let Some(columns) = &self.primary_key {
            r.push(", PRIMARY KEY (");
            r.write_list(columns, |r, column| r.push_name(column))?;
            r.push(")");
        }
        for columns in &self.unique {
            r.push(", UNIQUE (");
            r.write_list(columns, |r, column| r.push_name(column))?;
            r.push(")");
        }
        for foreign_key in &self.foreign_keys {
            r.push(", ");
            foreign_key.render(r)?;
        }
        for check in &self.checks {
            r.push(", CHECK (");
            r.write_expr(check)?;
            r.push(")");
        }
        r.push(")");
        Ok(())
    }
}

/// CREATE INDEX builder
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexBuilder {
    name: String,
    table: Option<Ident>,
    columns: Vec<String>,
    unique: bool,
    if_not_exists: bool,
    predicate: Option<Expr>,
}

impl CreateIndexBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table: None,
            columns: Vec::new(),
            unique: false,
            if_not_exists: false,
            predicate: None,
        }
    }

    /// Table the index is built on
    pub fn on(mut self, table: &str) -> Self {
        self.table = Some(Ident::parse(table));
        self
    }

    /// Append indexed columns
    pub fn columns<C: IntoColumns>(mut self, columns: C) -> Self {
        self.columns.extend(columns.into_columns());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Make this a partial index, conjoining with any earlier predicate
    pub fn where_(mut self, condition: Expr) -> Self {
        self.predicate = super::common::conjoin(self.predicate, condition);
        self
    }
}

impl QueryBuilder for CreateIndexBuilder {
    fn statement_kind(&self) -> StatementKind {
        StatementKind::CreateIndex
    }

    fn render_into(&self, r: &mut Renderer<'_>) -> Result<()> {
        let table = self.table.as_ref().ok_or_else(|| {
            Error::usage(format!("CREATE INDEX {} requires a table (.on)", self.name))
        })?;
        if self.columns.is_empty() {
            return Err(Error::usage(format!(
                "CREATE INDEX {} requires at least one column",
                self.name
            )));
        }

        r.push("CREATE ");
        if self.unique {
            r.push("UNIQUE ");
        }
        r.push("INDEX ");
        if self.if_not_exists {
            r.dialect().require(Feature::CreateIndexIfNotExists)?;
            r.push("IF NOT EXISTS ");
        }
        r.push_name(&self.name)?;
        r.push(" ON ");
        r.push_ident(table)?;
        r.push(" (");
        r.write_list(&self.columns, |r, column| r.push_name(column))?;
        r.push(")");

        if let Some(predicate) = &self.predicate {
            r.dialect().require(Feature::PartialIndex)?;
            r.push(" WHERE ");
            r.write_expr(predicate)?;
        }
        Ok(())
    }
}

/// DROP TABLE builder
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableBuilder {
    name: Ident,
    if_exists: bool,
    cascade: bool,
}

impl DropTableBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::parse(name),
            if_exists: false,
            cascade: false,
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Also drop dependent objects
    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }
}

impl QueryBuilder for DropTableBuilder {
    fn statement_kind(&self) -> StatementKind {
        StatementKind::DropTable
    }

    fn render_into(&self, r: &mut Renderer<'_>) -> Result<()> {
        r.push("DROP TABLE ");
        if self.if_exists {
            r.push("IF EXISTS ");
        }
        r.push_ident(&self.name)?;
        if self.cascade {
            r.dialect().require(Feature::DropCascade)?;
            r.push(" CASCADE");
        }
        Ok(())
    }
}
