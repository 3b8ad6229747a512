//! A closed sum over every statement builder.
//!
//! Useful when statements of different kinds are collected together, e.g. a
//! migration made of CREATE TABLE and CREATE INDEX statements.

use crate::builder::{
    CreateIndexBuilder, CreateTableBuilder, DeleteBuilder, DropTableBuilder, InsertBuilder,
    QueryBuilder, SelectBuilder, StatementKind, UpdateBuilder,
};
use crate::render::Renderer;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(SelectBuilder),
    Insert(InsertBuilder),
    Update(UpdateBuilder),
    Delete(DeleteBuilder),
    CreateTable(CreateTableBuilder),
    CreateIndex(CreateIndexBuilder),
    DropTable(DropTableBuilder),
}

impl Query {
    fn as_builder(&self) -> &dyn QueryBuilder {
        match self {
            Query::Select(q) => q,
            Query::Insert(q) => q,
            Query::Update(q) => q,
            Query::Delete(q) => q,
            Query::CreateTable(q) => q,
            Query::CreateIndex(q) => q,
            Query::DropTable(q) => q,
        }
    }
}

impl QueryBuilder for Query {
    fn statement_kind(&self) -> StatementKind {
        self.as_builder().statement_kind()
    }

    fn render_into(&self, renderer: &mut Renderer<'_>) -> Result<()> {
        self.as_builder().render_into(renderer)
    }
}

macro_rules! query_from {
    ($($variant:ident => $builder:ty),* $(,)?) => {
        $(
            impl From<$builder> for Query {
                fn from(query: $builder) -> Self {
                    Query::$variant(query)
                }
            }
        )*
    };
}

query_from! {
    Select => SelectBuilder,
    Insert => InsertBuilder,
    Update => UpdateBuilder,
    Delete => DeleteBuilder,
    CreateTable => CreateTableBuilder,
    CreateIndex => CreateIndexBuilder,
    DropTable => DropTableBuilder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        create_index, create_table, delete_from, drop_table, select_all, ColumnDef, Dialect,
        SqlType,
    };

    #[test]
    fn test_builders_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Query>();
        assert_send_sync::<SelectBuilder>();
        assert_send_sync::<Dialect>();
    }

    #[test]
    fn test_mixed_statements() {
        let migration: Vec<Query> = vec![
            create_table("tags")
                .column(ColumnDef::new("id", SqlType::Integer).primary_key())
                .into(),
            create_index("idx_tags_id").on("tags").columns("id").into(),
            drop_table("old_tags").into(),
        ];
        let sql: Vec<String> = migration
            .iter()
            .map(|q| q.to_sql(&Dialect::sqlite()).unwrap())
            .collect();
        assert_eq!(
            sql,
            vec![
                "CREATE TABLE tags (id INTEGER PRIMARY KEY)",
                "CREATE INDEX idx_tags_id ON tags (id)",
                "DROP TABLE old_tags",
            ]
        );
    }

    #[test]
    fn test_kind_and_parameters_follow_the_wrapped_builder() {
        let query = Query::from(delete_from("users").where_(("id", 4)));
        assert_eq!(query.statement_kind(), StatementKind::Delete);
        let rendered = query.render(&Dialect::postgres()).unwrap();
        assert_eq!(rendered.sql, "DELETE FROM users WHERE id = $1");
        assert_eq!(rendered.params.len(), 1);

        let query = Query::from(select_all().from("users"));
        assert_eq!(query.statement_kind(), StatementKind::Select);
    }
}
