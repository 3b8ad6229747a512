//! Query builder module

pub mod common;
pub mod delete;
pub mod insert;
pub mod schema;
pub mod select;
pub mod update;

// Re-export types from submodules
pub use common::{
    IntoColumns, IntoCondition, IntoInsertData, IntoSelectItems, IntoUpdateData, Join, JoinKind,
    NullsOrder, OrderBy, QueryBuilder, Row, SelectItem, SortDirection, StatementKind, TableSource,
};
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use schema::{
    ColumnDef, CreateIndexBuilder, CreateTableBuilder, DropTableBuilder, ForeignKey,
    ReferentialAction,
};
pub use select::SelectBuilder;
pub use update::UpdateBuilder;
