//! Statement builders: SELECT, INSERT and UPDATE.
//!
//! Builders are plain values configured by chained calls. Rendering takes
//! `&self`, so a builder can be rendered any number of times; each render
//! allocates table aliases in the supplied [`RenderContext`](crate::RenderContext)
//! or in a private one.

mod clauses;
mod insert;
mod join;
mod select;
mod update;

pub use clauses::{Clause, Clauses};
pub use insert::{DeferredValue, Insert, WriteValue};
pub use join::{Join, JoinKind, JoinSide};
pub use select::{Select, SelectField, Source};
pub use update::Update;

use crate::dialect::Dialect;
use crate::schema::ReferencedTable;

/// Start a SELECT from one table.
pub fn select(table: impl Into<ReferencedTable>) -> Select {
    Select::from_table(table)
}

/// Start an INSERT into a table.
pub fn insert_into(table: impl Into<ReferencedTable>) -> Insert {
    Insert::new(table)
}

/// Start an UPDATE of a table.
pub fn update(table: impl Into<ReferencedTable>) -> Update {
    Update::new(table)
}

pub(crate) fn log_rendered(statement: &'static str, dialect: &dyn Dialect, sql: &str) {
    tracing::debug!(
        target: "sqlforge.sql",
        statement,
        dialect = dialect.name(),
        sql,
        "rendered statement"
    );
}
