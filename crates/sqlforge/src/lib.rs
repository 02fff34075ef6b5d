//! # sqlforge
//!
//! Typed SQL construction: build statements as expression trees, render them
//! to dialect-specific SQL text with stable formatting.
//!
//! ## Features
//!
//! - **Closed expression tree**: every node is an [`Expr`] variant
//! - **Field transforms**: encrypted, hashed and password-hashed columns are
//!   wrapped in the dialect's SQL on read and write
//! - **Deterministic aliases**: repeated tables get `name`, `name2`, ... in
//!   registration order; correlated subqueries share the outer context
//! - **Stable output**: select lists sorted by alias, long lists broken one
//!   item per line
//! - **Pluggable dialects**: default, PostgreSQL (pgcrypto), ANSI
//!
//! ## Quick start
//!
//! ```ignore
//! use sqlforge::prelude::*;
//!
//! let tst = TableDescriptor::builder("tst", "tst")
//!     .column("id", "tst_id")
//!     .column("name", "tst_name")
//!     .field(FieldDescriptor::new("secret", "tst_secret").encrypted())
//!     .column("cc", "tst_cc")
//!     .build()?;
//! let t = ReferencedTable::new(&tst);
//!
//! let sql = select(&t)
//!     .filter(t.field("name")?.like(param("pattern")))
//!     .order_by(t.field("id")?.desc())
//!     .limit(10)
//!     .to_sql(&PostgresDialect::new())?;
//!
//! let sql = insert_into(&t).set("name", "alice")?.to_sql(&PostgresDialect::new())?;
//! // insert into tst (
//! //   tst_cc,
//! //   tst_name
//! // ) values (
//! //   0,
//! //   'alice'
//! // )
//! # Ok::<(), sqlforge::SqlError>(())
//! ```

pub mod config;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod format;
pub mod ident;
pub mod prelude;
pub mod schema;
pub mod stmt;

pub use config::{Config, DialectConfig, FieldDef, TableDef};
pub use context::{QueryContext, RenderContext};
pub use dialect::{
    AnsiDialect, DefaultDialect, Dialect, PostgresDialect, default_dialect, set_default_dialect,
};
pub use error::{SqlError, SqlResult};
pub use expr::{
    BinaryOp, CaseExpr, Expr, ExprExt, InSet, IntoExpr, LogicalOp, OrderBy, SqlValue, aggregate,
    avg, case, count, count_all, func, list, max, min, nvl, param, paren, raw, sum, val,
};
pub use schema::{
    CalculatedField, FieldDescriptor, FieldRef, ReferencedTable, Registry, TableBuilder,
    TableDescriptor, TableModel, TableRefId, TableRegistration, declare_table, global_registry,
    table_by_name, table_by_physical_name,
};
pub use stmt::{
    Clause, Clauses, Insert, Join, JoinKind, JoinSide, Select, SelectField, Source, Update,
    WriteValue, insert_into, select, update,
};

// Re-export inventory for use by derive macros
pub use inventory;

#[cfg(feature = "derive")]
pub use sqlforge_derive::Table;
