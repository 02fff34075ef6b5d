//! Convenient imports for typical `sqlforge` usage.
//!
//! ```ignore
//! use sqlforge::prelude::*;
//! ```

pub use crate::{
    AnsiDialect, DefaultDialect, Dialect, Expr, ExprExt, FieldDescriptor, FieldRef, IntoExpr,
    Join, JoinKind, PostgresDialect, ReferencedTable, Select, SqlError, SqlResult, SqlValue,
    TableDescriptor, TableModel, insert_into, select, update,
};

pub use crate::{avg, case, count, count_all, func, list, max, min, nvl, param, raw, sum, val};

#[cfg(feature = "derive")]
pub use crate::Table;
