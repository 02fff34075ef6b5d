//! INSERT statement builder.

use super::clauses::Clauses;
use super::log_rendered;
use crate::context::RenderContext;
use crate::dialect::{Dialect, default_dialect};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoExpr};
use crate::format::indent;
use crate::schema::{FieldRef, ReferencedTable};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Callback producing a value from the referenced table being written.
pub type DeferredValue = dyn Fn(&ReferencedTable) -> SqlResult<Expr> + Send + Sync;

/// Value written to one field.
#[derive(Clone)]
pub enum WriteValue {
    Expr(Expr),
    Deferred(Arc<DeferredValue>),
}

impl WriteValue {
    pub(crate) fn resolve(&self, table: &ReferencedTable) -> SqlResult<Expr> {
        match self {
            WriteValue::Expr(expr) => Ok(expr.clone()),
            WriteValue::Deferred(f) => f(table),
        }
    }
}

impl fmt::Debug for WriteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteValue::Expr(expr) => f.debug_tuple("Expr").field(expr).finish(),
            WriteValue::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Field values keyed by physical column; a later assignment replaces an
/// earlier one.
#[derive(Debug, Clone, Default)]
pub(crate) struct Assignments {
    values: BTreeMap<String, (FieldRef, WriteValue)>,
}

impl Assignments {
    pub(crate) fn set(
        &mut self,
        table: &ReferencedTable,
        field: FieldRef,
        value: WriteValue,
    ) -> SqlResult<()> {
        if !Arc::ptr_eq(field.table().descriptor(), table.descriptor()) {
            return Err(SqlError::invalid_statement(format!(
                "field '{}' does not belong to table '{}'",
                field.name(),
                table.descriptor().name()
            )));
        }
        let Some(column) = field.column().map(str::to_string) else {
            return Err(SqlError::invalid_statement(format!(
                "calculated field '{}' cannot be written",
                field.name()
            )));
        };
        self.values.insert(column, (field, value));
        Ok(())
    }

    /// `(column, write sql)` pairs in column order, with defaults injected
    /// for fields the caller left out.
    pub(crate) fn render(
        &self,
        table: &ReferencedTable,
        is_insert: bool,
        ctx: &mut RenderContext<'_>,
    ) -> SqlResult<Vec<(String, String)>> {
        let mut resolved: BTreeMap<String, (FieldRef, Option<Expr>)> = BTreeMap::new();
        for (column, (field, value)) in &self.values {
            resolved.insert(column.clone(), (field.clone(), Some(value.resolve(table)?)));
        }
        for field in table.fields() {
            let Some(descriptor) = field.descriptor() else {
                continue;
            };
            let defaults = if is_insert {
                descriptor.defaults_on_insert()
            } else {
                descriptor.defaults_on_update()
            };
            if defaults && !resolved.contains_key(&descriptor.column) {
                resolved.insert(descriptor.column.clone(), (field, None));
            }
        }

        resolved
            .into_iter()
            .map(|(column, (field, value))| {
                let sql = field.write_value_sql(value.as_ref(), is_insert, ctx)?;
                Ok((column, sql))
            })
            .collect()
    }
}

/// INSERT builder.
///
/// Counter and timestamp columns the caller does not set are filled with
/// their defaults (`0`, the dialect's `now`).
#[derive(Debug, Clone)]
pub struct Insert {
    table: ReferencedTable,
    values: Assignments,
}

impl Insert {
    pub fn new(table: impl Into<ReferencedTable>) -> Self {
        Self {
            table: table.into(),
            values: Assignments::default(),
        }
    }

    pub fn table(&self) -> &ReferencedTable {
        &self.table
    }

    /// Set a field by logical name.
    pub fn set(mut self, name: &str, value: impl IntoExpr) -> SqlResult<Self> {
        let field = self.table.field(name)?;
        self.values
            .set(&self.table, field, WriteValue::Expr(value.into_expr()))?;
        Ok(self)
    }

    /// Set a field through a reference to it.
    pub fn set_field(mut self, field: FieldRef, value: impl IntoExpr) -> SqlResult<Self> {
        self.values
            .set(&self.table, field, WriteValue::Expr(value.into_expr()))?;
        Ok(self)
    }

    /// Set a field to a value computed from the table being inserted into.
    pub fn set_with<F>(mut self, name: &str, f: F) -> SqlResult<Self>
    where
        F: Fn(&ReferencedTable) -> SqlResult<Expr> + Send + Sync + 'static,
    {
        let field = self.table.field(name)?;
        self.values
            .set(&self.table, field, WriteValue::Deferred(Arc::new(f)))?;
        Ok(self)
    }

    pub fn to_sql(&self, dialect: &dyn Dialect) -> SqlResult<String> {
        let mut ctx = RenderContext::new(dialect);
        let sql = self.render(&mut ctx)?;
        log_rendered("insert", dialect, &sql);
        Ok(sql)
    }

    pub fn to_sql_default(&self) -> SqlResult<String> {
        let dialect = default_dialect();
        self.to_sql(dialect.as_ref())
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        Ok(self.render_clauses(ctx)?.to_sql())
    }

    pub fn render_clauses(&self, ctx: &mut RenderContext<'_>) -> SqlResult<Clauses> {
        let table = self.table.descriptor().table();
        let pairs = self.values.render(&self.table, true, ctx)?;

        let sql = match pairs.as_slice() {
            [] => format!("insert into {table} default values"),
            [(column, value)] => {
                format!("insert into {table} ({column}) values ({value})")
            }
            _ => {
                let columns = pairs
                    .iter()
                    .map(|(c, _)| indent(c))
                    .collect::<Vec<_>>()
                    .join(",\n");
                let values = pairs
                    .iter()
                    .map(|(_, v)| indent(v))
                    .collect::<Vec<_>>()
                    .join(",\n");
                format!("insert into {table} (\n{columns}\n) values (\n{values}\n)")
            }
        };

        let mut clauses = Clauses::new();
        clauses.push("insert", sql);
        ctx.dialect().finish_insert(&mut clauses, self)?;
        Ok(clauses)
    }
}
