//! UPDATE statement builder.

use super::clauses::Clauses;
use super::insert::{Assignments, WriteValue};
use super::log_rendered;
use crate::context::RenderContext;
use crate::dialect::{Dialect, default_dialect};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, ExprExt, IntoExpr};
use crate::format::indent;
use crate::schema::{FieldRef, ReferencedTable};
use std::sync::Arc;

/// UPDATE builder.
///
/// Counter and update-timestamp columns the caller does not set are
/// written as `<col> + 1` and the dialect's `now`. An UPDATE without a WHERE
/// clause renders, but is logged at `warn`.
#[derive(Debug, Clone)]
pub struct Update {
    table: ReferencedTable,
    values: Assignments,
    filter: Option<Expr>,
}

impl Update {
    pub fn new(table: impl Into<ReferencedTable>) -> Self {
        Self {
            table: table.into(),
            values: Assignments::default(),
            filter: None,
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

    pub fn set_field(mut self, field: FieldRef, value: impl IntoExpr) -> SqlResult<Self> {
        self.values
            .set(&self.table, field, WriteValue::Expr(value.into_expr()))?;
        Ok(self)
    }

    /// Set a field to a value computed from the table being updated.
    pub fn set_with<F>(mut self, name: &str, f: F) -> SqlResult<Self>
    where
        F: Fn(&ReferencedTable) -> SqlResult<Expr> + Send + Sync + 'static,
    {
        let field = self.table.field(name)?;
        self.values
            .set(&self.table, field, WriteValue::Deferred(Arc::new(f)))?;
        Ok(self)
    }

    /// Add a WHERE condition; successive calls are ANDed.
    pub fn filter(mut self, condition: impl IntoExpr) -> Self {
        let condition = condition.into_expr();
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn to_sql(&self, dialect: &dyn Dialect) -> SqlResult<String> {
        let mut ctx = RenderContext::new(dialect);
        let sql = self.render(&mut ctx)?;
        log_rendered("update", dialect, &sql);
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
        let head = self.table.to_table_sql(ctx)?;
        let pairs = self.values.render(&self.table, false, ctx)?;
        if pairs.is_empty() {
            return Err(SqlError::invalid_statement(format!(
                "update of '{}' requires at least one field",
                self.table.descriptor().table()
            )));
        }

        let items: Vec<String> = pairs
            .into_iter()
            .map(|(column, value)| format!("{column} = {value}"))
            .collect();
        let set = match items.as_slice() {
            [single] => format!("update {head} set {single}"),
            _ => {
                let list = items
                    .iter()
                    .map(|item| indent(item))
                    .collect::<Vec<_>>()
                    .join(",\n");
                format!("update {head} set\n{list}")
            }
        };

        let mut clauses = Clauses::new();
        clauses.push("update", set);
        match &self.filter {
            Some(filter) => clauses.push("where", format!("where {}", filter.render(ctx)?)),
            None => tracing::warn!(
                table = self.table.descriptor().table(),
                "update without where clause affects every row"
            ),
        }
        ctx.dialect().finish_update(&mut clauses, self)?;
        Ok(clauses)
    }
}
