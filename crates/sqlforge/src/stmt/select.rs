//! SELECT statement builder.

use super::clauses::Clauses;
use super::join::Join;
use super::log_rendered;
use crate::context::RenderContext;
use crate::dialect::{Dialect, default_dialect};
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, ExprExt, IntoExpr, OrderBy};
use crate::format::{MAX_LINE_WIDTH, indent, indent_tail};
use crate::schema::{FieldRef, ReferencedTable};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A FROM source.
#[derive(Debug, Clone)]
pub enum Source {
    Table(ReferencedTable),
    /// Derived table: a nested SELECT rendered `(...) as "SQ"`.
    Derived(Box<Select>),
}

impl From<ReferencedTable> for Source {
    fn from(table: ReferencedTable) -> Self {
        Source::Table(table)
    }
}

impl From<&ReferencedTable> for Source {
    fn from(table: &ReferencedTable) -> Self {
        Source::Table(table.clone())
    }
}

impl From<Select> for Source {
    fn from(select: Select) -> Self {
        Source::Derived(Box::new(select))
    }
}

/// One entry of the select list.
#[derive(Debug, Clone)]
pub enum SelectField {
    /// Field reference, aliased with its display alias.
    Field(FieldRef),
    /// Arbitrary expression, optionally aliased.
    Expr { expr: Expr, alias: Option<String> },
}

impl SelectField {
    /// Alias the entry will be rendered with, before duplicate suffixing.
    pub fn display_alias(&self) -> Option<&str> {
        match self {
            SelectField::Field(field) => Some(field.display_alias()),
            SelectField::Expr { alias, .. } => alias.as_deref(),
        }
    }
}

impl From<FieldRef> for SelectField {
    fn from(field: FieldRef) -> Self {
        SelectField::Field(field)
    }
}

impl From<&FieldRef> for SelectField {
    fn from(field: &FieldRef) -> Self {
        SelectField::Field(field.clone())
    }
}

impl From<Expr> for SelectField {
    fn from(expr: Expr) -> Self {
        match expr {
            Expr::Alias { expr, alias } => SelectField::Expr {
                expr: *expr,
                alias: Some(alias),
            },
            Expr::Field(field) => SelectField::Field(field),
            expr => SelectField::Expr { expr, alias: None },
        }
    }
}

impl From<Select> for SelectField {
    fn from(select: Select) -> Self {
        SelectField::Expr {
            expr: select.into_expr(),
            alias: None,
        }
    }
}

/// SELECT builder.
///
/// Rendering order is fixed: `select [distinct] <fields>`, `from`, `where`,
/// `order by`, then whatever the dialect appends (row limit).
#[derive(Debug, Clone, Default)]
pub struct Select {
    sources: Vec<Source>,
    fields: Vec<SelectField>,
    join: Option<Join>,
    filter: Option<Expr>,
    order_by: Vec<OrderBy>,
    distinct: bool,
    limit: Option<u64>,
    alias: Option<String>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select from one table.
    pub fn from_table(table: impl Into<ReferencedTable>) -> Self {
        Self::new().table(table)
    }

    /// Select from several tables.
    pub fn from_tables<I, T>(tables: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ReferencedTable>,
    {
        tables.into_iter().fold(Self::new(), Self::table)
    }

    /// Select from a derived table.
    pub fn from_select(select: Select) -> Self {
        Self::new().source(select)
    }

    // ==================== Sources ====================

    /// Add a table source.
    pub fn table(self, table: impl Into<ReferencedTable>) -> Self {
        self.source(Source::Table(table.into()))
    }

    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Set the join tree. Join participants need not be added as sources.
    pub fn join(mut self, join: Join) -> Self {
        self.join = Some(join);
        self
    }

    // ==================== Fields ====================

    /// Add one field or expression. Without any, every field of every table
    /// source is selected.
    pub fn field(mut self, field: impl Into<SelectField>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields<I, F>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<SelectField>,
    {
        fields.into_iter().fold(self, Self::field)
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== Filtering & ordering ====================

    /// Add a WHERE condition; successive calls are ANDed.
    pub fn filter(mut self, condition: impl IntoExpr) -> Self {
        let condition = condition.into_expr();
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(mut self, item: impl Into<OrderBy>) -> Self {
        self.order_by.push(item.into());
        self
    }

    /// Row limit, rendered by the dialect.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Alias used when this select is a derived table.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn selected_fields(&self) -> &[SelectField] {
        &self.fields
    }

    // ==================== Rendering ====================

    /// Render with a fresh context.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> SqlResult<String> {
        let mut ctx = RenderContext::new(dialect);
        let sql = self.render(&mut ctx)?;
        log_rendered("select", dialect, &sql);
        Ok(sql)
    }

    /// Render with the process-wide default dialect.
    pub fn to_sql_default(&self) -> SqlResult<String> {
        let dialect = default_dialect();
        self.to_sql(dialect.as_ref())
    }

    /// Render against a shared context.
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        Ok(self.render_clauses(ctx)?.to_sql())
    }

    /// Render into clauses, after the dialect hook ran.
    pub fn render_clauses(&self, ctx: &mut RenderContext<'_>) -> SqlResult<Clauses> {
        self.build_clauses(ctx, None)
    }

    /// Render as a scalar value: `(select ...)` with exactly one field.
    ///
    /// An unaliased expression is aliased `"SQC<depth>"`.
    pub fn render_scalar(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        if self.fields.len() != 1 {
            return Err(SqlError::invalid_statement(format!(
                "scalar subquery must select exactly one field, found {}",
                self.fields.len()
            )));
        }
        let alias = ctx.enter_scalar();
        let body = self.build_clauses(ctx, Some(&alias));
        ctx.leave_scalar();
        Ok(format!("({})", indent_tail(&body?.to_sql())))
    }

    /// Render as a derived table: `(\n  select ...\n) as "alias"`.
    pub fn render_derived(&self, alias: &str, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        let body = self.render(ctx)?;
        Ok(format!("(\n{}\n) as \"{alias}\"", indent(&body)))
    }

    fn build_clauses(
        &self,
        ctx: &mut RenderContext<'_>,
        scalar_alias: Option<&str>,
    ) -> SqlResult<Clauses> {
        if self.sources.is_empty() && self.join.is_none() {
            return Err(SqlError::invalid_statement(
                "select requires at least one source table",
            ));
        }

        // Aliases are allocated join participants first, then the remaining
        // table sources, each in order.
        let participants = self
            .join
            .as_ref()
            .map(Join::participants)
            .unwrap_or_default();
        for table in &participants {
            ctx.table_alias(table)?;
        }
        let uncovered: Vec<&ReferencedTable> = self
            .sources
            .iter()
            .filter_map(|s| match s {
                Source::Table(t) if !participants.iter().any(|p| p.same_instance(t)) => Some(t),
                _ => None,
            })
            .collect();
        for table in &uncovered {
            ctx.table_alias(table)?;
        }
        // Explicit derived aliases are claimed before any is synthesized.
        let derived_selects: Vec<&Select> = self
            .sources
            .iter()
            .filter_map(|s| match s {
                Source::Derived(select) => Some(select.as_ref()),
                Source::Table(_) => None,
            })
            .collect();
        for alias in derived_selects.iter().filter_map(|s| s.alias.as_deref()) {
            ctx.claim_derived_alias(alias)?;
        }
        let derived: Vec<(&Select, String)> = derived_selects
            .into_iter()
            .map(|select| {
                let alias = match &select.alias {
                    Some(alias) => alias.clone(),
                    None => ctx.next_derived_alias(),
                };
                (select, alias)
            })
            .collect();

        let mut from = Vec::new();
        if let Some(join) = &self.join {
            from.push(join.render(ctx)?);
        }
        for table in &uncovered {
            from.push(table.to_table_sql(ctx)?);
        }
        for (select, alias) in &derived {
            from.push(select.render_derived(alias, ctx)?);
        }

        let fields = if self.fields.is_empty() {
            participants
                .iter()
                .chain(uncovered.iter().copied())
                .flat_map(ReferencedTable::fields)
                .map(SelectField::Field)
                .chain(derived.iter().map(|(_, alias)| SelectField::Expr {
                    expr: Expr::Raw(format!("\"{alias}\".*")),
                    alias: None,
                }))
                .collect()
        } else {
            self.fields.clone()
        };
        let field_sql = render_fields(&fields, scalar_alias, ctx)?;

        let keyword = if self.distinct {
            "select distinct"
        } else {
            "select"
        };
        let mut clauses = Clauses::new();
        match field_sql.as_slice() {
            [single] if !single.contains('\n') && keyword.len() + 1 + single.len() < MAX_LINE_WIDTH => {
                clauses.push("select", format!("{keyword} {single}"));
            }
            _ => {
                let list = field_sql
                    .iter()
                    .map(|f| indent(f))
                    .collect::<Vec<_>>()
                    .join(",\n");
                clauses.push("select", format!("{keyword}\n{list}"));
            }
        }
        clauses.push("from", format!("from {}", from.join(", ")));

        if let Some(filter) = &self.filter {
            clauses.push("where", format!("where {}", filter.render(ctx)?));
        }
        if !self.order_by.is_empty() {
            let items = self
                .order_by
                .iter()
                .map(|o| o.render(ctx))
                .collect::<SqlResult<Vec<_>>>()?;
            clauses.push("order by", format!("order by {}", items.join(", ")));
        }

        ctx.dialect().finish_select(&mut clauses, self)?;
        Ok(clauses)
    }
}

/// Suffix duplicate aliases, sort by alias (unaliased last) and render.
fn render_fields(
    fields: &[SelectField],
    scalar_alias: Option<&str>,
    ctx: &mut RenderContext<'_>,
) -> SqlResult<Vec<String>> {
    let mut used = HashSet::new();
    let mut entries: Vec<(Option<String>, &SelectField)> = Vec::with_capacity(fields.len());
    for field in fields {
        let alias = match (field, field.display_alias()) {
            (_, Some(alias)) => Some(unique_alias(alias, &mut used)),
            (SelectField::Expr { .. }, None) => scalar_alias.map(str::to_string),
            (SelectField::Field(_), None) => None,
        };
        entries.push((alias, field));
    }

    entries.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    entries
        .into_iter()
        .map(|(alias, field)| match (field, alias) {
            (SelectField::Field(f), Some(alias)) => f.to_select_sql_as(&alias, ctx),
            (SelectField::Field(f), None) => f.to_select_sql(ctx),
            (SelectField::Expr { expr, .. }, Some(alias)) => {
                Ok(format!("{} as \"{alias}\"", expr.render(ctx)?))
            }
            (SelectField::Expr { expr, .. }, None) => expr.render(ctx),
        })
        .collect()
}

fn unique_alias(alias: &str, used: &mut HashSet<String>) -> String {
    if used.insert(alias.to_string()) {
        return alias.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{alias}{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
