//! Referenced tables and field references.

use super::{CalculatedField, FieldDescriptor, TableDescriptor};
use crate::context::RenderContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expr, IntoExpr};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TABLE_REF: AtomicU64 = AtomicU64::new(1);

/// Identity of one [`ReferencedTable`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRefId(u64);

struct Inner {
    id: TableRefId,
    table: Arc<TableDescriptor>,
    alias: Option<String>,
}

/// One occurrence of a table inside a query.
///
/// Clones share identity; two instances built from the same descriptor are
/// distinct tables as far as alias allocation is concerned (self-joins,
/// correlated subqueries).
#[derive(Clone)]
pub struct ReferencedTable {
    inner: Arc<Inner>,
}

impl ReferencedTable {
    pub fn new(table: &Arc<TableDescriptor>) -> Self {
        Self::build(table, None)
    }

    /// Reference with an explicit alias, used verbatim.
    pub fn with_alias(table: &Arc<TableDescriptor>, alias: impl Into<String>) -> Self {
        Self::build(table, Some(alias.into()))
    }

    fn build(table: &Arc<TableDescriptor>, alias: Option<String>) -> Self {
        let id = TableRefId(NEXT_TABLE_REF.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Arc::new(Inner {
                id,
                table: Arc::clone(table),
                alias,
            }),
        }
    }

    pub fn id(&self) -> TableRefId {
        self.inner.id
    }

    pub fn descriptor(&self) -> &Arc<TableDescriptor> {
        &self.inner.table
    }

    pub fn explicit_alias(&self) -> Option<&str> {
        self.inner.alias.as_deref()
    }

    /// True when both handles point at the same instance.
    pub fn same_instance(&self, other: &ReferencedTable) -> bool {
        self.inner.id == other.inner.id
    }

    /// Field reference by logical name (column or calculated field).
    pub fn field(&self, name: &str) -> SqlResult<FieldRef> {
        let table = &self.inner.table;
        let kind = match table.field_index(name) {
            Some(idx) => FieldKind::Column(idx),
            None => match table.calculated_index(name) {
                Some(idx) => FieldKind::Calculated(idx),
                None => return Err(SqlError::unknown_field(table.name(), name)),
            },
        };
        Ok(FieldRef {
            table: self.clone(),
            kind,
            alias: name.to_string(),
        })
    }

    /// All columns followed by all calculated fields, in declaration order.
    pub fn fields(&self) -> Vec<FieldRef> {
        let table = &self.inner.table;
        let columns = table.fields().iter().enumerate().map(|(i, f)| FieldRef {
            table: self.clone(),
            kind: FieldKind::Column(i),
            alias: f.name.clone(),
        });
        let calculated = table.calculated().iter().enumerate().map(|(i, c)| FieldRef {
            table: self.clone(),
            kind: FieldKind::Calculated(i),
            alias: c.name.clone(),
        });
        columns.chain(calculated).collect()
    }

    /// `name` or `name as alias`, registering the table with the context.
    pub fn to_table_sql(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        let alias = ctx.table_alias(self)?;
        let table = self.inner.table.table();
        if alias == table {
            Ok(table.to_string())
        } else {
            Ok(format!("{table} as {alias}"))
        }
    }
}

impl fmt::Debug for ReferencedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferencedTable")
            .field("id", &self.inner.id)
            .field("table", &self.inner.table.table())
            .field("alias", &self.inner.alias)
            .finish()
    }
}

impl From<&Arc<TableDescriptor>> for ReferencedTable {
    fn from(table: &Arc<TableDescriptor>) -> Self {
        ReferencedTable::new(table)
    }
}

impl From<&ReferencedTable> for ReferencedTable {
    fn from(table: &ReferencedTable) -> Self {
        table.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Column(usize),
    Calculated(usize),
}

/// A column (or calculated field) of a specific referenced table.
#[derive(Clone)]
pub struct FieldRef {
    table: ReferencedTable,
    kind: FieldKind,
    alias: String,
}

impl FieldRef {
    pub fn table(&self) -> &ReferencedTable {
        &self.table
    }

    /// Logical field name.
    pub fn name(&self) -> &str {
        match self.kind {
            FieldKind::Column(_) => self.descriptor().map_or("", |f| f.name.as_str()),
            FieldKind::Calculated(_) => self.calculated().map_or("", |c| c.name.as_str()),
        }
    }

    /// Alias used in SELECT lists; defaults to the logical name.
    pub fn display_alias(&self) -> &str {
        &self.alias
    }

    /// Rename the display alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Column descriptor, `None` for calculated fields.
    pub fn descriptor(&self) -> Option<&FieldDescriptor> {
        match self.kind {
            FieldKind::Column(idx) => self.table.descriptor().fields().get(idx),
            FieldKind::Calculated(_) => None,
        }
    }

    fn calculated(&self) -> Option<&CalculatedField> {
        match self.kind {
            FieldKind::Calculated(idx) => self.table.descriptor().calculated().get(idx),
            FieldKind::Column(_) => None,
        }
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self.kind, FieldKind::Calculated(_))
    }

    /// Physical column name, `None` for calculated fields.
    pub fn column(&self) -> Option<&str> {
        self.descriptor().map(|f| f.column.as_str())
    }

    /// A plain column reference is a single token.
    pub fn is_simple(&self) -> bool {
        !self.is_calculated()
    }

    /// Whether reading this field wraps it in a dialect transform.
    pub(crate) fn read_is_transformed(&self) -> bool {
        match self.descriptor() {
            Some(f) => f.encrypted || f.hashed || f.password_hashed,
            None => true,
        }
    }

    /// Read form of this field as an expression.
    pub fn read(&self) -> Expr {
        Expr::FieldValue {
            field: self.clone(),
            value: None,
        }
    }

    /// Read form applied to a candidate value (e.g. hash a parameter to
    /// compare against a hashed column).
    pub fn read_with(&self, value: impl IntoExpr) -> Expr {
        Expr::FieldValue {
            field: self.clone(),
            value: Some(Box::new(value.into_expr())),
        }
    }

    /// `<alias>.<column>`, or the parenthesized calculation for calculated fields.
    pub fn to_reference_sql(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        if let Some(calc) = self.calculated() {
            return calc.expr(&self.table)?.to_paren_sql(ctx);
        }
        let column = self.column().unwrap_or_default();
        let alias = ctx.table_alias(&self.table)?;
        Ok(format!("{alias}.{column}"))
    }

    /// Read form aliased with the display alias, for SELECT lists.
    pub fn to_select_sql(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        self.to_select_sql_as(&self.alias, ctx)
    }

    pub(crate) fn to_select_sql_as(
        &self,
        alias: &str,
        ctx: &mut RenderContext<'_>,
    ) -> SqlResult<String> {
        let read = self.read_value_sql(None, ctx)?;
        Ok(format!("{read} as \"{alias}\""))
    }

    /// Read transform applied to the column, or to `value` when given:
    /// decrypt encrypted columns, hash hashed columns, and compare against
    /// the stored hash for password-hashed columns.
    ///
    /// Precedence is encrypted, hashed, password-hashed, plain.
    pub fn read_value_sql(
        &self,
        value: Option<&Expr>,
        ctx: &mut RenderContext<'_>,
    ) -> SqlResult<String> {
        let Some(field) = self.descriptor() else {
            return self.to_reference_sql(ctx);
        };
        let dialect = ctx.dialect();

        if !(field.encrypted || field.hashed || field.password_hashed) {
            return match value {
                Some(v) => v.render(ctx),
                None => self.to_reference_sql(ctx),
            };
        }

        let source = match value {
            Some(v) => v.to_operand_sql(ctx)?,
            None => self.to_reference_sql(ctx)?,
        };
        if field.encrypted {
            Ok(dialect.decrypt_field(&source))
        } else if field.hashed {
            Ok(dialect.hash_field(&source))
        } else {
            let stored = self.to_reference_sql(ctx)?;
            Ok(dialect.hash_pw_field_val(&source, &stored))
        }
    }

    /// Value written for this field by INSERT (`is_insert`) or UPDATE.
    ///
    /// Rules are tried in order and the first match wins: encrypted, hashed,
    /// password-hashed, CC default, insert-timestamp default,
    /// update-timestamp default, the given value.
    pub fn write_value_sql(
        &self,
        value: Option<&Expr>,
        is_insert: bool,
        ctx: &mut RenderContext<'_>,
    ) -> SqlResult<String> {
        let Some(field) = self.descriptor() else {
            return Err(SqlError::invalid_statement(format!(
                "calculated field '{}' cannot be written",
                self.name()
            )));
        };
        let dialect = ctx.dialect();

        if field.encrypted {
            return match value {
                Some(v) => Ok(dialect.encrypt_field(&v.to_operand_sql(ctx)?)),
                None => Ok("NULL".to_string()),
            };
        }
        if field.hashed {
            return match value {
                Some(v) => Ok(dialect.hash_field(&v.to_operand_sql(ctx)?)),
                None => Ok("NULL".to_string()),
            };
        }
        if field.password_hashed {
            return match value {
                Some(v) => Ok(dialect.hash_pw_field(&v.to_operand_sql(ctx)?)),
                None => Ok("NULL".to_string()),
            };
        }
        match value {
            None if field.cc => {
                if is_insert {
                    Ok("0".to_string())
                } else {
                    Ok(format!("{} + 1", field.column))
                }
            }
            None if field.insert_timestamp && is_insert => Ok(dialect.now()),
            None if field.update_timestamp => Ok(dialect.now()),
            None => Ok(String::new()),
            Some(v) => v.render(ctx),
        }
    }

    /// `<column> = <write value>` for UPDATE ... SET.
    pub fn to_update_field_sql(
        &self,
        value: Option<&Expr>,
        ctx: &mut RenderContext<'_>,
    ) -> SqlResult<String> {
        let written = self.write_value_sql(value, false, ctx)?;
        let column = self.column().unwrap_or_default();
        Ok(format!("{column} = {written}"))
    }
}

impl fmt::Debug for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRef")
            .field("table", &self.table)
            .field("field", &self.name())
            .field("alias", &self.alias)
            .finish()
    }
}
