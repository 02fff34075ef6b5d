//! Table and field descriptors.
//!
//! A [`TableDescriptor`] is the immutable definition of a table: logical name,
//! physical name, ordered columns and optional calculated fields. Queries never
//! use descriptors directly; they work with [`ReferencedTable`] instances, one
//! per occurrence of the table in a statement.
//!
//! # Example
//! ```ignore
//! use sqlforge::{FieldDescriptor, TableDescriptor};
//!
//! let tst = TableDescriptor::builder("tst", "tst")
//!     .column("id", "tst_id")
//!     .field(FieldDescriptor::new("secret", "tst_secret").encrypted())
//!     .column("cc", "tst_cc") // inferred as concurrency counter
//!     .build()?;
//! # Ok::<(), sqlforge::SqlError>(())
//! ```

mod registry;
mod table_ref;

pub use registry::{
    Registry, TableRegistration, declare_table, global_registry, table_by_name,
    table_by_physical_name,
};
pub use table_ref::{FieldRef, ReferencedTable, TableRefId};

use crate::error::{SqlError, SqlResult};
use crate::expr::Expr;
use crate::ident;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Calculation behind a calculated field.
pub type CalcFn = dyn Fn(&ReferencedTable) -> SqlResult<Expr> + Send + Sync;

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Logical name, also the default display alias.
    pub name: String,
    /// Physical column name.
    pub column: String,
    pub encrypted: bool,
    pub hashed: bool,
    pub password_hashed: bool,
    /// Optimistic concurrency counter.
    pub cc: bool,
    pub insert_timestamp: bool,
    pub update_timestamp: bool,
}

impl FieldDescriptor {
    /// Create a field, inferring CC and timestamp flags from the column suffix
    /// (`_cc`, `_created_at`, `_updated_at`).
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: name.into(),
            cc: column.ends_with("_cc"),
            insert_timestamp: column.ends_with("_created_at"),
            update_timestamp: column.ends_with("_updated_at"),
            column,
            encrypted: false,
            hashed: false,
            password_hashed: false,
        }
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn hashed(mut self) -> Self {
        self.hashed = true;
        self
    }

    pub fn password_hashed(mut self) -> Self {
        self.password_hashed = true;
        self
    }

    pub fn concurrency_counter(mut self, on: bool) -> Self {
        self.cc = on;
        self
    }

    pub fn insert_timestamp(mut self, on: bool) -> Self {
        self.insert_timestamp = on;
        self
    }

    pub fn update_timestamp(mut self, on: bool) -> Self {
        self.update_timestamp = on;
        self
    }

    /// Whether INSERT fills this column when the caller leaves it out.
    pub fn defaults_on_insert(&self) -> bool {
        self.cc || self.insert_timestamp || self.update_timestamp
    }

    /// Whether UPDATE fills this column when the caller leaves it out.
    pub fn defaults_on_update(&self) -> bool {
        self.cc || self.update_timestamp
    }
}

/// A field whose value is computed from the row, e.g. a correlated subquery.
#[derive(Clone)]
pub struct CalculatedField {
    pub name: String,
    calc: Arc<CalcFn>,
}

impl CalculatedField {
    pub fn new<F>(name: impl Into<String>, calc: F) -> Self
    where
        F: Fn(&ReferencedTable) -> SqlResult<Expr> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            calc: Arc::new(calc),
        }
    }

    /// Evaluate the calculation for one referenced table.
    pub fn expr(&self, table: &ReferencedTable) -> SqlResult<Expr> {
        (self.calc)(table)
    }
}

impl fmt::Debug for CalculatedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatedField")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable table definition.
#[derive(Debug)]
pub struct TableDescriptor {
    name: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    calculated: Vec<CalculatedField>,
}

impl TableDescriptor {
    /// Start a descriptor with a logical and a physical name.
    pub fn builder(name: impl Into<String>, table: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            calculated: Vec::new(),
        }
    }

    /// Logical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical (database) name.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn calculated(&self) -> &[CalculatedField] {
        &self.calculated
    }

    /// Look up a column by logical name.
    pub fn field(&self, name: &str) -> SqlResult<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| SqlError::unknown_field(&self.name, name))
    }

    /// Look up a column by physical name.
    pub fn field_by_column(&self, column: &str) -> SqlResult<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.column == column)
            .ok_or_else(|| SqlError::unknown_field(&self.name, column))
    }

    pub(crate) fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub(crate) fn calculated_index(&self, name: &str) -> Option<usize> {
        self.calculated.iter().position(|c| c.name == name)
    }
}

/// Builder for [`TableDescriptor`]; validation happens in [`TableBuilder::build`].
#[must_use]
pub struct TableBuilder {
    name: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    calculated: Vec<CalculatedField>,
}

impl TableBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Shorthand for a plain column (suffix inference still applies).
    pub fn column(self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, column))
    }

    pub fn calculated<F>(mut self, name: impl Into<String>, calc: F) -> Self
    where
        F: Fn(&ReferencedTable) -> SqlResult<Expr> + Send + Sync + 'static,
    {
        self.calculated.push(CalculatedField::new(name, calc));
        self
    }

    pub fn build(self) -> SqlResult<Arc<TableDescriptor>> {
        ident::check_table(&self.table)?;

        let mut names = HashSet::new();
        let mut columns = HashSet::new();
        for field in &self.fields {
            ident::check_column(&field.column)?;
            if !names.insert(field.name.as_str()) {
                return Err(self.duplicate(&field.name));
            }
            if !columns.insert(field.column.as_str()) {
                return Err(self.duplicate(&field.column));
            }
        }
        for calc in &self.calculated {
            if !names.insert(calc.name.as_str()) {
                return Err(self.duplicate(&calc.name));
            }
        }

        Ok(Arc::new(TableDescriptor {
            name: self.name,
            table: self.table,
            fields: self.fields,
            calculated: self.calculated,
        }))
    }

    fn duplicate(&self, field: &str) -> SqlError {
        SqlError::DuplicateField {
            table: self.name.clone(),
            field: field.to_string(),
        }
    }
}

/// Implemented by `#[derive(Table)]`.
pub trait TableModel {
    /// Build this type's table descriptor.
    fn table_descriptor() -> SqlResult<Arc<TableDescriptor>>;

    /// A fresh referenced-table instance of this table.
    fn referenced() -> SqlResult<ReferencedTable> {
        Ok(ReferencedTable::new(&Self::table_descriptor()?))
    }
}
