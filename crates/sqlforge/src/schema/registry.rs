//! Table registry: lookup of descriptors by logical or physical name.
//!
//! A [`Registry`] is an ordinary value; tests and applications can build as
//! many as they like. One process-wide instance is kept for convenience. It
//! starts out holding every table declared with `#[derive(Table)]`.

use super::{ReferencedTable, TableDescriptor};
use crate::error::{SqlError, SqlResult};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock, RwLockReadGuard};

/// Registration emitted by `#[derive(Table)]`.
pub struct TableRegistration {
    pub descriptor_fn: fn() -> SqlResult<Arc<TableDescriptor>>,
}

inventory::collect!(TableRegistration);

/// Descriptors by logical and physical name.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    by_name: HashMap<String, Arc<TableDescriptor>>,
    by_table: HashMap<String, Arc<TableDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every derive-declared table.
    ///
    /// Declarations that fail to build are skipped with a warning.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<TableRegistration> {
            match (registration.descriptor_fn)() {
                Ok(table) => {
                    registry.declare(table);
                }
                Err(err) => tracing::warn!(error = %err, "skipping invalid table declaration"),
            }
        }
        registry
    }

    /// Register a descriptor, replacing any table with the same logical name.
    pub fn declare(&mut self, table: Arc<TableDescriptor>) -> Arc<TableDescriptor> {
        if let Some(previous) = self.by_name.remove(table.name()) {
            tracing::debug!(
                table = table.name(),
                previous = previous.table(),
                "replacing table declaration"
            );
            if self
                .by_table
                .get(previous.table())
                .is_some_and(|owner| Arc::ptr_eq(owner, &previous))
            {
                self.by_table.remove(previous.table());
            }
        }
        self.by_name
            .insert(table.name().to_string(), Arc::clone(&table));
        self.by_table
            .insert(table.table().to_string(), Arc::clone(&table));
        table
    }

    /// Lookup by logical name.
    pub fn table_by_name(&self, name: &str) -> SqlResult<Arc<TableDescriptor>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| SqlError::unknown_table(name))
    }

    /// Lookup by physical name.
    pub fn table_by_physical_name(&self, table: &str) -> SqlResult<Arc<TableDescriptor>> {
        self.by_table
            .get(table)
            .cloned()
            .ok_or_else(|| SqlError::unknown_table(table))
    }

    /// Fresh referenced-table instance of the table with this logical name.
    pub fn referenced(&self, name: &str) -> SqlResult<ReferencedTable> {
        Ok(ReferencedTable::new(&self.table_by_name(name)?))
    }

    /// Descriptors sorted by logical name.
    pub fn tables(&self) -> Vec<Arc<TableDescriptor>> {
        let mut tables: Vec<_> = self.by_name.values().cloned().collect();
        tables.sort_by(|a, b| a.name().cmp(b.name()));
        tables
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

static GLOBAL: LazyLock<RwLock<Registry>> =
    LazyLock::new(|| RwLock::new(Registry::from_inventory()));

/// Read access to the process-wide registry.
pub fn global_registry() -> RwLockReadGuard<'static, Registry> {
    GLOBAL.read().unwrap_or_else(|e| e.into_inner())
}

/// Declare a table in the process-wide registry.
pub fn declare_table(table: Arc<TableDescriptor>) -> Arc<TableDescriptor> {
    GLOBAL
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .declare(table)
}

/// Lookup by logical name in the process-wide registry.
pub fn table_by_name(name: &str) -> SqlResult<Arc<TableDescriptor>> {
    global_registry().table_by_name(name)
}

/// Lookup by physical name in the process-wide registry.
pub fn table_by_physical_name(table: &str) -> SqlResult<Arc<TableDescriptor>> {
    global_registry().table_by_physical_name(table)
}
