//! Per-render state: table alias allocation and subquery numbering.
//!
//! A [`QueryContext`] assigns every [`ReferencedTable`] instance used by one
//! statement a unique alias. The first instance of a physical table gets the
//! bare table name, further instances get `name2`, `name3`, ... in the order
//! they are registered. Explicit aliases are honored verbatim.
//!
//! Correlated subqueries render with the enclosing statement's context, so an
//! inner reference to the same table never collides with the outer one.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::ident::alias_base;
use crate::schema::{ReferencedTable, TableRefId};
use std::collections::{HashMap, HashSet};

/// Alias allocator for one statement render.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    aliases: HashMap<TableRefId, String>,
    occurrences: HashMap<String, usize>,
    used: HashSet<String>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table instance and return its alias.
    ///
    /// Registering the same instance again returns the alias it already has.
    /// An explicit alias held by another instance is a `DuplicateAlias` error.
    pub fn add_table(&mut self, table: &ReferencedTable) -> SqlResult<String> {
        if let Some(alias) = self.aliases.get(&table.id()) {
            return Ok(alias.clone());
        }

        let alias = match table.explicit_alias() {
            Some(explicit) => {
                if self.used.contains(explicit) {
                    return Err(SqlError::DuplicateAlias(explicit.to_string()));
                }
                explicit.to_string()
            }
            None => {
                let physical = table.descriptor().table();
                let base = alias_base(physical);
                let seen = self.occurrences.entry(physical.to_string()).or_insert(0);
                loop {
                    *seen += 1;
                    let candidate = if *seen == 1 {
                        base.to_string()
                    } else {
                        format!("{base}{seen}")
                    };
                    if !self.used.contains(&candidate) {
                        break candidate;
                    }
                }
            }
        };

        tracing::trace!(
            target: "sqlforge.alias",
            table = table.descriptor().table(),
            alias = %alias,
            "allocated table alias"
        );
        self.used.insert(alias.clone());
        self.aliases.insert(table.id(), alias.clone());
        Ok(alias)
    }

    /// Alias previously assigned to this exact instance.
    pub fn table_alias(&self, table: &ReferencedTable) -> Option<&str> {
        self.aliases.get(&table.id()).map(String::as_str)
    }

    /// Number of registered table instances.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Everything a node needs to render: the alias allocator, the dialect and
/// subquery numbering.
#[derive(Debug)]
pub struct RenderContext<'d> {
    query: QueryContext,
    dialect: &'d dyn Dialect,
    scalar_depth: usize,
    derived_tables: usize,
    derived_aliases: HashSet<String>,
}

impl<'d> RenderContext<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self::with_query(dialect, QueryContext::new())
    }

    /// Render against an existing alias allocator.
    pub fn with_query(dialect: &'d dyn Dialect, query: QueryContext) -> Self {
        Self {
            query,
            dialect,
            scalar_depth: 0,
            derived_tables: 0,
            derived_aliases: HashSet::new(),
        }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    pub fn query(&self) -> &QueryContext {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryContext {
        &mut self.query
    }

    pub fn into_query(self) -> QueryContext {
        self.query
    }

    /// Alias of `table`, registering it on first use.
    pub fn table_alias(&mut self, table: &ReferencedTable) -> SqlResult<String> {
        match self.query.table_alias(table) {
            Some(alias) => Ok(alias.to_string()),
            None => self.query.add_table(table),
        }
    }

    /// Enter a scalar subquery; returns the synthetic column alias for it.
    pub(crate) fn enter_scalar(&mut self) -> String {
        self.scalar_depth += 1;
        format!("SQC{}", self.scalar_depth)
    }

    pub(crate) fn leave_scalar(&mut self) {
        self.scalar_depth = self.scalar_depth.saturating_sub(1);
    }

    /// Next default alias for a derived table: `SQ`, `SQ1`, `SQ2`, ...,
    /// skipping names already claimed.
    pub(crate) fn next_derived_alias(&mut self) -> String {
        loop {
            let n = self.derived_tables;
            self.derived_tables += 1;
            let candidate = if n == 0 {
                "SQ".to_string()
            } else {
                format!("SQ{n}")
            };
            if self.derived_aliases.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Claim an explicit derived-table alias.
    pub(crate) fn claim_derived_alias(&mut self, alias: &str) -> SqlResult<()> {
        if !self.derived_aliases.insert(alias.to_string()) {
            return Err(SqlError::DuplicateAlias(alias.to_string()));
        }
        Ok(())
    }
}
