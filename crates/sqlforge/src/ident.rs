//! SQL identifier checks for table and column names.
//!
//! Physical names are spliced into rendered SQL without quoting, so they are
//! restricted to plain identifiers: `[A-Za-z_][A-Za-z0-9_$]*`, optionally
//! schema-qualified with a single dot (`schema.table`).

use crate::error::{SqlError, SqlResult};

/// Returns true when `s` is a plain, unquoted SQL identifier.
pub fn is_plain_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || first.is_ascii_alphabetic()) {
        return false;
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

/// Validate a column name.
pub fn check_column(name: &str) -> SqlResult<()> {
    if is_plain_ident(name) {
        Ok(())
    } else {
        Err(SqlError::InvalidIdentifier(format!(
            "'{name}' is not a valid column name"
        )))
    }
}

/// Validate a table name, allowing one schema qualifier.
pub fn check_table(name: &str) -> SqlResult<()> {
    let mut parts = name.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(table), None, _) => is_plain_ident(table),
        (Some(schema), Some(table), None) => is_plain_ident(schema) && is_plain_ident(table),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SqlError::InvalidIdentifier(format!(
            "'{name}' is not a valid table name"
        )))
    }
}

/// Base used when synthesizing an alias for a table: the unqualified name.
pub(crate) fn alias_base(table: &str) -> &str {
    table.rsplit('.').next().unwrap_or(table)
}
