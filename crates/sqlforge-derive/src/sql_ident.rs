use proc_macro2::Span;
use syn::{Error, LitStr, Result};

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Column name from a string literal.
pub(crate) fn parse_column(lit: &LitStr) -> Result<String> {
    check_column(&lit.value(), lit.span())
}

pub(crate) fn check_column(s: &str, span: Span) -> Result<String> {
    let s = s.trim();
    if !is_valid_sql_ident(s) {
        return Err(Error::new(
            span,
            format!("'{s}' is not a valid column name (expected [A-Za-z_][A-Za-z0-9_$]*)"),
        ));
    }
    Ok(s.to_string())
}

/// Table name from a string literal; one schema qualifier is allowed.
pub(crate) fn parse_table(lit: &LitStr) -> Result<String> {
    let raw = lit.value();
    let s = raw.trim();
    let valid = match s.split_once('.') {
        Some((schema, table)) => is_valid_sql_ident(schema) && is_valid_sql_ident(table),
        None => is_valid_sql_ident(s),
    };
    if !valid {
        return Err(Error::new(
            lit.span(),
            format!("'{s}' is not a valid table name (expected [schema.]name)"),
        ));
    }
    Ok(s.to_string())
}
