//! Derive macros for sqlforge
//!
//! Provides `#[derive(Table)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod sql_ident;
mod table;

/// Derive a table descriptor for a struct and declare it in the process-wide
/// registry.
///
/// # Example
///
/// ```ignore
/// use sqlforge::Table;
///
/// #[derive(Table)]
/// #[table(name = "app_user")]
/// struct User {
///     #[column(name = "user_id")]
///     id: i64,
///     #[column(name = "user_email", encrypted)]
///     email: String,
///     #[column(name = "user_pw", password)]
///     password: String,
///     #[column(name = "user_cc")]
///     cc: i32,
///     #[column(skip)]
///     cached: Option<String>,
/// }
/// ```
///
/// # Generated
///
/// - `impl sqlforge::TableModel` returning one shared descriptor
/// - an `inventory` registration picked up by `sqlforge::global_registry()`
///
/// # Attributes
///
/// - `#[table(name = "...")]` - Physical table name (default: the logical name)
/// - `#[table(logical = "...")]` - Logical name (default: snake_case struct name)
/// - `#[column(name = "...")]` - Physical column name (default: the field name)
/// - `#[column(encrypted)]`, `#[column(hashed)]`, `#[column(password)]` - Value transforms
/// - `#[column(cc)]`, `#[column(created_at)]`, `#[column(updated_at)]` - Defaults on write;
///   `= false` turns off suffix inference
/// - `#[column(skip)]` - Not a column
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    table::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
