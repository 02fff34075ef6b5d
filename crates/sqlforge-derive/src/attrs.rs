//! `#[table(...)]` and `#[column(...)]` attribute parsing.

use crate::sql_ident::{parse_column, parse_table};
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Ident, LitBool, LitStr, Result, Token};

/// Struct-level `#[table(name = "...", logical = "...")]`.
#[derive(Default)]
pub(crate) struct TableAttr {
    /// Physical name.
    pub name: Option<String>,
    /// Logical name.
    pub logical: Option<String>,
}

impl Parse for TableAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut out = TableAttr::default();
        while !input.is_empty() {
            let key: Ident = input.parse()?;
            let _: Token![=] = input.parse()?;
            let value: LitStr = input.parse()?;
            if key == "name" {
                out.name = Some(parse_table(&value)?);
            } else if key == "logical" {
                out.logical = Some(value.value());
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown table attribute '{key}'"),
                ));
            }
            if input.peek(Token![,]) {
                let _: Token![,] = input.parse()?;
            } else {
                break;
            }
        }
        Ok(out)
    }
}

/// Field-level `#[column(...)]`.
#[derive(Default)]
pub(crate) struct ColumnAttr {
    pub name: Option<String>,
    pub encrypted: bool,
    pub hashed: bool,
    pub password: bool,
    pub cc: Option<bool>,
    pub created_at: Option<bool>,
    pub updated_at: Option<bool>,
    pub skip: bool,
}

impl Parse for ColumnAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut out = ColumnAttr::default();
        while !input.is_empty() {
            let key: Ident = input.parse()?;

            if key == "name" {
                let _: Token![=] = input.parse()?;
                let value: LitStr = input.parse()?;
                out.name = Some(parse_column(&value)?);
            } else {
                // Bare flag, or `flag = true|false`.
                let on = if input.peek(Token![=]) {
                    let _: Token![=] = input.parse()?;
                    input.parse::<LitBool>()?.value
                } else {
                    true
                };
                match key.to_string().as_str() {
                    "encrypted" => out.encrypted = on,
                    "hashed" => out.hashed = on,
                    "password" => out.password = on,
                    "cc" => out.cc = Some(on),
                    "created_at" => out.created_at = Some(on),
                    "updated_at" => out.updated_at = Some(on),
                    "skip" => out.skip = on,
                    other => {
                        return Err(syn::Error::new(
                            key.span(),
                            format!("unknown column attribute '{other}'"),
                        ));
                    }
                }
            }

            if input.peek(Token![,]) {
                let _: Token![,] = input.parse()?;
            } else {
                break;
            }
        }
        Ok(out)
    }
}

/// Parse every `#[<name>(...)]` attribute and merge them, later ones winning.
pub(crate) fn parse_attrs<T, F>(attrs: &[Attribute], name: &str, merge: F) -> Result<T>
where
    T: Parse + Default,
    F: Fn(&mut T, T),
{
    let mut out = T::default();
    for attr in attrs {
        if attr.path().is_ident(name) {
            let parsed: T = attr.parse_args()?;
            merge(&mut out, parsed);
        }
    }
    Ok(out)
}

impl TableAttr {
    pub(crate) fn merge(&mut self, other: TableAttr) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.logical.is_some() {
            self.logical = other.logical;
        }
    }
}

impl ColumnAttr {
    pub(crate) fn merge(&mut self, other: ColumnAttr) {
        if other.name.is_some() {
            self.name = other.name;
        }
        self.encrypted |= other.encrypted;
        self.hashed |= other.hashed;
        self.password |= other.password;
        self.skip |= other.skip;
        if other.cc.is_some() {
            self.cc = other.cc;
        }
        if other.created_at.is_some() {
            self.created_at = other.created_at;
        }
        if other.updated_at.is_some() {
            self.updated_at = other.updated_at;
        }
    }
}
