//! `#[derive(Table)]` expansion.

use crate::attrs::{ColumnAttr, TableAttr, parse_attrs};
use crate::sql_ident::check_column;
use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Table cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Table can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Table can only be derived for structs",
            ));
        }
    };

    let table_attr: TableAttr = parse_attrs(&input.attrs, "table", TableAttr::merge)?;
    let logical = table_attr
        .logical
        .unwrap_or_else(|| name.to_string().to_snake_case());
    let physical = match table_attr.name {
        Some(physical) => physical,
        None => check_column(&logical, name.span())?,
    };

    let mut seen = HashSet::new();
    let mut field_exprs = Vec::new();
    for field in fields {
        let attr: ColumnAttr = parse_attrs(&field.attrs, "column", ColumnAttr::merge)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_name = ident.unraw().to_string();
        let column = match attr.name {
            Some(column) => column,
            None => check_column(&field_name, ident.span())?,
        };
        if !seen.insert(column.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate column '{column}'"),
            ));
        }

        let encrypted = attr.encrypted.then(|| quote!(.encrypted()));
        let hashed = attr.hashed.then(|| quote!(.hashed()));
        let password = attr.password.then(|| quote!(.password_hashed()));
        let cc = attr.cc.map(|on| quote!(.concurrency_counter(#on)));
        let created_at = attr.created_at.map(|on| quote!(.insert_timestamp(#on)));
        let updated_at = attr.updated_at.map(|on| quote!(.update_timestamp(#on)));

        field_exprs.push(quote! {
            sqlforge::FieldDescriptor::new(#field_name, #column)
                #encrypted #hashed #password #cc #created_at #updated_at
        });
    }

    Ok(quote! {
        impl sqlforge::TableModel for #name {
            fn table_descriptor()
                -> sqlforge::SqlResult<::std::sync::Arc<sqlforge::TableDescriptor>>
            {
                static DESCRIPTOR: ::std::sync::OnceLock<
                    sqlforge::SqlResult<::std::sync::Arc<sqlforge::TableDescriptor>>,
                > = ::std::sync::OnceLock::new();
                DESCRIPTOR
                    .get_or_init(|| {
                        sqlforge::TableDescriptor::builder(#logical, #physical)
                            #(.field(#field_exprs))*
                            .build()
                    })
                    .clone()
            }
        }

        sqlforge::inventory::submit! {
            sqlforge::TableRegistration {
                descriptor_fn: <#name as sqlforge::TableModel>::table_descriptor,
            }
        }
    })
}
