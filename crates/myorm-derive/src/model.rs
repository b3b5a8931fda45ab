//! Model derive macro implementation

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

/// Parsed `#[orm(...)]` field attributes.
#[derive(Default)]
struct FieldAttr {
    column: Option<String>,
    sql_type: Option<String>,
    size: Option<String>,
    default: Option<String>,
    primary_key: bool,
    auto_increment: bool,
    unique: bool,
    not_null: bool,
    skip: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut out = FieldAttr::default();

        // Comma-separated flags and key = "value" pairs
        loop {
            if input.is_empty() {
                break;
            }
            let key = syn::Ident::parse_any(input)?;
            if input.peek(syn::Token![=]) {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                match key.to_string().as_str() {
                    "column" => out.column = Some(value.value()),
                    "sql_type" => out.sql_type = Some(value.value()),
                    "size" => out.size = Some(value.value()),
                    "default" => out.default = Some(value.value()),
                    other => {
                        return Err(syn::Error::new(
                            key.span(),
                            format!("unknown orm attribute key: {other}"),
                        ));
                    }
                }
            } else {
                match key.to_string().as_str() {
                    "primary_key" => out.primary_key = true,
                    "auto_increment" => out.auto_increment = true,
                    "unique" => out.unique = true,
                    "not_null" => out.not_null = true,
                    "skip" => out.skip = true,
                    other => {
                        return Err(syn::Error::new(
                            key.span(),
                            format!("unknown orm attribute flag: {other}"),
                        ));
                    }
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(out)
    }
}

fn get_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            if let syn::Meta::List(meta_list) = &attr.meta {
                return syn::parse2::<FieldAttr>(meta_list.tokens.clone());
            }
        }
    }
    Ok(FieldAttr::default())
}

fn get_table_name(input: &DeriveInput) -> Result<String> {
    for attr in &input.attrs {
        if attr.path().is_ident("orm") {
            if let Ok(nested) = attr.parse_args::<syn::MetaNameValue>() {
                if nested.path.is_ident("table") {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) = &nested.value
                    {
                        return Ok(lit.value());
                    }
                }
            }
        }
    }
    Ok(input.ident.to_string().to_snake_case())
}

/// Strip one level of `Option<...>`, returning the inner type if present.
fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    if let syn::Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident != "Option" {
            return None;
        }
        if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
            if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                return Some(inner);
            }
        }
    }
    None
}

fn is_vec_u8(ty: &syn::Type) -> bool {
    if let syn::Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Vec" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(syn::Type::Path(inner))) =
                        args.args.first()
                    {
                        return inner.path.is_ident("u8");
                    }
                }
            }
        }
    }
    false
}

/// Infer the MySQL type token (and size argument) for a Rust field type.
fn infer_sql_type(ty: &syn::Type) -> Option<(&'static str, Option<&'static str>)> {
    if is_vec_u8(ty) {
        return Some(("BLOB", None));
    }
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let ident = &type_path.path.segments.last()?.ident;
    let mapped = match ident.to_string().as_str() {
        "i8" => ("TINYINT", None),
        "i16" | "u8" => ("SMALLINT", None),
        "i32" | "u16" | "u32" => ("INT", None),
        "i64" | "u64" | "isize" | "usize" => ("BIGINT", None),
        "f32" => ("FLOAT", None),
        "f64" => ("DOUBLE", None),
        "bool" => ("TINYINT", Some("1")),
        "String" => ("VARCHAR", Some("255")),
        "NaiveDateTime" => ("DATETIME", None),
        "NaiveDate" => ("DATE", None),
        "NaiveTime" => ("TIME", None),
        _ => return None,
    };
    Some(mapped)
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let table_name = get_table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut column_defs = Vec::new();
    let mut row_entries = Vec::new();
    let mut pk_column: Option<String> = None;
    let mut pk_field: Option<syn::Ident> = None;

    for field in fields.iter() {
        let field_ident = field.ident.clone().unwrap();
        let attr = get_field_attr(field)?;
        if attr.skip {
            continue;
        }

        let column = attr.column.unwrap_or_else(|| field_ident.to_string());
        let (inner_ty, nullable) = match option_inner(&field.ty) {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };

        let (sql_type, inferred_size) = match attr.sql_type {
            Some(explicit) => (explicit, None),
            None => {
                let (token, size) = infer_sql_type(inner_ty).ok_or_else(|| {
                    syn::Error::new_spanned(
                        &field.ty,
                        "no SQL type mapping for this field type; add #[orm(sql_type = \"...\")]",
                    )
                })?;
                (token.to_string(), size)
            }
        };
        let size = attr.size.or_else(|| inferred_size.map(str::to_string));

        // Non-Option fields are NOT NULL
        let not_null = attr.not_null || !nullable;

        let mut def = quote! { myorm::ColumnDef::new(#column, #sql_type) };
        if let Some(size) = &size {
            def = quote! { #def.size(#size) };
        }
        if not_null {
            def = quote! { #def.not_null() };
        }
        if let Some(default) = &attr.default {
            def = quote! { #def.default_literal(#default) };
        }
        if attr.auto_increment {
            def = quote! { #def.auto_increment() };
        }
        if attr.unique {
            def = quote! { #def.unique() };
        }
        if attr.primary_key {
            def = quote! { #def.primary_key() };
            if pk_column.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "Model supports at most one #[orm(primary_key)] field",
                ));
            }
            pk_column = Some(column.clone());
            pk_field = Some(field_ident.clone());
        }
        column_defs.push(def);

        row_entries.push(quote! {
            (
                ::std::string::String::from(#column),
                myorm::IntoValue::into_value(self.#field_ident.clone()),
            )
        });
    }

    let pk_methods = if let (Some(pk_column), Some(pk_field)) = (&pk_column, &pk_field) {
        quote! {
            fn primary_key_column() -> ::std::option::Option<&'static str> {
                ::std::option::Option::Some(#pk_column)
            }

            fn primary_key_value(&self) -> ::std::option::Option<myorm::Value> {
                ::std::option::Option::Some(myorm::IntoValue::into_value(self.#pk_field.clone()))
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl myorm::Model for #name {
            const TABLE: &'static str = #table_name;

            fn columns() -> ::std::vec::Vec<myorm::ColumnDef> {
                ::std::vec![
                    #(#column_defs),*
                ]
            }

            fn to_row(&self) -> ::std::vec::Vec<(::std::string::String, myorm::Value)> {
                ::std::vec![
                    #(#row_entries),*
                ]
            }

            #pk_methods
        }
    })
}
