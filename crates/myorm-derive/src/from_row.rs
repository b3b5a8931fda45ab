//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "FromRow can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRow can only be derived for structs",
            ));
        }
    };

    let field_extracts: Vec<_> = fields
        .iter()
        .map(|field| {
            let field_name = field.ident.as_ref().unwrap();
            let column_name = get_column_name(field);

            quote! {
                #field_name: row.try_get_column(#column_name)?
            }
        })
        .collect();

    Ok(quote! {
        impl #impl_generics myorm::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &myorm::Row) -> myorm::OrmResult<Self> {
                use myorm::RowExt;
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}

/// Pull `column = "..."` out of `#[orm(...)]`, tolerating the other keys and
/// flags the Model derive understands on the same attribute.
fn get_column_name(field: &syn::Field) -> String {
    let mut column = None;
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    column = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                } else if meta.input.peek(syn::Token![=]) {
                    meta.value()?.parse::<syn::LitStr>()?;
                }
                Ok(())
            });
        }
    }
    column.unwrap_or_else(|| field.ident.as_ref().unwrap().to_string())
}
