//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::struct_fields;

pub fn derive_from_row_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = struct_fields(&input)?;

    let field_extractions = fields.iter().map(|config| {
        let field_ident = &config.ident;
        let column_name = &config.column_name;
        let ty = &config.ty;

        if config.skip {
            quote! {
                #field_ident: <#ty as ::std::default::Default>::default()
            }
        } else {
            quote! {
                #field_ident: sqlgate::Row::get::<#ty>(row, #column_name)?
            }
        }
    });

    let column_names = fields
        .iter()
        .filter(|c| !c.skip)
        .map(|c| c.column_name.as_str());

    Ok(quote! {
        impl #impl_generics sqlgate::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &sqlgate::Row) -> sqlgate::Result<Self> {
                Ok(Self {
                    #(#field_extractions),*
                })
            }

            fn column_names() -> &'static [&'static str] {
                &[#(#column_names),*]
            }
        }
    })
}
