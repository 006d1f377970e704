//! ToRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::struct_fields;

pub fn derive_to_row_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = struct_fields(&input)?;
    let columns: Vec<_> = fields.iter().filter(|c| c.is_insert_column()).collect();

    let column_names = columns.iter().map(|c| c.column_name.as_str());
    let count = columns.len();
    let inserts = columns.iter().map(|config| {
        let field_ident = &config.ident;
        let column_name = &config.column_name;
        quote! {
            record.insert(
                ::std::string::String::from(#column_name),
                sqlgate::ToValue::to_value(&self.#field_ident),
            );
        }
    });

    Ok(quote! {
        impl #impl_generics sqlgate::ToRow for #name #ty_generics #where_clause {
            fn insert_column_names() -> &'static [&'static str] {
                &[#(#column_names),*]
            }

            fn to_row(&self) -> sqlgate::Row {
                let mut record = sqlgate::Record::with_capacity(#count);
                #(#inserts)*
                sqlgate::Row::Named(record)
            }
        }
    })
}
