//! `#[sqlgate(...)]` field attribute parsing

use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, Result};

/// Per-field settings shared by both derives
pub struct FieldConfig {
    pub ident: Ident,
    /// Column name to use (may be renamed)
    pub column_name: String,
    /// Not a column at all; filled with `Default` when reading
    pub skip: bool,
    /// Read from rows but left out of inserts (e.g. auto-increment ids)
    pub skip_insert: bool,
    pub ty: syn::Type,
}

impl FieldConfig {
    pub fn is_insert_column(&self) -> bool {
        !self.skip && !self.skip_insert
    }
}

fn parse_field_config(field: &Field) -> Result<FieldConfig> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;

    let mut column_name = ident.to_string();
    let mut skip = false;
    let mut skip_insert = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("sqlgate") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                column_name = lit.value();
            } else if meta.path.is_ident("skip") {
                skip = true;
            } else if meta.path.is_ident("skip_insert") {
                skip_insert = true;
            } else {
                return Err(meta.error(format!(
                    "unknown sqlgate attribute `{}`",
                    meta.path
                        .get_ident()
                        .map(|i| i.to_string())
                        .unwrap_or_default()
                )));
            }
            Ok(())
        })?;
    }

    Ok(FieldConfig {
        ident,
        column_name,
        skip,
        skip_insert,
        ty: field.ty.clone(),
    })
}

/// Field settings of a struct with named fields, in declaration order.
pub fn struct_fields(input: &DeriveInput) -> Result<Vec<FieldConfig>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };
    fields.iter().map(parse_field_config).collect()
}
