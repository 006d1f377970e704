//! Derive macros for the sqlgate database access layer
//!
//! This crate provides the following derive macros:
//! - `FromRow` - Maps named result rows to Rust structs
//! - `ToRow` - Turns Rust structs into named rows for batch inserts
//!
//! These macros are re-exported from the `sqlgate` crate, so users typically
//! don't need to depend on this crate directly.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attrs;
mod from_row;
mod to_row;

/// Derive macro for mapping database rows to Rust structs.
///
/// # Attributes
///
/// - `#[sqlgate(rename = "column_name")]` - Use a different column name for this field
/// - `#[sqlgate(skip)]` - Not a column; the field is filled with `Default::default()`
///
/// # Example
///
/// ```ignore
/// use sqlgate::FromRow;
///
/// #[derive(FromRow)]
/// pub struct User {
///     pub id: i64,
///     #[sqlgate(rename = "user_name")]
///     pub username: String,
///     pub email: Option<String>,
/// }
/// ```
#[proc_macro_derive(FromRow, attributes(sqlgate))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::derive_from_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive macro for turning Rust structs into insertable rows.
///
/// # Attributes
///
/// - `#[sqlgate(rename = "column_name")]` - Use a different column name for this field
/// - `#[sqlgate(skip_insert)]` - Leave the field out of inserts (e.g. auto-increment ids)
/// - `#[sqlgate(skip)]` - Not a column at all
///
/// # Example
///
/// ```ignore
/// use sqlgate::ToRow;
///
/// #[derive(ToRow)]
/// pub struct User {
///     #[sqlgate(skip_insert)]
///     pub id: i64,
///     pub username: String,
///     pub email: String,
/// }
///
/// conn.insert_entities("users", &users).await?;
/// ```
#[proc_macro_derive(ToRow, attributes(sqlgate))]
pub fn derive_to_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    to_row::derive_to_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
