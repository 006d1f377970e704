//! FromRow trait for mapping query rows to Rust structs

use crate::error::Result;
use crate::row::Row;

/// Trait for types that can be constructed from a named query row.
///
/// This trait is typically implemented via the `#[derive(FromRow)]` macro,
/// which generates the implementation automatically based on struct fields.
///
/// # Manual Implementation
///
/// ```ignore
/// use sqlgate::{FromRow, Row, Result};
///
/// pub struct User {
///     pub id: i64,
///     pub username: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &Row) -> Result<Self> {
///         Ok(Self {
///             id: row.get("id")?,
///             username: row.get("username")?,
///         })
///     }
///
///     fn column_names() -> &'static [&'static str] {
///         &["id", "username"]
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Construct an instance of this type from a row.
    fn from_row(row: &Row) -> Result<Self>;

    /// Get the column names that this type reads from.
    fn column_names() -> &'static [&'static str];
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }

    fn column_names() -> &'static [&'static str] {
        &[]
    }
}
