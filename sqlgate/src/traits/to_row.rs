//! ToRow trait for turning structs into insertable rows

use crate::row::Row;

/// Trait for types that can be inserted as a named row.
///
/// Usually implemented via `#[derive(ToRow)]`. Fields marked
/// `#[sqlgate(skip_insert)]` (auto-increment keys, defaults) are left out of
/// both the column list and the row.
pub trait ToRow {
    /// Column names written by [`to_row`](ToRow::to_row), in order.
    fn insert_column_names() -> &'static [&'static str];

    /// Build a named row holding this value's insertable fields.
    fn to_row(&self) -> Row;
}

impl ToRow for Row {
    fn insert_column_names() -> &'static [&'static str] {
        &[]
    }

    fn to_row(&self) -> Row {
        self.clone()
    }
}
