//! Reading mysql_async rows into result sets

use mysql_async::Row as MySqlAsyncRow;

use crate::traits::ResultSet;
use crate::value::Value;

use super::types::from_mysql_value;

/// Collect fetched rows into a [`ResultSet`].
///
/// Column names come from the first row; an empty result has no columns.
pub fn result_set(rows: Vec<MySqlAsyncRow>, affected_rows: u64) -> ResultSet {
    let columns = rows
        .first()
        .map(|row| {
            row.columns_ref()
                .iter()
                .map(|c| c.name_str().into_owned())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows.into_iter().map(row_values).collect();

    ResultSet {
        columns,
        rows,
        affected_rows,
    }
}

fn row_values(row: MySqlAsyncRow) -> Vec<Value> {
    row.unwrap_raw()
        .into_iter()
        .map(|v| v.map_or(Value::Null, from_mysql_value))
        .collect()
}
