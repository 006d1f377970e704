//! Result shaping

use crate::mode::{QueryMode, ResultKind};
use crate::row::{Record, Row};
use crate::traits::ResultSet;
use crate::value::Value;

/// Value returned by [`Connection::execute`](crate::Connection::execute).
///
/// `Scalar(None)` and `Row(None)` mean "no row", which is not an error;
/// `Rows` is empty in that case instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    RowCount(u64),
    Scalar(Option<Value>),
    Row(Option<Row>),
    Rows(Vec<Row>),
    InsertId(u64),
}

impl Output {
    pub fn into_row_count(self) -> Option<u64> {
        match self {
            Output::RowCount(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_scalar(self) -> Option<Value> {
        match self {
            Output::Scalar(v) => v,
            _ => None,
        }
    }

    pub fn into_row(self) -> Option<Row> {
        match self {
            Output::Row(row) => row,
            _ => None,
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Output::Rows(rows) => rows,
            Output::Row(Some(row)) => vec![row],
            _ => Vec::new(),
        }
    }

    pub fn into_insert_id(self) -> Option<u64> {
        match self {
            Output::InsertId(id) => Some(id),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Output::RowCount(n) | Output::InsertId(n) => serde_json::Value::from(*n),
            Output::Scalar(v) => v.as_ref().map(Value::to_json).unwrap_or_default(),
            Output::Row(row) => row.as_ref().map(Row::to_json).unwrap_or_default(),
            Output::Rows(rows) => rows.iter().map(Row::to_json).collect(),
        }
    }
}

/// Turn a raw result into the shape `mode` asks for.
///
/// `insert_id` is only consulted for [`ResultKind::InsertId`].
pub fn shape(mode: QueryMode, set: ResultSet, insert_id: impl FnOnce() -> Option<u64>) -> Output {
    match mode.kind {
        ResultKind::RowCount => Output::RowCount(set.affected_rows),
        ResultKind::SingleScalar => Output::Scalar(
            set.rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next()),
        ),
        ResultKind::SingleRow => {
            let columns = set.columns;
            Output::Row(
                set.rows
                    .into_iter()
                    .next()
                    .map(|values| make_row(&columns, values, mode.numbered)),
            )
        }
        ResultKind::ManyRows => {
            let columns = set.columns;
            Output::Rows(
                set.rows
                    .into_iter()
                    .map(|values| make_row(&columns, values, mode.numbered))
                    .collect(),
            )
        }
        ResultKind::InsertId => Output::InsertId(insert_id().unwrap_or(0)),
    }
}

fn make_row(columns: &[String], values: Vec<Value>, numbered: bool) -> Row {
    if numbered {
        return Row::Positional(values);
    }
    let record: Record = columns.iter().cloned().zip(values).collect();
    Row::Named(record)
}
