//! Rows as returned by queries and accepted by inserts

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::traits::FromValue;
use crate::value::Value;

/// Column name to value, in column order.
pub type Record = IndexMap<String, Value>;

/// A database row, either keyed by column name or by position.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Field-named record
    Named(Record),
    /// Positional sequence of values
    Positional(Vec<Value>),
}

impl Row {
    /// Build a named row from `(column, value)` pairs.
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Row::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a positional row.
    pub fn positional<V, I>(values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Row::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Named(record) => record.len(),
            Row::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Row::Named(_))
    }

    /// Column names of a named row; `None` for positional rows.
    pub fn keys(&self) -> Option<impl Iterator<Item = &str>> {
        match self {
            Row::Named(record) => Some(record.keys().map(String::as_str)),
            Row::Positional(_) => None,
        }
    }

    /// Get a value by column name. Positional rows have no names.
    pub fn get_value(&self, column: &str) -> Result<&Value> {
        match self {
            Row::Named(record) => record
                .get(column)
                .ok_or_else(|| Error::ColumnNotFound(column.to_string())),
            Row::Positional(_) => Err(Error::ColumnNotFound(column.to_string())),
        }
    }

    /// Get a value by position; works for both shapes.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Named(record) => record.get_index(index).map(|(_, v)| v),
            Row::Positional(values) => values.get(index),
        }
    }

    /// Get a typed value by column name.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self.get_value(column)?.clone();
        T::from_value(value).map_err(|e| match e {
            Error::UnexpectedNull(_) => Error::UnexpectedNull(column.to_string()),
            other => other,
        })
    }

    /// Get a typed value by position.
    pub fn get_at<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self
            .get_index(index)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", index)))?;
        T::from_value(value)
    }

    /// Consume the row, keeping only the values in order.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Row::Named(record) => record.into_values().collect(),
            Row::Positional(values) => values,
        }
    }

    /// Objects become named rows (key order kept), arrays positional rows.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(Row::Named(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            )),
            serde_json::Value::Array(items) => Ok(Row::Positional(
                items.into_iter().map(Value::from_json).collect(),
            )),
            other => Err(Error::TypeConversion {
                expected: "object or array",
                actual: other.to_string(),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Row::Named(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Row::Positional(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl From<Record> for Row {
    fn from(record: Record) -> Self {
        Row::Named(record)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::Positional(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_keeps_key_order() {
        let row = Row::from_json(json!({"name": "a", "id": 1})).unwrap();
        let keys: Vec<&str> = row.keys().unwrap().collect();
        assert_eq!(keys, vec!["name", "id"]);
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
    }

    #[test]
    fn test_positional_has_no_names() {
        let row = Row::positional([1, 2]);
        assert!(row.keys().is_none());
        assert!(matches!(row.get_value("a"), Err(Error::ColumnNotFound(_))));
        assert_eq!(row.get_at::<i32>(1).unwrap(), 2);
    }

    #[test]
    fn test_null_reports_column_name() {
        let row = Row::named([("email", Value::Null)]);
        let err = row.get::<String>("email").unwrap_err();
        assert_eq!(err, Error::UnexpectedNull("email".to_string()));
        assert_eq!(row.get::<Option<String>>("email").unwrap(), None);
    }

    #[test]
    fn test_scalar_json_is_rejected() {
        assert!(Row::from_json(json!(3)).is_err());
    }
}
