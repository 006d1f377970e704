//! FromValue trait for converting database values to Rust types

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Trait for types that can be constructed from a database value.
///
/// Numeric conversions also accept decimal strings, since one-shot
/// (text protocol) queries return every column as text.
pub trait FromValue: Sized {
    /// Convert a database value to this type.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    match value {
        // Row::get fills in the column name
        Value::Null => Error::UnexpectedNull(String::new()),
        other => Error::TypeConversion {
            expected,
            actual: other.type_name().to_string(),
        },
    }
}

fn out_of_range(expected: &'static str, actual: impl std::fmt::Display) -> Error {
    Error::TypeConversion {
        expected,
        actual: format!("{} out of range", actual),
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            Value::String(ref s) => match s.as_str() {
                "1" | "true" | "TRUE" => Ok(true),
                "0" | "false" | "FALSE" => Ok(false),
                _ => Err(mismatch("bool", &value)),
            },
            _ => Err(mismatch("bool", &value)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).map_err(|_| out_of_range($name, v)),
                        Value::UInt(v) => <$ty>::try_from(v).map_err(|_| out_of_range($name, v)),
                        Value::Bool(v) => Ok(<$ty>::from(v)),
                        Value::String(ref s) => s.trim().parse::<$ty>().map_err(|_| {
                            Error::TypeConversion {
                                expected: $name,
                                actual: format!("invalid integer string: {}", s),
                            }
                        }),
                        _ => Err(mismatch($name, &value)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::UInt(v) => Ok(v as f64),
            Value::Decimal(ref v) => v.to_string().parse().map_err(|_| mismatch("f64", &value)),
            Value::String(ref s) => s.trim().parse().map_err(|_| Error::TypeConversion {
                expected: "f64",
                actual: format!("invalid float string: {}", s),
            }),
            _ => Err(mismatch("f64", &value)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|e| Error::TypeConversion {
                expected: "utf8 string",
                actual: format!("invalid utf8: {}", e),
            }),
            Value::Int(v) => Ok(v.to_string()),
            Value::UInt(v) => Ok(v.to_string()),
            Value::Decimal(v) => Ok(v.to_string()),
            _ => Err(mismatch("string", &value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::String(v) => Ok(v.into_bytes()),
            _ => Err(mismatch("bytes", &value)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            Value::String(ref s) => {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| mismatch("date", &value))
            }
            _ => Err(mismatch("date", &value)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => Ok(v.and_time(NaiveTime::MIN)),
            Value::String(ref s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .map_err(|_| mismatch("datetime", &value)),
            _ => Err(mismatch("datetime", &value)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(v) => Ok(v),
            Value::DateTime(v) => Ok(v.time()),
            Value::String(ref s) => {
                NaiveTime::parse_from_str(s, "%H:%M:%S%.f").map_err(|_| mismatch("time", &value))
            }
            _ => Err(mismatch("time", &value)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Int(v) => Ok(Decimal::from(v)),
            Value::UInt(v) => Ok(Decimal::from(v)),
            Value::String(v) => v.parse().map_err(|_| Error::TypeConversion {
                expected: "decimal",
                actual: format!("invalid decimal string: {}", v),
            }),
            _ => Err(mismatch("decimal", &value)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::String(v) => serde_json::from_str(&v).map_err(|e| Error::TypeConversion {
                expected: "json",
                actual: format!("invalid json: {}", e),
            }),
            _ => Err(mismatch("json", &value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

// Implement for Option<T>
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}
