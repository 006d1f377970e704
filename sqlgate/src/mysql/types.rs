//! Type conversion utilities for MySQL

use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::Value as MySqlValue;

/// Convert a sqlgate Value to a mysql_async Value
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::Int(v) => MySqlValue::Int(*v),
        Value::UInt(v) => MySqlValue::UInt(*v),
        Value::Float(v) => MySqlValue::Double(*v),
        Value::String(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
        Value::Date(v) => MySqlValue::Date(v.year() as u16, v.month() as u8, v.day() as u8, 0, 0, 0, 0),
        Value::DateTime(v) => MySqlValue::Date(
            v.year() as u16,
            v.month() as u8,
            v.day() as u8,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.and_utc().timestamp_subsec_micros(),
        ),
        Value::Time(v) => MySqlValue::Time(
            false,
            0,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.nanosecond() / 1000,
        ),
        Value::Decimal(v) => MySqlValue::from(v.to_string()),
        Value::Json(v) => MySqlValue::from(v.to_string()),
    }
}

/// Convert a mysql_async Value to a sqlgate Value.
///
/// Never fails: zero dates and TIME values outside a single day (negative,
/// or 24 hours and more) come back as their MySQL text form.
pub fn from_mysql_value(value: MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        MySqlValue::Int(v) => Value::Int(v),
        MySqlValue::UInt(v) => Value::from(v),
        MySqlValue::Float(v) => Value::Float(f64::from(v)),
        MySqlValue::Double(v) => Value::Float(v),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => {
            let Some(date) = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            else {
                return Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, min, sec
                ));
            };
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                return Value::Date(date);
            }
            match NaiveTime::from_hms_micro_opt(u32::from(hour), u32::from(min), u32::from(sec), micro) {
                Some(time) => Value::DateTime(NaiveDateTime::new(date, time)),
                None => Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, min, sec
                )),
            }
        }
        MySqlValue::Time(is_neg, days, hours, mins, secs, micro) => {
            let time = (!is_neg && days == 0)
                .then(|| {
                    NaiveTime::from_hms_micro_opt(
                        u32::from(hours),
                        u32::from(mins),
                        u32::from(secs),
                        micro,
                    )
                })
                .flatten();
            match time {
                Some(time) => Value::Time(time),
                None => Value::String(format!(
                    "{}{}:{:02}:{:02}",
                    if is_neg { "-" } else { "" },
                    days * 24 + u32::from(hours),
                    mins,
                    secs
                )),
            }
        }
    }
}
