//! MySQL identifier and literal quoting

use std::fmt::Write;

use chrono::Timelike;

use crate::value::Value;

/// Quote an identifier with backticks. `*` is passed through unchanged.
pub fn quote_name(name: &str) -> String {
    if name == "*" {
        return name.to_string();
    }
    format!("`{}`", name.replace('`', "``"))
}

/// Quote `column` or `table.column`; only the first dot separates.
pub fn quote_column_name(name: &str) -> String {
    match name.split_once('.') {
        Some((table, column)) => format!("{}.{}", quote_name(table), quote_name(column)),
        None => quote_name(name),
    }
}

/// Comma-separated quoted identifiers.
pub fn quote_name_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| quote_name(n.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a string literal with MySQL escaping.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render a value as an SQL literal.
///
/// Numbers are bare, booleans become `1`/`0`, NULL is `NULL`; everything else
/// is a quoted string (bytes as a hex literal).
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(v) => String::from(if *v { "1" } else { "0" }),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) if v.is_finite() => v.to_string(),
        Value::Float(v) => quote_string(&v.to_string()),
        Value::Decimal(v) => v.to_string(),
        Value::String(v) => quote_string(v),
        Value::Bytes(v) => {
            let mut out = String::with_capacity(v.len() * 2 + 3);
            out.push_str("X'");
            for b in v {
                let _ = write!(out, "{:02X}", b);
            }
            out.push('\'');
            out
        }
        Value::Date(v) => quote_string(&v.format("%Y-%m-%d").to_string()),
        Value::DateTime(v) if v.nanosecond() == 0 => {
            quote_string(&v.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        Value::DateTime(v) => quote_string(&v.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
        Value::Time(v) if v.nanosecond() == 0 => quote_string(&v.format("%H:%M:%S").to_string()),
        Value::Time(v) => quote_string(&v.format("%H:%M:%S%.6f").to_string()),
        Value::Json(v) => quote_string(&v.to_string()),
    }
}

/// Comma-separated literals for one value tuple.
pub fn quote_list(values: &[Value]) -> String {
    values.iter().map(literal).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_quote_name() {
        assert_eq!(quote_name("users"), "`users`");
        assert_eq!(quote_name("we`ird"), "`we``ird`");
        assert_eq!(quote_name("*"), "*");
        assert_eq!(quote_column_name("u.id"), "`u`.`id`");
        assert_eq!(quote_column_name("a.b.c"), "`a`.`b.c`");
        assert_eq!(quote_name_list(&["id", "name"]), "`id`,`name`");
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("a"), "'a'");
        assert_eq!(quote_string("it's"), "'it\\'s'");
        assert_eq!(quote_string("a\\b\n"), "'a\\\\b\\n'");
        assert_eq!(quote_string("\0\x1a\""), "'\\0\\Z\\\"'");
    }

    #[test]
    fn test_literals() {
        let row = vec![
            Value::Int(1),
            Value::String("a".into()),
            Value::Bool(true),
            Value::Null,
            Value::Float(1.5),
            Value::Bytes(vec![0xde, 0xad]),
        ];
        assert_eq!(quote_list(&row), "1,'a',1,NULL,1.5,X'DEAD'");
    }

    #[test]
    fn test_non_finite_float_is_quoted() {
        assert_eq!(literal(&Value::Float(f64::INFINITY)), "'inf'");
        assert_eq!(literal(&Value::String("1".into())), "'1'");
    }

    #[test]
    fn test_temporal_literals() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(literal(&Value::DateTime(dt)), "'2024-03-01 12:30:00'");
        assert_eq!(literal(&Value::Date(dt.date())), "'2024-03-01'");
    }
}
