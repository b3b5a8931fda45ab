//! Value conversion and SQL literal formatting.
//!
//! [`IntoValue`] is the conversion seam builder APIs accept: it enumerates the
//! Rust types that can be bound as a MySQL value, including the chrono
//! date/time types. [`sql_literal`] renders a [`Value`] as literal SQL text
//! for contexts where the expression translator inlines constants.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::Value;

/// Render a value as its SQL literal text.
///
/// - `NULL` stays `NULL`
/// - strings are single-quoted with embedded quotes doubled
/// - booleans arrive as integers and render `1` / `0`
/// - date/time values render as `'YYYY-MM-DD HH:MM:SS'`
/// - numbers render as plain decimal text, unquoted
///
/// Always produces a string; there are no error conditions.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::NULL => "NULL".to_string(),
        Value::Bytes(bytes) => quote_str(&String::from_utf8_lossy(bytes)),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Date(year, month, day, hour, minute, second, _micros) => format!(
            "'{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}'"
        ),
        Value::Time(negative, days, hours, minutes, seconds, _micros) => {
            let sign = if *negative { "-" } else { "" };
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            format!("'{sign}{total_hours:02}:{minutes:02}:{seconds:02}'")
        }
    }
}

/// Single-quote a string, doubling every embedded quote.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
            out.push('\'');
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Conversion into a bindable [`Value`].
///
/// Enumerated per supported type rather than blanket-delegated so the chrono
/// date/time types can be covered without extra driver features.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

macro_rules! into_value_int {
    ($($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

into_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        Value::UInt(self)
    }
}

impl IntoValue for isize {
    fn into_value(self) -> Value {
        Value::Int(self as i64)
    }
}

impl IntoValue for usize {
    fn into_value(self) -> Value {
        Value::UInt(self as u64)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Bytes(self.into_bytes())
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Bytes(self.as_bytes().to_vec())
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl IntoValue for NaiveDateTime {
    fn into_value(self) -> Value {
        Value::Date(
            self.year() as u16,
            self.month() as u8,
            self.day() as u8,
            self.hour() as u8,
            self.minute() as u8,
            self.second() as u8,
            self.and_utc().timestamp_subsec_micros(),
        )
    }
}

impl IntoValue for NaiveDate {
    fn into_value(self) -> Value {
        Value::Date(self.year() as u16, self.month() as u8, self.day() as u8, 0, 0, 0, 0)
    }
}

impl IntoValue for NaiveTime {
    fn into_value(self) -> Value {
        Value::Time(
            false,
            0,
            self.hour() as u8,
            self.minute() as u8,
            self.second() as u8,
            self.nanosecond() / 1_000,
        )
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::NULL,
        }
    }
}
