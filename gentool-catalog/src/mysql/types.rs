//! Type conversion utilities for MySQL

use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;
use mysql_async::{Row as MySqlAsyncRow, Value as MySqlValue};

/// Convert a catalog Value to a mysql_async Value
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::I64(v) => MySqlValue::from(*v),
        Value::U64(v) => MySqlValue::from(*v),
        Value::F64(v) => MySqlValue::from(*v),
        Value::String(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
    }
}

/// Convert a mysql_async Value to a catalog Value
pub fn from_mysql_value(value: MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        // Text protocol results arrive as bytes; keep them as strings when they are
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        MySqlValue::Int(v) => Value::I64(v),
        MySqlValue::UInt(v) => Value::U64(v),
        MySqlValue::Float(v) => Value::F64(f64::from(v)),
        MySqlValue::Double(v) => Value::F64(v),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => Value::String(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            year, month, day, hour, min, sec, micro
        )),
        MySqlValue::Time(neg, days, hours, min, sec, micro) => {
            let sign = if neg { "-" } else { "" };
            let hours = u32::from(hours) + days * 24;
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, hours, min, sec, micro
            ))
        }
    }
}

/// Convert a mysql_async Row into a catalog Row
pub fn from_mysql_row(row: MySqlAsyncRow) -> Result<Row> {
    let columns: Vec<String> = row
        .columns_ref()
        .iter()
        .map(|c| c.name_str().to_string())
        .collect();
    let mut values = Vec::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        let value = row
            .as_ref(i)
            .ok_or_else(|| Error::ColumnNotFound(column.clone()))?
            .clone();
        values.push(from_mysql_value(value));
    }
    Ok(Row::new(columns, values))
}
