//! Type conversion utilities for SQL Server

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;
use tiberius::{ColumnData, Row as TiberiusRow, ToSql};

/// A catalog Value bound as a tiberius parameter
#[derive(Debug)]
pub struct MssqlParam(pub Value);

impl ToSql for MssqlParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match &self.0 {
            Value::Null => ColumnData::String(None),
            Value::Bool(v) => ColumnData::Bit(Some(*v)),
            Value::I64(v) => ColumnData::I64(Some(*v)),
            Value::U64(v) => match i64::try_from(*v) {
                Ok(v) => ColumnData::I64(Some(v)),
                Err(_) => ColumnData::String(Some(Cow::Owned(v.to_string()))),
            },
            Value::F64(v) => ColumnData::F64(Some(*v)),
            Value::String(v) => ColumnData::String(Some(Cow::Borrowed(v.as_str()))),
            Value::Bytes(v) => ColumnData::Binary(Some(Cow::Borrowed(v.as_slice()))),
        }
    }
}

fn column_data_to_value(data: ColumnData<'static>) -> Result<Value> {
    Ok(match data {
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::U8(v) => v.map(|v| Value::I64(i64::from(v))).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(|v| Value::I64(i64::from(v))).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(|v| Value::I64(i64::from(v))).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::I64).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|v| Value::F64(f64::from(v))).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::F64).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .map(|v| Value::String(v.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .map(|v| Value::Bytes(v.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        other => {
            return Err(Error::TypeConversion {
                expected: "catalog column type",
                actual: format!("{:?}", other),
            })
        }
    })
}

/// Convert a tiberius Row into a catalog Row
pub fn from_tiberius_row(row: TiberiusRow) -> Result<Row> {
    let columns: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let values = row
        .into_iter()
        .map(column_data_to_value)
        .collect::<Result<Vec<_>>>()?;
    Ok(Row::new(columns, values))
}
