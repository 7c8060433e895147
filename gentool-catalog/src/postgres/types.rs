//! Type conversion utilities for PostgreSQL

use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::Row as PgRow;

/// Boxed query parameter
pub type PgParam = Box<dyn ToSql + Sync + Send>;

/// Convert a catalog Value to a boxed tokio-postgres parameter
pub fn to_pg_param(value: &Value) -> Result<PgParam> {
    Ok(match value {
        // Untyped NULLs are bound as text; catalog queries cast their slots
        Value::Null => Box::new(None::<String>),
        Value::Bool(v) => Box::new(*v),
        Value::I64(v) => Box::new(*v),
        Value::U64(v) => Box::new(i64::try_from(*v).map_err(|_| Error::TypeConversion {
            expected: "i64",
            actual: format!("u64({}) out of range", v),
        })?),
        Value::F64(v) => Box::new(*v),
        Value::String(v) => Box::new(v.clone()),
        Value::Bytes(v) => Box::new(v.clone()),
    })
}

fn decode(row: &PgRow, index: usize, ty: &Type) -> Result<Value> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(index)?.map(Value::Bool),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(index)?
            .map(|v| Value::I64(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(index)?
            .map(|v| Value::I64(i64::from(v))),
        Type::INT8 => row.try_get::<_, Option<i64>>(index)?.map(Value::I64),
        Type::OID => row
            .try_get::<_, Option<u32>>(index)?
            .map(|v| Value::U64(u64::from(v))),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(index)?
            .map(|v| Value::F64(f64::from(v))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(index)?.map(Value::F64),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(index)?.map(Value::Bytes),
        _ => row
            .try_get::<_, Option<String>>(index)
            .map_err(|_| Error::TypeConversion {
                expected: "text-compatible column",
                actual: ty.name().to_string(),
            })?
            .map(Value::String),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Convert a tokio-postgres Row into a catalog Row
pub fn from_pg_row(row: &PgRow) -> Result<Row> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        columns.push(column.name().to_string());
        values.push(decode(row, i, column.type_())?);
    }
    Ok(Row::new(columns, values))
}
