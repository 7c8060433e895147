//! FromValue trait for converting catalog values to Rust types

use crate::error::{Error, Result};
use crate::value::Value;

/// Trait for types that can be converted from a database Value.
pub trait FromValue: Sized {
    /// Convert from a Value to this type.
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::I64(v) => Ok(v != 0),
            Value::U64(v) => Ok(v != 0),
            // Catalogs spell flags as text more often than not
            Value::String(ref v) => match v.as_str() {
                "1" | "t" | "true" | "YES" => Ok(true),
                "0" | "f" | "false" | "NO" => Ok(false),
                _ => Err(Error::TypeConversion {
                    expected: "bool",
                    actual: format!("string({})", v),
                }),
            },
            _ => Err(Error::TypeConversion {
                expected: "bool",
                actual: value.type_name().to_string(),
            }),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::I64(v) => Ok(v),
            Value::U64(v) => v.try_into().map_err(|_| Error::TypeConversion {
                expected: "i64",
                actual: format!("u64({}) out of range", v),
            }),
            Value::Bool(v) => Ok(i64::from(v)),
            Value::String(ref v) => v.parse().map_err(|_| Error::TypeConversion {
                expected: "i64",
                actual: format!("string({})", v),
            }),
            _ => Err(Error::TypeConversion {
                expected: "i64",
                actual: value.type_name().to_string(),
            }),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::U64(v) => Ok(v),
            Value::I64(v) => v.try_into().map_err(|_| Error::TypeConversion {
                expected: "u64",
                actual: format!("i64({}) out of range", v),
            }),
            _ => Err(Error::TypeConversion {
                expected: "u64",
                actual: value.type_name().to_string(),
            }),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F64(v) => Ok(v),
            Value::I64(v) => Ok(v as f64),
            _ => Err(Error::TypeConversion {
                expected: "f64",
                actual: value.type_name().to_string(),
            }),
        }
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
            Value::I64(v) => Ok(v.to_string()),
            Value::U64(v) => Ok(v.to_string()),
            _ => Err(Error::TypeConversion {
                expected: "string",
                actual: value.type_name().to_string(),
            }),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::String(v) => Ok(v.into_bytes()),
            _ => Err(Error::TypeConversion {
                expected: "bytes",
                actual: value.type_name().to_string(),
            }),
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_from_catalog_spellings() {
        assert!(bool::from_value(Value::from("YES")).unwrap());
        assert!(!bool::from_value(Value::from("NO")).unwrap());
        assert!(bool::from_value(Value::I64(1)).unwrap());
        assert!(bool::from_value(Value::from("maybe")).is_err());
    }

    #[test]
    fn test_string_from_bytes() {
        let s = String::from_value(Value::Bytes(b"users".to_vec())).unwrap();
        assert_eq!(s, "users");
        assert!(String::from_value(Value::Bytes(vec![0xff, 0xfe])).is_err());
    }

    #[test]
    fn test_option_null() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i64>::from_value(Value::I64(3)).unwrap(),
            Some(3)
        );
    }
}
