//! Driver-independent result row

use crate::error::{Error, Result};
use crate::traits::FromValue;
use crate::value::Value;

/// A single result row.
///
/// Values keep the column order of the query, so they can be read by
/// position as well as by name. Name lookup tries an exact match first and
/// falls back to a case-insensitive one, since catalogs disagree on the case
/// of `information_schema` column labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from parallel column and value lists.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Column labels in query order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(column))
            })
    }

    /// Get a value from the row by column name as a dynamic Value.
    ///
    /// Returns an error if the column doesn't exist.
    pub fn get_value(&self, column: &str) -> Result<Value> {
        self.position(column)
            .and_then(|i| self.values.get(i))
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }

    /// Get a value from the row by position.
    pub fn value_at(&self, index: usize) -> Result<Value> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(format!("#{index}")))
    }

    /// Get a typed value from the row by column name.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T> {
        T::from_value(self.get_value(column)?)
    }

    /// Get a typed value from the row by position.
    pub fn get_at<T: FromValue>(&self, index: usize) -> Result<T> {
        T::from_value(self.value_at(index)?)
    }
}
