//! Catalog trait implemented by every database driver

use crate::dialect::Dialect;
use crate::error::Result;
use crate::metadata::{ColumnMetadata, TableMetadata};
use crate::row::Row;
use crate::value::Value;
use async_trait::async_trait;

use super::ExtendedCatalog;

/// Read-only access to a database catalog.
///
/// Table arguments may be schema-qualified (`"sales.orders"`); drivers
/// split such names with [`split_qualified`](super::split_qualified) and
/// fall back to their default schema otherwise.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Dialect of the underlying connection
    fn dialect(&self) -> Dialect;

    /// Names of the ordinary tables in the current database or schema.
    async fn get_tables(&self) -> Result<Vec<String>>;

    /// Name of the current database.
    async fn current_database(&self) -> Result<String>;

    /// Kind, schema and comment of a single table.
    async fn table_type(&self, table: &str) -> Result<TableMetadata>;

    /// Ordered column metadata of a single table.
    async fn column_types(&self, table: &str) -> Result<Vec<ColumnMetadata>>;

    /// Run a raw catalog query with positional parameters and return its
    /// first row, or `None` when it produced no rows.
    async fn query_row(&self, sql: &str, params: Vec<Value>) -> Result<Option<Row>>;

    /// Quoted table expression configured on the session, if any
    /// (e.g. `"sales"."orders"`).
    fn table_expr(&self) -> Option<&str> {
        None
    }

    /// Richer schema-aware lookups, for drivers that support them.
    fn extended(&self) -> Option<&dyn ExtendedCatalog> {
        None
    }
}
