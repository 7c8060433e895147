//! Optional schema-aware catalog capability

use crate::error::Result;
use crate::metadata::TableMetadata;
use async_trait::async_trait;

/// Where a table's schema comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
    /// An explicit schema name, bound as a query parameter
    Named(String),
    /// The session's current schema, evaluated by the database
    CurrentSchema,
}

impl SchemaRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaRef::Named(name) => Some(name),
            SchemaRef::CurrentSchema => None,
        }
    }
}

/// A table reference as seen by a single lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Table name as given by the caller, possibly `schema.table`
    pub table: String,
    /// Quoted table expression of the session, if any
    pub table_expr: Option<String>,
}

impl Statement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            table_expr: None,
        }
    }

    pub fn with_table_expr(mut self, expr: Option<&str>) -> Self {
        self.table_expr = expr.map(str::to_string);
        self
    }
}

/// Schema-aware lookups a driver may offer on top of [`Catalog`](super::Catalog).
#[async_trait]
pub trait ExtendedCatalog: Send + Sync {
    /// Build the statement used for lookups of `table`.
    fn statement(&self, table: &str) -> Statement {
        Statement::new(table)
    }

    /// Resolve the schema and bare table name of a statement.
    async fn current_schema(&self, stmt: &Statement) -> Result<(SchemaRef, String)>;

    /// Kind, schema and comment of the statement's table.
    async fn table_type(&self, stmt: &Statement) -> Result<TableMetadata>;
}

/// Split `schema.table`. Anything other than exactly two segments is
/// treated as a bare table name.
pub fn split_qualified(table: &str) -> (Option<&str>, &str) {
    let mut parts = table.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(schema), Some(name), None) => (Some(schema), name),
        _ => (None, table),
    }
}

/// Explicit schema of a statement, if it names one.
///
/// A two-segment table name wins. Otherwise a table expression of the form
/// `"schema"."table"` supplies the schema and the table name is kept as
/// given. Returns `None` when the caller should fall back to the session's
/// default schema.
pub fn resolve_schema(stmt: &Statement) -> Option<(String, String)> {
    if let (Some(schema), name) = split_qualified(&stmt.table) {
        return Some((schema.to_string(), name.to_string()));
    }
    let expr = stmt.table_expr.as_deref()?;
    let parts: Vec<&str> = expr.split("\".\"").collect();
    if parts.len() == 2 {
        let schema = parts[0].trim_start_matches('"');
        return Some((schema.to_string(), stmt.table.clone()));
    }
    None
}
