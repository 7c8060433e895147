//! Raw PostgreSQL catalog queries for table kind and comment
//!
//! The schema slot is either a bound parameter or `CURRENT_SCHEMA()`
//! evaluated by the server, see [`SchemaRef`].

use crate::error::{Error, Result};
use crate::metadata::TableMetadata;
use crate::traits::{Catalog, SchemaRef};
use crate::value::Value;

const TABLE_TYPE_TEMPLATE: &str = "SELECT schemaname::text, tablename::text, \
     CASE WHEN schemaname LIKE 'pg_%' THEN 'SYSTEM TABLE' ELSE 'BASE TABLE' END \
     FROM pg_catalog.pg_tables \
     WHERE schemaname = {schema} AND tablename = {table}";

const TABLE_COMMENT_TEMPLATE: &str = "SELECT obj_description(pg_class.oid, 'pg_class') AS table_comment \
     FROM information_schema.tables AS tables \
     JOIN pg_namespace ON pg_namespace.nspname = tables.table_schema \
     JOIN pg_class ON pg_class.relname = tables.table_name AND pg_class.relnamespace = pg_namespace.oid \
     WHERE tables.table_schema = {schema} AND tables.table_name = {table}";

fn render(template: &str, schema: &SchemaRef, table: &str) -> (String, Vec<Value>) {
    let (schema_slot, table_slot, params) = match schema {
        SchemaRef::Named(name) => (
            "$1::text",
            "$2::text",
            vec![Value::from(name.as_str()), Value::from(table)],
        ),
        SchemaRef::CurrentSchema => ("CURRENT_SCHEMA()", "$1::text", vec![Value::from(table)]),
    };
    let sql = template
        .replace("{schema}", schema_slot)
        .replace("{table}", table_slot);
    (sql, params)
}

/// Query returning `(schema, name, kind)` where kind is
/// `SYSTEM TABLE` for `pg_*` schemas and `BASE TABLE` otherwise.
pub fn table_type_query(schema: &SchemaRef, table: &str) -> (String, Vec<Value>) {
    render(TABLE_TYPE_TEMPLATE, schema, table)
}

/// Query returning the table comment (possibly NULL).
pub fn table_comment_query(schema: &SchemaRef, table: &str) -> (String, Vec<Value>) {
    render(TABLE_COMMENT_TEMPLATE, schema, table)
}

/// Run both queries through `catalog` and assemble the table metadata.
///
/// Either query returning no row is an error.
pub async fn fetch_table_type<C>(catalog: &C, schema: &SchemaRef, table: &str) -> Result<TableMetadata>
where
    C: Catalog + ?Sized,
{
    let (sql, params) = table_type_query(schema, table);
    let row = catalog
        .query_row(&sql, params)
        .await?
        .ok_or_else(|| Error::NoRows(format!("no pg_tables entry for {}", table)))?;
    let schema_name: String = row.get_at(0)?;
    let name: String = row.get_at(1)?;
    let table_type: String = row.get_at(2)?;

    let (sql, params) = table_comment_query(schema, table);
    let row = catalog
        .query_row(&sql, params)
        .await?
        .ok_or_else(|| Error::NoRows(format!("no comment row for {}", table)))?;
    let comment: Option<String> = row.get_at(0)?;

    Ok(TableMetadata {
        name,
        schema: Some(schema_name),
        comment,
        table_type,
    })
}
