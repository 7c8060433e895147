//! SQL Server catalog backed by a tiberius client

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::metadata::{ColumnMetadata, TableMetadata};
use crate::row::Row;
use crate::traits::{
    resolve_schema, split_qualified, Catalog, ExtendedCatalog, SchemaRef, Statement,
};
use crate::value::Value;
use async_trait::async_trait;
use tiberius::{Client, ToSql};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use super::dsn::parse_config;
use super::types::{from_tiberius_row, MssqlParam};

const TABLES_SQL: &str = "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_CATALOG = DB_NAME() ORDER BY TABLE_NAME";

const TABLE_TYPE_TEMPLATE: &str = "SELECT t.TABLE_SCHEMA, t.TABLE_NAME, t.TABLE_TYPE, \
     CAST(ep.value AS NVARCHAR(4000)) \
     FROM INFORMATION_SCHEMA.TABLES t \
     LEFT JOIN sys.extended_properties ep \
       ON ep.major_id = OBJECT_ID(QUOTENAME(t.TABLE_SCHEMA) + '.' + QUOTENAME(t.TABLE_NAME)) \
      AND ep.minor_id = 0 AND ep.name = 'MS_Description' \
     WHERE t.TABLE_SCHEMA = {schema} AND t.TABLE_NAME = {table}";

const COLUMNS_TEMPLATE: &str = "SELECT c.COLUMN_NAME, c.DATA_TYPE, \
     c.DATA_TYPE + CASE \
       WHEN c.CHARACTER_MAXIMUM_LENGTH = -1 THEN '(max)' \
       WHEN c.CHARACTER_MAXIMUM_LENGTH IS NOT NULL \
         THEN '(' + CAST(c.CHARACTER_MAXIMUM_LENGTH AS VARCHAR(10)) + ')' \
       WHEN c.DATA_TYPE IN ('decimal', 'numeric') \
         THEN '(' + CAST(c.NUMERIC_PRECISION AS VARCHAR(10)) + ',' + CAST(c.NUMERIC_SCALE AS VARCHAR(10)) + ')' \
       ELSE '' END, \
     CASE WHEN c.IS_NULLABLE = 'YES' THEN 1 ELSE 0 END, \
     CASE WHEN EXISTS ({key_exists} 'PRIMARY KEY') THEN 1 ELSE 0 END, \
     CASE WHEN EXISTS ({key_exists} 'UNIQUE' \
       AND (SELECT COUNT(*) FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE k2 \
            WHERE k2.CONSTRAINT_NAME = tc.CONSTRAINT_NAME AND k2.TABLE_SCHEMA = tc.TABLE_SCHEMA) = 1) \
       THEN 1 ELSE 0 END, \
     c.COLUMN_DEFAULT, \
     CAST(ep.value AS NVARCHAR(4000)) \
     FROM INFORMATION_SCHEMA.COLUMNS c \
     LEFT JOIN sys.extended_properties ep \
       ON ep.major_id = OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)) \
      AND ep.minor_id = COLUMNPROPERTY(ep.major_id, c.COLUMN_NAME, 'ColumnId') \
      AND ep.name = 'MS_Description' \
     WHERE c.TABLE_SCHEMA = {schema} AND c.TABLE_NAME = {table} \
     ORDER BY c.ORDINAL_POSITION";

const KEY_EXISTS: &str = "SELECT 1 FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
     JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
       ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA \
     WHERE tc.TABLE_SCHEMA = c.TABLE_SCHEMA AND tc.TABLE_NAME = c.TABLE_NAME \
       AND kcu.COLUMN_NAME = c.COLUMN_NAME AND tc.CONSTRAINT_TYPE =";

/// Fill the `{schema}` and `{table}` slots, binding an explicit schema as
/// `@P1` and falling back to the session's `SCHEMA_NAME()`.
fn render(template: &str, schema: &SchemaRef, table: &str) -> (String, Vec<Value>) {
    let (schema_slot, table_slot, params) = match schema {
        SchemaRef::Named(name) => (
            "@P1",
            "@P2",
            vec![Value::from(name.as_str()), Value::from(table)],
        ),
        SchemaRef::CurrentSchema => ("SCHEMA_NAME()", "@P1", vec![Value::from(table)]),
    };
    let sql = template
        .replace("{key_exists}", KEY_EXISTS)
        .replace("{schema}", schema_slot)
        .replace("{table}", table_slot);
    (sql, params)
}

fn schema_of(table: &str) -> (SchemaRef, &str) {
    match split_qualified(table) {
        (Some(schema), name) => (SchemaRef::Named(schema.to_string()), name),
        (None, name) => (SchemaRef::CurrentSchema, name),
    }
}

/// A SQL Server catalog.
///
/// tiberius clients need exclusive access per query, so the client sits
/// behind an async mutex.
pub struct SqlServerCatalog {
    client: Mutex<Client<Compat<TcpStream>>>,
}

impl SqlServerCatalog {
    /// Connect using a `sqlserver://` URL or an ADO.NET connection string.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let config = parse_config(dsn)?;
        debug!(addr = %config.get_addr(), "connecting to SQL Server");

        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;
        let client = Client::connect(config, tcp.compat_write()).await?;

        Ok(Self {
            client: Mutex::new(client),
        })
    }

    async fn fetch_all(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let params: Vec<MssqlParam> = params.into_iter().map(MssqlParam).collect();
        let refs: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let mut client = self.client.lock().await;
        let rows = client.query(sql, &refs).await?.into_first_result().await?;
        rows.into_iter().map(from_tiberius_row).collect()
    }

    async fn fetch_table_type(&self, schema: &SchemaRef, table: &str) -> Result<TableMetadata> {
        let (sql, params) = render(TABLE_TYPE_TEMPLATE, schema, table);
        let row = self
            .query_row(&sql, params)
            .await?
            .ok_or_else(|| Error::NoRows(format!("table {} not found", table)))?;
        Ok(TableMetadata {
            schema: row.get_at(0)?,
            name: row.get_at(1)?,
            table_type: row.get_at(2)?,
            comment: row.get_at(3)?,
        })
    }
}

#[async_trait]
impl Catalog for SqlServerCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    async fn get_tables(&self) -> Result<Vec<String>> {
        self.fetch_all(TABLES_SQL, Vec::new())
            .await?
            .iter()
            .map(|row| row.get_at::<String>(0))
            .collect()
    }

    async fn current_database(&self) -> Result<String> {
        let row = self
            .query_row("SELECT DB_NAME()", Vec::new())
            .await?
            .ok_or_else(|| Error::NoRows("SELECT DB_NAME()".to_string()))?;
        row.get_at(0)
    }

    async fn table_type(&self, table: &str) -> Result<TableMetadata> {
        let (schema, name) = schema_of(table);
        self.fetch_table_type(&schema, name).await
    }

    async fn column_types(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        let (schema, name) = schema_of(table);
        debug!(table = name, schema = ?schema.name(), "reading SQL Server columns");
        let (sql, params) = render(COLUMNS_TEMPLATE, &schema, name);
        let rows = self.fetch_all(&sql, params).await?;
        rows.iter()
            .map(|row| {
                Ok(ColumnMetadata {
                    name: row.get_at(0)?,
                    database_type: row.get_at(1)?,
                    column_type: row.get_at(2)?,
                    nullable: row.get_at(3)?,
                    primary_key: row.get_at(4)?,
                    unique: row.get_at(5)?,
                    default_value: row.get_at(6)?,
                    comment: row.get_at(7)?,
                })
            })
            .collect()
    }

    async fn query_row(&self, sql: &str, params: Vec<Value>) -> Result<Option<Row>> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    fn extended(&self) -> Option<&dyn ExtendedCatalog> {
        Some(self)
    }
}

#[async_trait]
impl ExtendedCatalog for SqlServerCatalog {
    async fn current_schema(&self, stmt: &Statement) -> Result<(SchemaRef, String)> {
        Ok(match resolve_schema(stmt) {
            Some((schema, table)) => (SchemaRef::Named(schema), table),
            None => (SchemaRef::CurrentSchema, stmt.table.clone()),
        })
    }

    async fn table_type(&self, stmt: &Statement) -> Result<TableMetadata> {
        let (schema, table) = self.current_schema(stmt).await?;
        self.fetch_table_type(&schema, &table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_named_schema() {
        let (sql, params) = render(TABLE_TYPE_TEMPLATE, &SchemaRef::Named("dbo".into()), "users");
        assert!(sql.contains("t.TABLE_SCHEMA = @P1 AND t.TABLE_NAME = @P2"));
        assert_eq!(params, vec![Value::from("dbo"), Value::from("users")]);
    }

    #[test]
    fn test_render_current_schema() {
        let (sql, params) = render(COLUMNS_TEMPLATE, &SchemaRef::CurrentSchema, "users");
        assert!(sql.contains("c.TABLE_SCHEMA = SCHEMA_NAME() AND c.TABLE_NAME = @P1"));
        assert!(sql.contains("tc.CONSTRAINT_TYPE = 'PRIMARY KEY'"));
        assert!(!sql.contains("{key_exists}"));
        assert_eq!(params, vec![Value::from("users")]);
    }

    #[test]
    fn test_schema_of() {
        assert_eq!(
            schema_of("sales.orders"),
            (SchemaRef::Named("sales".into()), "orders")
        );
        assert_eq!(schema_of("orders"), (SchemaRef::CurrentSchema, "orders"));
    }
}
