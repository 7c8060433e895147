//! PostgreSQL catalog backed by a single tokio-postgres client

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::metadata::{ColumnMetadata, TableMetadata};
use crate::row::Row;
use crate::traits::{
    resolve_schema, split_qualified, Catalog, ExtendedCatalog, SchemaRef, Statement,
};
use crate::value::Value;
use async_trait::async_trait;
use std::future::Future;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use super::dsn::parse_config;
use super::sql::fetch_table_type;
use super::tls::connector;
use super::types::{from_pg_row, to_pg_param, PgParam};

const TABLES_SQL: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = CURRENT_SCHEMA() AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

const TABLE_TYPE_SQL: &str = "SELECT t.table_schema::text, t.table_name::text, t.table_type::text, \
     obj_description(cls.oid, 'pg_class') \
     FROM information_schema.tables t \
     JOIN pg_namespace ns ON ns.nspname = t.table_schema \
     JOIN pg_class cls ON cls.relname = t.table_name AND cls.relnamespace = ns.oid \
     WHERE t.table_schema = COALESCE($1::text, CURRENT_SCHEMA()) AND t.table_name = $2::text";

const COLUMNS_SQL: &str = "SELECT c.column_name::text, c.udt_name::text, \
     format_type(a.atttypid, a.atttypmod), \
     c.is_nullable = 'YES', \
     EXISTS (SELECT 1 FROM pg_constraint con \
             WHERE con.conrelid = cls.oid AND con.contype = 'p' AND a.attnum = ANY(con.conkey)), \
     EXISTS (SELECT 1 FROM pg_constraint con \
             WHERE con.conrelid = cls.oid AND con.contype = 'u' AND con.conkey = ARRAY[a.attnum]), \
     c.column_default::text, \
     col_description(cls.oid, a.attnum) \
     FROM information_schema.columns c \
     JOIN pg_namespace ns ON ns.nspname = c.table_schema \
     JOIN pg_class cls ON cls.relname = c.table_name AND cls.relnamespace = ns.oid \
     JOIN pg_attribute a ON a.attrelid = cls.oid AND a.attname = c.column_name \
     WHERE c.table_schema = COALESCE($1::text, CURRENT_SCHEMA()) AND c.table_name = $2::text \
     ORDER BY c.ordinal_position";

/// The connection object drives the socket and must be polled on its own task
fn spawn_connection<F>(connection: F)
where
    F: Future<Output = std::result::Result<(), tokio_postgres::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!(error = %e, "PostgreSQL connection error");
        }
    });
}

/// A PostgreSQL catalog.
///
/// Besides the common [`Catalog`] queries this driver answers
/// [`ExtendedCatalog`] lookups, so schema-qualified names and a session
/// table expression resolve the way PostgreSQL users expect.
///
/// # Example
///
/// ```ignore
/// use gentool_catalog::{Catalog, PostgresCatalog};
///
/// let catalog = PostgresCatalog::connect("host=localhost user=postgres dbname=test").await?;
/// let orders = catalog.table_type("sales.orders").await?;
/// ```
pub struct PostgresCatalog {
    client: Client,
    table_expr: Option<String>,
}

impl PostgresCatalog {
    /// Connect using a key=value DSN.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let options = parse_config(dsn)?;
        debug!(sslmode = ?options.verify, "connecting to PostgreSQL");
        let client = match connector(&options)? {
            Some(tls) => {
                let (client, connection) = options.config.connect(tls).await?;
                spawn_connection(connection);
                client
            }
            None => {
                let (client, connection) = options.config.connect(NoTls).await?;
                spawn_connection(connection);
                client
            }
        };

        Ok(Self {
            client,
            table_expr: None,
        })
    }

    /// Set the quoted table expression used to resolve schemas,
    /// e.g. `"sales"."orders"`.
    pub fn with_table_expr(mut self, expr: impl Into<String>) -> Self {
        self.table_expr = Some(expr.into());
        self
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let boxed: Vec<PgParam> = params.iter().map(to_pg_param).collect::<Result<_>>()?;
        let refs: Vec<&(dyn ToSql + Sync)> = boxed
            .iter()
            .map(|p| &**p as &(dyn ToSql + Sync))
            .collect();
        let rows = self.client.query(sql, &refs).await?;
        rows.iter().map(from_pg_row).collect()
    }
}

#[async_trait]
impl Catalog for PostgresCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn get_tables(&self) -> Result<Vec<String>> {
        self.fetch_all(TABLES_SQL, &[])
            .await?
            .iter()
            .map(|row| row.get_at::<String>(0))
            .collect()
    }

    async fn current_database(&self) -> Result<String> {
        let row = self
            .query_row("SELECT CURRENT_DATABASE()::text", Vec::new())
            .await?
            .ok_or_else(|| Error::NoRows("SELECT CURRENT_DATABASE()".to_string()))?;
        row.get_at(0)
    }

    async fn table_type(&self, table: &str) -> Result<TableMetadata> {
        let (schema, name) = split_qualified(table);
        let row = self
            .query_row(
                TABLE_TYPE_SQL,
                vec![Value::from(schema), Value::from(name)],
            )
            .await?
            .ok_or_else(|| Error::NoRows(format!("table {} not found", table)))?;
        Ok(TableMetadata {
            schema: row.get_at(0)?,
            name: row.get_at(1)?,
            table_type: row.get_at(2)?,
            comment: row.get_at(3)?,
        })
    }

    async fn column_types(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        let (schema, name) = split_qualified(table);
        debug!(table = name, schema = ?schema, "reading PostgreSQL columns");
        let rows = self
            .fetch_all(COLUMNS_SQL, &[Value::from(schema), Value::from(name)])
            .await?;
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
        Ok(self.fetch_all(sql, &params).await?.into_iter().next())
    }

    fn table_expr(&self) -> Option<&str> {
        self.table_expr.as_deref()
    }

    fn extended(&self) -> Option<&dyn ExtendedCatalog> {
        Some(self)
    }
}

#[async_trait]
impl ExtendedCatalog for PostgresCatalog {
    fn statement(&self, table: &str) -> Statement {
        Statement::new(table).with_table_expr(self.table_expr.as_deref())
    }

    async fn current_schema(&self, stmt: &Statement) -> Result<(SchemaRef, String)> {
        Ok(match resolve_schema(stmt) {
            Some((schema, table)) => (SchemaRef::Named(schema), table),
            None => (SchemaRef::CurrentSchema, stmt.table.clone()),
        })
    }

    async fn table_type(&self, stmt: &Statement) -> Result<TableMetadata> {
        let (schema, table) = self.current_schema(stmt).await?;
        debug!(table = %table, schema = ?schema.name(), "reading PostgreSQL table kind");
        fetch_table_type(self, &schema, &table).await
    }
}
