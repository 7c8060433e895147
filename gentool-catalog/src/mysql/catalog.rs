//! MySQL catalog backed by a mysql_async pool

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::metadata::{ColumnMetadata, TableMetadata};
use crate::row::Row;
use crate::traits::{split_qualified, Catalog};
use crate::value::Value;
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Pool as MysqlAsyncPool, Row as MySqlAsyncRow};
use tracing::debug;

use super::dsn::parse_dsn;
use super::types::{from_mysql_row, to_mysql_value};

const TABLES_SQL: &str = "SELECT TABLE_NAME FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME";

const TABLE_TYPE_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE, TABLE_COMMENT \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = COALESCE(?, DATABASE()) AND TABLE_NAME = ?";

const COLUMNS_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, COLUMN_TYPE, IS_NULLABLE, COLUMN_KEY, \
     COLUMN_DEFAULT, COLUMN_COMMENT \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = COALESCE(?, DATABASE()) AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

/// A MySQL catalog.
///
/// Cloning is cheap: the inner pool is `Arc`-backed.
///
/// # Example
///
/// ```ignore
/// use gentool_catalog::{Catalog, MySqlCatalog};
///
/// let catalog = MySqlCatalog::connect("root:secret@tcp(127.0.0.1:3306)/shop").await?;
/// let tables = catalog.get_tables().await?;
/// ```
#[derive(Clone)]
pub struct MySqlCatalog {
    inner: MysqlAsyncPool,
}

impl MySqlCatalog {
    /// Create a pool from a DSN and check that a connection can be made.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let opts = parse_dsn(dsn)?;
        let inner = MysqlAsyncPool::new(opts);
        // Fail fast on bad credentials instead of at the first catalog query
        drop(inner.get_conn().await?);
        Ok(Self { inner })
    }

    async fn fetch_all(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let mut conn = self.inner.get_conn().await?;
        let mysql_params: Vec<mysql_async::Value> = params.iter().map(to_mysql_value).collect();
        let rows: Vec<MySqlAsyncRow> = conn.exec(sql, mysql_params).await?;
        rows.into_iter().map(from_mysql_row).collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait]
impl Catalog for MySqlCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
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
            .query_row("SELECT DATABASE()", Vec::new())
            .await?
            .ok_or_else(|| Error::NoRows("SELECT DATABASE()".to_string()))?;
        Ok(row.get_at::<Option<String>>(0)?.unwrap_or_default())
    }

    async fn table_type(&self, table: &str) -> Result<TableMetadata> {
        let (schema, name) = split_qualified(table);
        let row = self
            .query_row(TABLE_TYPE_SQL, vec![Value::from(schema), Value::from(name)])
            .await?
            .ok_or_else(|| Error::NoRows(format!("table {} not found", table)))?;
        Ok(TableMetadata {
            schema: row.get_at(0)?,
            name: row.get_at(1)?,
            table_type: row.get_at(2)?,
            comment: non_empty(row.get_at(3)?),
        })
    }

    async fn column_types(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        let (schema, name) = split_qualified(table);
        debug!(table = name, schema = ?schema, "reading MySQL columns");
        let rows = self
            .fetch_all(COLUMNS_SQL, vec![Value::from(schema), Value::from(name)])
            .await?;
        rows.iter()
            .map(|row| {
                let key: String = row.get_at(4)?;
                Ok(ColumnMetadata {
                    name: row.get_at(0)?,
                    database_type: row.get_at(1)?,
                    column_type: row.get_at(2)?,
                    nullable: row.get_at(3)?,
                    primary_key: key == "PRI",
                    unique: key == "UNI",
                    default_value: row.get_at(5)?,
                    comment: non_empty(row.get_at(6)?),
                })
            })
            .collect()
    }

    async fn query_row(&self, sql: &str, params: Vec<Value>) -> Result<Option<Row>> {
        let mut conn = self.inner.get_conn().await?;
        let mysql_params: Vec<mysql_async::Value> = params.iter().map(to_mysql_value).collect();
        let row: Option<MySqlAsyncRow> = conn.exec_first(sql, mysql_params).await?;
        row.map(from_mysql_row).transpose()
    }
}
