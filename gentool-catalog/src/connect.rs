//! Open a catalog for a dialect

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::mysql::MySqlCatalog;
use crate::postgres::PostgresCatalog;
use crate::sqlite::SqliteCatalog;
use crate::sqlserver::SqlServerCatalog;
use crate::traits::Catalog;
use tracing::debug;

/// Open a catalog connection for `dialect` using a canonical DSN.
///
/// `clickhouse` is a known dialect without a built-in driver and fails with
/// [`Error::DriverUnavailable`]; any other unknown tag fails with
/// [`Error::UnsupportedDialect`].
pub async fn connect(dialect: &Dialect, dsn: &str) -> Result<Box<dyn Catalog>> {
    if dsn.is_empty() {
        return Err(Error::InvalidDsn("dsn cannot be empty".to_string()));
    }
    debug!(dialect = %dialect, "opening catalog connection");
    match dialect {
        Dialect::MySql => Ok(Box::new(MySqlCatalog::connect(dsn).await?)),
        Dialect::Postgres => Ok(Box::new(PostgresCatalog::connect(dsn).await?)),
        Dialect::Sqlite => Ok(Box::new(SqliteCatalog::open(dsn)?)),
        Dialect::SqlServer => Ok(Box::new(SqlServerCatalog::connect(dsn).await?)),
        Dialect::ClickHouse => Err(Error::DriverUnavailable(dialect.to_string())),
        Dialect::Other(tag) => Err(Error::UnsupportedDialect(tag.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_dsn() {
        let err = connect(&Dialect::MySql, "").await.err().unwrap();
        assert!(matches!(err, Error::InvalidDsn(msg) if msg == "dsn cannot be empty"));
    }

    #[tokio::test]
    async fn test_unknown_dialect() {
        let err = connect(&Dialect::from_tag("oracle"), "x").await.err().unwrap();
        assert!(matches!(err, Error::UnsupportedDialect(tag) if tag == "oracle"));
    }

    #[tokio::test]
    async fn test_clickhouse_has_no_driver() {
        let err = connect(&Dialect::ClickHouse, "tcp://127.0.0.1:9000")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::DriverUnavailable(_)));
    }

    #[tokio::test]
    async fn test_sqlite_in_memory() {
        let catalog = connect(&Dialect::Sqlite, "file::memory:").await.unwrap();
        assert_eq!(catalog.dialect(), Dialect::Sqlite);
        assert!(catalog.get_tables().await.unwrap().is_empty());
    }
}
