//! Error types for gentool-catalog

use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a database catalog
#[derive(Error, Debug)]
pub enum Error {
    /// MySQL driver error
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// PostgreSQL driver error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// SQLite driver error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// SQL Server driver error
    #[error("SQL Server error: {0}")]
    SqlServer(#[from] tiberius::error::Error),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// Transport error while opening a connection
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The dialect tag names no known database
    #[error("unsupported database dialect {0:?} (expected mysql, postgres, sqlite, sqlserver or clickhouse)")]
    UnsupportedDialect(String),

    /// The dialect is known but no driver for it is built in
    #[error("no driver available for dialect {0}")]
    DriverUnavailable(String),

    /// The DSN could not be understood by the driver
    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),

    /// A catalog query that must return a row returned none
    #[error("Query returned no rows: {0}")]
    NoRows(String),

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Query execution error
    #[error("Query error: {0}")]
    Query(String),
}
