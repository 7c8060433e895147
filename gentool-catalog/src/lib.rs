//! gentool-catalog - database catalog access for gentool
//!
//! A thin layer over `mysql_async`, `tokio-postgres`, `rusqlite` and
//! `tiberius` that answers the handful of catalog questions a code
//! generator needs: which tables exist, what kind of relation a table is,
//! what its comment says, and what its columns look like.
//!
//! # Features
//!
//! - **One Catalog trait**: every driver implements [`Catalog`]
//! - **Optional capabilities**: drivers with a richer notion of schemas
//!   expose [`ExtendedCatalog`] through [`Catalog::extended`]
//! - **Dynamic rows**: raw catalog queries return [`Row`] values addressable
//!   by column name
//!
//! # Example
//!
//! ```ignore
//! use gentool_catalog::{connect, Dialect};
//!
//! async fn list(dsn: &str) -> gentool_catalog::Result<()> {
//!     let catalog = connect(&Dialect::Sqlite, dsn).await?;
//!     for table in catalog.get_tables().await? {
//!         let columns = catalog.column_types(&table).await?;
//!         println!("{table}: {} columns", columns.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod connect;
pub mod dialect;
pub mod error;
pub mod metadata;
pub mod mysql;
pub mod postgres;
pub mod row;
pub mod sqlite;
pub mod sqlserver;
pub mod traits;
pub mod value;

// Re-export main types
pub use connect::connect;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use metadata::{ColumnMetadata, KeyRole, TableKind, TableMetadata, TableSchema};
pub use mysql::MySqlCatalog;
pub use postgres::PostgresCatalog;
pub use row::Row;
pub use sqlite::SqliteCatalog;
pub use sqlserver::SqlServerCatalog;
pub use traits::{
    resolve_schema, split_qualified, Catalog, ExtendedCatalog, FromValue, SchemaRef, Statement,
};
pub use value::Value;
