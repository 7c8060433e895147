//! SQL Server catalog driver

mod catalog;
mod dsn;
mod types;

pub use catalog::SqlServerCatalog;
pub use dsn::parse_config;
