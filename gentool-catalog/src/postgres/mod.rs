//! PostgreSQL catalog driver

mod catalog;
mod dsn;
pub mod sql;
mod tls;
mod types;

pub use catalog::PostgresCatalog;
pub use dsn::{parse_config, PgConnectOptions, TlsVerify};
