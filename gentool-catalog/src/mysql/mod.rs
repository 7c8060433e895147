//! MySQL catalog driver

mod catalog;
mod dsn;
mod types;

pub use catalog::MySqlCatalog;
pub use dsn::parse_dsn;
