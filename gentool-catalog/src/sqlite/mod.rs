//! SQLite catalog driver

mod catalog;

pub use catalog::SqliteCatalog;
