//! Core traits for gentool-catalog

mod catalog;
mod extended;
mod from_value;

pub use catalog::Catalog;
pub use extended::{resolve_schema, split_qualified, ExtendedCatalog, SchemaRef, Statement};
pub use from_value::FromValue;
