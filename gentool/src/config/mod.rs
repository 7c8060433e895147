//! Configuration for gentool

pub mod defaults;
pub mod dsn;
mod file;
mod mode;
mod settings;
pub mod tables;
mod type_mapping;

pub use file::{load_config, save_config, ConfigFile};
pub use mode::GenerateMode;
pub use settings::{ConfigParams, FieldOptions, Overrides, Profile, ResolvedConfig};
pub use type_mapping::{TypeMapping, TypeRule};
