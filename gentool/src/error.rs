//! Error types for gentool

use thiserror::Error;

/// Result type alias for gentool operations
pub type Result<T> = std::result::Result<T, GenError>;

/// Errors that can occur while resolving configuration or introspecting
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to database: {0}")]
    Connection(#[source] gentool_catalog::Error),

    #[error("Introspection failed: {0}")]
    Introspection(#[from] gentool_catalog::Error),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for GenError {
    fn from(err: config::ConfigError) -> Self {
        GenError::Config(err.to_string())
    }
}
