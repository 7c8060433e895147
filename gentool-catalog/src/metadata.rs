//! Metadata structures read from a live database catalog

use serde::{Deserialize, Serialize};

/// Table type reported for ordinary tables
pub const BASE_TABLE: &str = "BASE TABLE";
/// Table type reported for system catalog tables
pub const SYSTEM_TABLE: &str = "SYSTEM TABLE";
/// Table type reported for views
pub const VIEW: &str = "VIEW";

/// Metadata for a database table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name
    pub name: String,

    /// Schema the table lives in (if the driver reported one)
    pub schema: Option<String>,

    /// Table comment (if any)
    pub comment: Option<String>,

    /// Relation kind as reported by the catalog, e.g. "BASE TABLE"
    pub table_type: String,
}

impl TableMetadata {
    /// An ordinary table with no schema and no comment
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            comment: None,
            table_type: BASE_TABLE.to_string(),
        }
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the schema
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Classify the reported table type
    pub fn kind(&self) -> TableKind {
        TableKind::from_table_type(&self.table_type)
    }

    /// The comment, or `""` when there is none
    pub fn comment_or_empty(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

/// Relation kinds the generator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    Base,
    System,
    View,
    Other,
}

impl TableKind {
    pub fn from_table_type(table_type: &str) -> Self {
        match table_type {
            BASE_TABLE => TableKind::Base,
            SYSTEM_TABLE => TableKind::System,
            VIEW => TableKind::View,
            _ => TableKind::Other,
        }
    }
}

/// Metadata for a column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,

    /// Driver-reported type name without modifiers (e.g., "varchar", "jsonb")
    pub database_type: String,

    /// Full column type (e.g., "varchar(255)")
    pub column_type: String,

    /// Whether the column is nullable
    pub nullable: bool,

    /// Whether the column is part of the primary key
    pub primary_key: bool,

    /// Whether the column carries its own unique constraint
    pub unique: bool,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Column comment (if any)
    pub comment: Option<String>,
}

impl ColumnMetadata {
    /// Key role of the column. Primary wins over unique.
    pub fn key_role(&self) -> KeyRole {
        if self.primary_key {
            KeyRole::Primary
        } else if self.unique {
            KeyRole::Unique
        } else {
            KeyRole::None
        }
    }

    /// Whether `name` equals the driver type name or the full column type
    pub fn has_type(&self, name: &str) -> bool {
        self.database_type == name || self.column_type == name
    }
}

/// Key role shown in the `pk/uk` column of a table listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyRole {
    None,
    Primary,
    Unique,
}

impl KeyRole {
    pub fn label(&self) -> &'static str {
        match self {
            KeyRole::None => "",
            KeyRole::Primary => "pk",
            KeyRole::Unique => "uk",
        }
    }
}

/// A table together with its ordered columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: TableMetadata,
    pub columns: Vec<ColumnMetadata>,
}

impl TableSchema {
    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the primary key columns, in column order
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}
