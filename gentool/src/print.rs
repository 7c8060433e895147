//! Human and machine readable catalog listings

use comfy_table::{presets::ASCII_FULL, Table};
use gentool_catalog::{Catalog, ColumnMetadata};
use serde::Serialize;
use tracing::warn;

use crate::config::tables;
use crate::error::{GenError, Result};
use crate::introspect::{describe_columns, describe_table};

/// One line of a table listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableListing {
    pub table_name: String,
    pub comment: String,
}

/// One line of a column listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnListing {
    pub field: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub null: bool,
    #[serde(rename = "pk/uk")]
    pub key: String,
    pub default: String,
    pub comment: String,
}

impl From<&ColumnMetadata> for ColumnListing {
    fn from(column: &ColumnMetadata) -> Self {
        Self {
            field: column.name.clone(),
            column_type: column.column_type.clone(),
            null: column.nullable,
            key: column.key_role().label().to_string(),
            default: column.default_value.clone().unwrap_or_default(),
            comment: column.comment.clone().unwrap_or_default(),
        }
    }
}

/// Description of a single table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescription {
    pub table_name: String,
    pub comment: String,
    pub columns: Vec<ColumnListing>,
}

async fn comment_of(catalog: &dyn Catalog, table: &str) -> String {
    match describe_table(catalog, table).await {
        Ok(meta) => meta.comment_or_empty().to_string(),
        Err(e) => {
            warn!(table, error = %e, "table comment lookup failed");
            String::new()
        }
    }
}

/// Catalog tables allowed by `include` and not denied by `exclude`, with
/// their comments.
pub async fn list_tables(
    catalog: &dyn Catalog,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<TableListing>> {
    let all = catalog.get_tables().await?;
    let mut listings = Vec::new();
    for name in tables::select_for_display(include, exclude, &all) {
        let comment = comment_of(catalog, &name).await;
        listings.push(TableListing {
            table_name: name,
            comment,
        });
    }
    Ok(listings)
}

/// Columns of `name`, which must exist in the catalog.
pub async fn describe_listing(catalog: &dyn Catalog, name: &str) -> Result<TableDescription> {
    let all = catalog.get_tables().await?;
    let table = if all.iter().any(|t| t == name) {
        name
    } else if all.iter().any(|t| t == name.trim()) {
        name.trim()
    } else {
        return Err(GenError::TableNotFound(name.to_string()));
    };

    let comment = comment_of(catalog, table).await;
    let columns = describe_columns(catalog, table).await?;
    Ok(TableDescription {
        table_name: table.to_string(),
        comment,
        columns: columns.iter().map(ColumnListing::from).collect(),
    })
}

pub fn render_tables(listings: &[TableListing]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec!["table_name", "comment"]);
    for listing in listings {
        table.add_row(vec![listing.table_name.as_str(), listing.comment.as_str()]);
    }
    table.to_string()
}

pub fn render_description(description: &TableDescription) -> String {
    let header = if description.comment.is_empty() {
        description.table_name.clone()
    } else {
        format!("{} -- {}", description.table_name, description.comment)
    };

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec!["field", "type", "null", "pk/uk", "default", "comment"]);
    for column in &description.columns {
        table.add_row(vec![
            column.field.clone(),
            column.column_type.clone(),
            column.null.to_string(),
            column.key.clone(),
            column.default.clone(),
            column.comment.clone(),
        ]);
    }
    format!("{}\n{}", header, table)
}

/// Print the table listing to stdout.
pub async fn print_tables(
    catalog: &dyn Catalog,
    include: &[String],
    exclude: &[String],
    json: bool,
) -> Result<()> {
    let listings = list_tables(catalog, include, exclude).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else {
        println!("{}", render_tables(&listings));
    }
    Ok(())
}

/// Print the column listing of `name` to stdout.
pub async fn print_table(catalog: &dyn Catalog, name: &str, json: bool) -> Result<()> {
    let description = describe_listing(catalog, name).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&description)?);
    } else {
        println!("{}", render_description(&description));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gentool_catalog::SqliteCatalog;
    use rusqlite::Connection;

    fn catalog() -> SqliteCatalog {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                nickname TEXT DEFAULT 'anon'
            );
            CREATE TABLE audit_log (id INTEGER PRIMARY KEY, line TEXT);
            CREATE TABLE sessions (token TEXT PRIMARY KEY);",
        )
        .unwrap();
        SqliteCatalog::from_connection(conn)
    }

    fn names(listings: &[TableListing]) -> Vec<&str> {
        listings.iter().map(|l| l.table_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_tables_sorted_and_filtered() {
        let catalog = catalog();
        let all = list_tables(&catalog, &[], &[]).await.unwrap();
        assert_eq!(names(&all), vec!["audit_log", "sessions", "users"]);

        let some = list_tables(&catalog, &[], &["sessions".to_string()]).await.unwrap();
        assert_eq!(names(&some), vec!["audit_log", "users"]);

        let only = list_tables(&catalog, &["users".to_string(), "missing".to_string()], &[])
            .await
            .unwrap();
        assert_eq!(names(&only), vec!["users"]);
        assert_eq!(only[0].comment, "");
    }

    #[tokio::test]
    async fn test_describe_listing_rows() {
        let catalog = catalog();
        let description = describe_listing(&catalog, " users ").await.unwrap();
        assert_eq!(description.table_name, "users");

        let id = &description.columns[0];
        assert_eq!(id.field, "id");
        assert_eq!(id.key, "pk");
        assert!(!id.null);

        let email = &description.columns[1];
        assert_eq!(email.column_type, "VARCHAR(255)");
        assert_eq!(email.key, "uk");

        let nickname = &description.columns[2];
        assert!(nickname.null);
        assert_eq!(nickname.key, "");
        assert_eq!(nickname.default, "'anon'");
    }

    #[tokio::test]
    async fn test_describe_unknown_table() {
        let catalog = catalog();
        let err = describe_listing(&catalog, "nope").await.unwrap_err();
        assert!(matches!(err, GenError::TableNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_render_description_header() {
        let mut description = TableDescription {
            table_name: "users".into(),
            comment: String::new(),
            columns: Vec::new(),
        };
        assert!(render_description(&description).starts_with("users\n"));

        description.comment = "registered users".into();
        let out = render_description(&description);
        assert!(out.starts_with("users -- registered users\n"));
        assert!(out.contains("pk/uk"));
    }

    #[test]
    fn test_render_tables() {
        let out = render_tables(&[TableListing {
            table_name: "users".into(),
            comment: "accounts".into(),
        }]);
        assert!(out.contains("table_name"));
        assert!(out.contains("users"));
        assert!(out.contains("accounts"));
    }

    #[test]
    fn test_json_field_names() {
        let column = ColumnListing {
            field: "id".into(),
            column_type: "int".into(),
            null: false,
            key: "pk".into(),
            default: String::new(),
            comment: String::new(),
        };
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "int");
        assert_eq!(json["pk/uk"], "pk");
    }
}
