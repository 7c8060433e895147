//! SQLite catalog over a single rusqlite connection

use std::sync::Mutex;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::metadata::{ColumnMetadata, TableMetadata, BASE_TABLE, VIEW};
use crate::row::Row;
use crate::traits::{split_qualified, Catalog};
use crate::value::Value;
use async_trait::async_trait;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

const TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

const TABLE_TYPE_SQL: &str = "SELECT type, name FROM sqlite_master \
     WHERE type IN ('table', 'view') AND name = ?1";

const COLUMNS_SQL: &str = "SELECT name, type, \"notnull\", dflt_value, pk \
     FROM pragma_table_info(?1) ORDER BY cid";

// Columns covered by a single-column unique index other than the primary key
const UNIQUE_COLUMNS_SQL: &str = "SELECT ii.name \
     FROM pragma_index_list(?1) AS il, pragma_index_info(il.name) AS ii \
     WHERE il.\"unique\" = 1 AND il.origin != 'pk' \
     AND (SELECT COUNT(*) FROM pragma_index_info(il.name)) = 1";

/// Name SQLite gives the primary database of a connection
const MAIN_SCHEMA: &str = "main";

/// A SQLite catalog.
///
/// All calls run synchronously on the caller's task; the connection is
/// guarded by a mutex so the catalog can be shared.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open a database. URI DSNs (`file:./test.db?mode=rwc`) are accepted.
    pub fn open(dsn: &str) -> Result<Self> {
        info!(path = %dsn, "opening SQLite database");
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(dsn, flags)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::Query("SQLite connection mutex poisoned".to_string()))?;
        f(&conn)
    }

    fn table_type_sync(&self, table: &str) -> Result<TableMetadata> {
        let (_, name) = split_qualified(table);
        let row = self.with_conn(|conn| {
            let mut stmt = conn.prepare(TABLE_TYPE_SQL)?;
            let row = stmt
                .query_row([name], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))
                .optional()?;
            Ok(row)
        })?;
        let (kind, name) = row.ok_or_else(|| Error::NoRows(format!("table {} not found", table)))?;
        let table_type = if kind == "view" { VIEW } else { BASE_TABLE };
        Ok(TableMetadata {
            name,
            schema: Some(MAIN_SCHEMA.to_string()),
            // SQLite has no table comments
            comment: None,
            table_type: table_type.to_string(),
        })
    }

    fn column_types_sync(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        let (_, name) = split_qualified(table);
        debug!(table = name, "reading SQLite columns");
        self.with_conn(|conn| {
            let mut unique_stmt = conn.prepare(UNIQUE_COLUMNS_SQL)?;
            let unique: Vec<String> = unique_stmt
                .query_map([name], |r| r.get::<_, String>(0))?
                .collect::<rusqlite::Result<_>>()?;

            let mut stmt = conn.prepare(COLUMNS_SQL)?;
            let columns = stmt
                .query_map([name], |r| {
                    let column_name: String = r.get(0)?;
                    let declared: String = r.get(1)?;
                    let not_null: i64 = r.get(2)?;
                    let pk: i64 = r.get(4)?;
                    Ok(ColumnMetadata {
                        unique: unique.contains(&column_name),
                        name: column_name,
                        database_type: base_type(&declared),
                        column_type: declared,
                        nullable: not_null == 0 && pk == 0,
                        primary_key: pk > 0,
                        default_value: r.get(3)?,
                        comment: None,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(columns)
        })
    }

    fn query_row_sync(&self, sql: &str, params: Vec<Value>) -> Result<Option<Row>> {
        let params: Vec<SqliteValue> = params.into_iter().map(to_sqlite_value).collect();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            match rows.next()? {
                Some(row) => {
                    let values = (0..columns.len())
                        .map(|i| row.get_ref(i).map(from_value_ref))
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    Ok(Some(Row::new(columns, values)))
                }
                None => Ok(None),
            }
        })
    }
}

/// Declared type without size modifiers, e.g. `VARCHAR(64)` -> `VARCHAR`
fn base_type(declared: &str) -> String {
    declared
        .split('(')
        .next()
        .unwrap_or(declared)
        .trim()
        .to_string()
}

fn to_sqlite_value(value: Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(v) => SqliteValue::Integer(i64::from(v)),
        Value::I64(v) => SqliteValue::Integer(v),
        // SQLite integers are signed; larger values are stored as text
        Value::U64(v) => match i64::try_from(v) {
            Ok(v) => SqliteValue::Integer(v),
            Err(_) => SqliteValue::Text(v.to_string()),
        },
        Value::F64(v) => SqliteValue::Real(v),
        Value::String(v) => SqliteValue::Text(v),
        Value::Bytes(v) => SqliteValue::Blob(v),
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::I64(i),
        ValueRef::Real(f) => Value::F64(f),
        ValueRef::Text(s) => Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn get_tables(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(TABLES_SQL)?;
            let names = stmt
                .query_map([], |r| r.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(names)
        })
    }

    async fn current_database(&self) -> Result<String> {
        Ok(MAIN_SCHEMA.to_string())
    }

    async fn table_type(&self, table: &str) -> Result<TableMetadata> {
        self.table_type_sync(table)
    }

    async fn column_types(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        self.column_types_sync(table)
    }

    async fn query_row(&self, sql: &str, params: Vec<Value>) -> Result<Option<Row>> {
        self.query_row_sync(sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SqliteCatalog {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name VARCHAR(64) DEFAULT 'anon',
                org_id INTEGER,
                UNIQUE (name, org_id)
            );
            CREATE TABLE posts (id INTEGER PRIMARY KEY, body TEXT);
            CREATE VIEW user_emails AS SELECT email FROM users;",
        )
        .unwrap();
        SqliteCatalog::from_connection(conn)
    }

    #[tokio::test]
    async fn test_get_tables_excludes_views() {
        let catalog = catalog();
        assert_eq!(catalog.get_tables().await.unwrap(), vec!["posts", "users"]);
        assert_eq!(catalog.current_database().await.unwrap(), "main");
    }

    #[tokio::test]
    async fn test_table_type() {
        let catalog = catalog();
        let users = catalog.table_type("main.users").await.unwrap();
        assert_eq!(users.name, "users");
        assert_eq!(users.table_type, BASE_TABLE);
        assert_eq!(users.comment, None);
        let view = catalog.table_type("user_emails").await.unwrap();
        assert_eq!(view.table_type, VIEW);
        assert!(matches!(
            catalog.table_type("missing").await,
            Err(Error::NoRows(_))
        ));
    }

    #[tokio::test]
    async fn test_column_types() {
        let catalog = catalog();
        let columns = catalog.column_types("users").await.unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "name", "org_id"]);

        assert!(columns[0].primary_key);
        assert!(!columns[0].nullable);
        assert!(columns[1].unique);
        assert!(!columns[1].nullable);
        // composite unique constraints do not mark individual columns
        assert!(!columns[2].unique);
        assert_eq!(columns[2].database_type, "VARCHAR");
        assert_eq!(columns[2].column_type, "VARCHAR(64)");
        assert_eq!(columns[2].default_value.as_deref(), Some("'anon'"));
        assert!(columns[3].nullable);
    }

    #[tokio::test]
    async fn test_query_row() {
        let catalog = catalog();
        let row = catalog
            .query_row(
                "SELECT type, name FROM sqlite_master WHERE name = ?1",
                vec![Value::from("posts")],
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.get::<String>("type").unwrap(), "table");
        let none = catalog
            .query_row("SELECT 1 WHERE 0", Vec::new())
            .await
            .unwrap();
        assert!(none.is_none());
    }
}
