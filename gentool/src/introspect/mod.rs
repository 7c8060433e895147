//! Schema introspection over any [`Catalog`]
//!
//! Table lookups go through the first applicable path:
//!
//! 1. the catalog's [`ExtendedCatalog`] capability, when it has one;
//! 2. for PostgreSQL-flavoured catalogs without it, the raw `pg_tables` and
//!    `obj_description` queries run through [`Catalog::query_row`];
//! 3. otherwise [`Catalog::table_type`].

use gentool_catalog::postgres::sql::fetch_table_type;
use gentool_catalog::{
    resolve_schema, Catalog, ColumnMetadata, Dialect, SchemaRef, Statement, TableMetadata,
    TableSchema,
};
use tracing::debug;

use crate::error::Result;

/// Kind, schema and comment of `table`.
pub async fn describe_table(catalog: &dyn Catalog, table: &str) -> Result<TableMetadata> {
    if let Some(extended) = catalog.extended() {
        debug!(table, dialect = %catalog.dialect(), "describing table via extended catalog");
        let stmt = extended.statement(table);
        return Ok(extended.table_type(&stmt).await?);
    }

    let stmt = Statement::new(table).with_table_expr(catalog.table_expr());
    let explicit = resolve_schema(&stmt);

    if catalog.dialect() == Dialect::Postgres {
        let (schema, name) = match explicit {
            Some((schema, name)) => (SchemaRef::Named(schema), name),
            None => (SchemaRef::CurrentSchema, stmt.table.clone()),
        };
        debug!(table = %name, schema = ?schema.name(), "describing table via pg catalog queries");
        return Ok(fetch_table_type(catalog, &schema, &name).await?);
    }

    let (schema, name) = match explicit {
        Some(pair) => pair,
        None => (catalog.current_database().await?, stmt.table.clone()),
    };
    let qualified = if schema.is_empty() {
        name
    } else {
        format!("{}.{}", schema, name)
    };
    debug!(table = %qualified, "describing table via common catalog interface");
    Ok(catalog.table_type(&qualified).await?)
}

/// Ordered column metadata of `table`.
pub async fn describe_columns(catalog: &dyn Catalog, table: &str) -> Result<Vec<ColumnMetadata>> {
    Ok(catalog.column_types(table).await?)
}

/// Table and column metadata of `table`.
pub async fn describe(catalog: &dyn Catalog, table: &str) -> Result<TableSchema> {
    let table_meta = describe_table(catalog, table).await?;
    let columns = describe_columns(catalog, table).await?;
    Ok(TableSchema {
        table: table_meta,
        columns,
    })
}

/// Unescape doubled braces in a comment. Only applies when both `{{` and
/// `}}` are present.
pub fn normalize_comment(comment: &str) -> String {
    if comment.contains("{{") && comment.contains("}}") {
        comment.replace("{{", "{").replace("}}", "}")
    } else {
        comment.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gentool_catalog::{Error, ExtendedCatalog, Row, Value};
    use std::sync::Mutex;

    /// Records every call; answers pg catalog queries from canned rows.
    #[derive(Default)]
    struct FakeCatalog {
        dialect: Dialect,
        table_expr: Option<String>,
        with_extended: bool,
        comment_row: bool,
        calls: Mutex<Vec<String>>,
        queries: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl FakeCatalog {
        fn new(dialect: Dialect) -> Self {
            Self {
                dialect,
                comment_row: true,
                ..Default::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        fn dialect(&self) -> Dialect {
            self.dialect.clone()
        }

        async fn get_tables(&self) -> gentool_catalog::Result<Vec<String>> {
            Ok(vec!["users".into()])
        }

        async fn current_database(&self) -> gentool_catalog::Result<String> {
            self.record("current_database");
            Ok("shop".into())
        }

        async fn table_type(&self, table: &str) -> gentool_catalog::Result<TableMetadata> {
            self.record(format!("table_type:{}", table));
            Ok(TableMetadata::new(table).with_comment("common"))
        }

        async fn column_types(&self, table: &str) -> gentool_catalog::Result<Vec<ColumnMetadata>> {
            self.record(format!("column_types:{}", table));
            Ok(vec![ColumnMetadata {
                name: "id".into(),
                primary_key: true,
                ..Default::default()
            }])
        }

        async fn query_row(
            &self,
            sql: &str,
            params: Vec<Value>,
        ) -> gentool_catalog::Result<Option<Row>> {
            self.queries
                .lock()
                .unwrap()
                .push((sql.to_string(), params.clone()));
            if sql.contains("pg_tables") {
                let schema = match params.len() {
                    2 => params[0].clone(),
                    _ => Value::from("public"),
                };
                let table = params.last().cloned().unwrap_or(Value::Null);
                return Ok(Some(Row::new(
                    vec!["schemaname".into(), "tablename".into(), "case".into()],
                    vec![schema, table, Value::from("BASE TABLE")],
                )));
            }
            if self.comment_row {
                Ok(Some(Row::new(
                    vec!["table_comment".into()],
                    vec![Value::from("orders of the shop")],
                )))
            } else {
                Ok(None)
            }
        }

        fn table_expr(&self) -> Option<&str> {
            self.table_expr.as_deref()
        }

        fn extended(&self) -> Option<&dyn ExtendedCatalog> {
            if self.with_extended {
                Some(self)
            } else {
                None
            }
        }
    }

    #[async_trait]
    impl ExtendedCatalog for FakeCatalog {
        async fn current_schema(
            &self,
            stmt: &Statement,
        ) -> gentool_catalog::Result<(SchemaRef, String)> {
            Ok((SchemaRef::Named("ext".into()), stmt.table.clone()))
        }

        async fn table_type(&self, stmt: &Statement) -> gentool_catalog::Result<TableMetadata> {
            self.record(format!("extended:{}", stmt.table));
            Ok(TableMetadata::new(stmt.table.clone()).with_comment("from capability"))
        }
    }

    #[tokio::test]
    async fn test_extended_capability_wins() {
        let catalog = FakeCatalog {
            with_extended: true,
            ..FakeCatalog::new(Dialect::Postgres)
        };
        let table = describe_table(&catalog, "orders").await.unwrap();
        assert_eq!(table.comment.as_deref(), Some("from capability"));
        assert_eq!(catalog.calls(), vec!["extended:orders"]);
        assert!(catalog.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pg_generic_current_schema() {
        let catalog = FakeCatalog::new(Dialect::Postgres);
        let table = describe_table(&catalog, "orders").await.unwrap();
        assert_eq!(table.name, "orders");
        assert_eq!(table.schema.as_deref(), Some("public"));
        assert_eq!(table.table_type, "BASE TABLE");
        assert_eq!(table.comment.as_deref(), Some("orders of the shop"));

        let queries = catalog.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].0.contains("schemaname = CURRENT_SCHEMA()"));
        assert_eq!(queries[0].1, vec![Value::from("orders")]);
        assert!(queries[1].0.contains("obj_description"));
        // the current database is never consulted on this path
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pg_generic_qualified_name() {
        let catalog = FakeCatalog::new(Dialect::Postgres);
        let table = describe_table(&catalog, "sales.orders").await.unwrap();
        assert_eq!(table.schema.as_deref(), Some("sales"));
        assert_eq!(table.name, "orders");
        let queries = catalog.queries.lock().unwrap();
        assert_eq!(queries[1].1, vec![Value::from("sales"), Value::from("orders")]);
    }

    #[tokio::test]
    async fn test_pg_generic_table_expr() {
        let catalog = FakeCatalog {
            table_expr: Some("\"sales\".\"orders\"".into()),
            ..FakeCatalog::new(Dialect::Postgres)
        };
        let table = describe_table(&catalog, "orders").await.unwrap();
        assert_eq!(table.schema.as_deref(), Some("sales"));
    }

    #[tokio::test]
    async fn test_pg_generic_missing_comment_row_is_an_error() {
        let catalog = FakeCatalog {
            comment_row: false,
            ..FakeCatalog::new(Dialect::Postgres)
        };
        let err = describe_table(&catalog, "orders").await.unwrap_err();
        assert!(matches!(
            err,
            crate::GenError::Introspection(Error::NoRows(_))
        ));
    }

    #[tokio::test]
    async fn test_common_path_uses_current_database() {
        let catalog = FakeCatalog::new(Dialect::MySql);
        let table = describe_table(&catalog, "users").await.unwrap();
        assert_eq!(table.comment.as_deref(), Some("common"));
        assert_eq!(
            catalog.calls(),
            vec!["current_database", "table_type:shop.users"]
        );
        assert!(catalog.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_common_path_qualified_name() {
        let catalog = FakeCatalog::new(Dialect::Sqlite);
        describe_table(&catalog, "main.users").await.unwrap();
        assert_eq!(catalog.calls(), vec!["table_type:main.users"]);
    }

    #[tokio::test]
    async fn test_describe() {
        let catalog = FakeCatalog::new(Dialect::MySql);
        let schema = describe(&catalog, "users").await.unwrap();
        assert_eq!(schema.table.name, "shop.users");
        assert_eq!(schema.primary_key_columns(), vec!["id"]);
        assert_eq!(catalog.calls().last().unwrap(), "column_types:users");
    }

    #[test]
    fn test_normalize_comment() {
        assert_eq!(normalize_comment("map {{a}} to b"), "map {a} to b");
        assert_eq!(normalize_comment("only {{ open"), "only {{ open");
        assert_eq!(normalize_comment("plain"), "plain");
    }
}
