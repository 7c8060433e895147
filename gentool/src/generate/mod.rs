//! Generation driver boundary
//!
//! gentool does not emit code itself. It resolves what to generate and hands
//! the tables to a [`Generator`].

use std::io::Write;
use std::path::{Path, PathBuf};

use gentool_catalog::{Catalog, TableMetadata, TableSchema};
use heck::ToUpperCamelCase;
use tracing::{info, warn};

use crate::config::{tables, FieldOptions, GenerateMode, ResolvedConfig, TypeMapping};
use crate::error::Result;
use crate::introspect::{describe_columns, describe_table, normalize_comment};

/// Everything a generator needs besides the tables
#[derive(Debug, Clone)]
pub struct GenConfig {
    pub out_path: PathBuf,
    pub out_file: String,
    pub model_pkg_name: String,
    pub mode: GenerateMode,
    pub only_model: bool,
    pub with_unit_test: bool,
    pub fields: FieldOptions,
    pub type_mapping: TypeMapping,
    pub import_pkg_paths: Vec<String>,
}

impl GenConfig {
    /// Directory models are written to, next to the query output directory
    pub fn model_path(&self) -> PathBuf {
        self.out_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.model_pkg_name)
    }
}

/// A code emitter
pub trait Generator {
    fn generate(&mut self, config: &GenConfig, tables: &[TableSchema]) -> Result<()>;
}

/// Connect, select and describe tables, then run `generator` over them.
///
/// Returns the number of tables handed to the generator.
pub async fn run(config: &ResolvedConfig, generator: &mut dyn Generator) -> Result<usize> {
    let catalog = crate::open_catalog(config).await?;
    run_with_catalog(config, catalog.as_ref(), generator).await
}

/// [`run`] over an already open catalog.
pub async fn run_with_catalog(
    config: &ResolvedConfig,
    catalog: &dyn Catalog,
    generator: &mut dyn Generator,
) -> Result<usize> {
    let names = tables::select(config.tables(), config.exclude_tables(), || {
        catalog.get_tables()
    })
    .await?;
    info!(count = names.len(), "tables selected for generation");

    let mut schemas = Vec::with_capacity(names.len());
    for name in &names {
        let table = match describe_table(catalog, name).await {
            Ok(table) => table,
            Err(e) => {
                warn!(table = %name, error = %e, "table lookup failed, generating without table metadata");
                TableMetadata::new(name.as_str())
            }
        };
        let mut columns = describe_columns(catalog, name).await?;
        for column in &mut columns {
            if let Some(comment) = column.comment.as_mut() {
                *comment = normalize_comment(comment);
            }
        }
        schemas.push(TableSchema { table, columns });
    }

    generator.generate(&config.gen_config(), &schemas)?;
    Ok(schemas.len())
}

/// Dry-run generator that prints what would be generated
pub struct PlanPrinter<W: Write> {
    out: W,
}

impl<W: Write> PlanPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Generator for PlanPrinter<W> {
    fn generate(&mut self, config: &GenConfig, tables: &[TableSchema]) -> Result<()> {
        writeln!(
            self.out,
            "Dry run - would generate {} tables (mode: {}):",
            tables.len(),
            config.mode.names().join("|")
        )?;
        let model_dir = config.model_path();
        for schema in tables {
            let name = &schema.table.name;
            writeln!(
                self.out,
                "  {} ({} columns)",
                name.to_upper_camel_case(),
                schema.columns.len()
            )?;
            writeln!(
                self.out,
                "    Model: {}",
                model_dir.join(format!("{}.gen.rs", name)).display()
            )?;
            if !config.only_model {
                writeln!(
                    self.out,
                    "    Query: {}",
                    config.out_path.join(format!("{}.gen.rs", name)).display()
                )?;
                if config.with_unit_test {
                    writeln!(
                        self.out,
                        "    Test:  {}",
                        config.out_path.join(format!("{}.gen_test.rs", name)).display()
                    )?;
                }
            }
            for column in &schema.columns {
                if let Some(target) = config.type_mapping.resolve(column) {
                    writeln!(self.out, "      {}: {}", column.name, target)?;
                }
            }
        }
        if !config.only_model {
            writeln!(
                self.out,
                "  Query entry: {}",
                config.out_path.join(&config.out_file).display()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gentool_catalog::ColumnMetadata;

    fn gen_config(only_model: bool) -> GenConfig {
        GenConfig {
            out_path: PathBuf::from("./dao/query"),
            out_file: "gen.rs".into(),
            model_pkg_name: "models".into(),
            mode: GenerateMode::default(),
            only_model,
            with_unit_test: true,
            fields: FieldOptions::default(),
            type_mapping: TypeMapping::compile(&["jsonb:serde_json::Value"], false),
            import_pkg_paths: Vec::new(),
        }
    }

    fn user_accounts() -> TableSchema {
        TableSchema {
            table: TableMetadata::new("user_accounts"),
            columns: vec![
                ColumnMetadata {
                    name: "id".into(),
                    database_type: "int8".into(),
                    column_type: "bigint".into(),
                    primary_key: true,
                    ..Default::default()
                },
                ColumnMetadata {
                    name: "profile".into(),
                    database_type: "jsonb".into(),
                    column_type: "jsonb".into(),
                    nullable: true,
                    ..Default::default()
                },
            ],
        }
    }

    fn render(config: &GenConfig) -> String {
        let mut printer = PlanPrinter::new(Vec::new());
        printer.generate(config, &[user_accounts()]).unwrap();
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_plan_lists_model_and_query_files() {
        let out = render(&gen_config(false));
        assert!(out.contains("UserAccounts (2 columns)"));
        assert!(out.contains("Model: ./dao/models/user_accounts.gen.rs"));
        assert!(out.contains("Query: ./dao/query/user_accounts.gen.rs"));
        assert!(out.contains("Test:  ./dao/query/user_accounts.gen_test.rs"));
        assert!(out.contains("profile: serde_json::Value"));
        assert!(out.contains("Query entry: ./dao/query/gen.rs"));
        assert!(out.contains("mode: DefaultQuery|QueryInterface|OutContext"));
    }

    #[test]
    fn test_plan_only_model() {
        let out = render(&gen_config(true));
        assert!(out.contains("Model:"));
        assert!(!out.contains("Query:"));
        assert!(!out.contains("Query entry:"));
    }

    #[test]
    fn test_model_path() {
        let mut config = gen_config(false);
        assert_eq!(config.model_path(), PathBuf::from("./dao/models"));
        config.out_path = PathBuf::from("query");
        assert_eq!(config.model_path(), PathBuf::from("models"));
    }
}
