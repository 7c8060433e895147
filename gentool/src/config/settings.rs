//! Configuration resolution for gentool

use gentool_catalog::Dialect;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::mode::GenerateMode;
use super::type_mapping::TypeMapping;
use super::{defaults, dsn, tables};
use crate::error::{GenError, Result};
use crate::generate::GenConfig;

/// The persisted `database` block of a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigParams {
    /// Connection string
    pub dsn: String,

    /// Dialect tag (mysql, postgres, sqlite, sqlserver, clickhouse)
    pub db: String,

    /// Tables to generate for (empty for all)
    pub tables: Vec<String>,

    /// Tables never generated for
    pub exclude_tables: Vec<String>,

    /// Generate models only
    pub only_model: bool,

    /// Output directory for query code
    pub out_path: String,

    /// Output file name
    pub out_file: String,

    /// Generate unit tests for query code
    pub with_unit_test: bool,

    /// Model package name
    pub model_pkg_name: String,

    pub field_nullable: bool,
    pub field_coverable: bool,
    pub field_with_index_tag: bool,
    pub field_with_type_tag: bool,
    pub field_signable: bool,
    pub field_json_type_tag: bool,

    /// `source:target` type mapping entries
    pub fields_type_mapping: Vec<String>,

    /// Extra import paths for generated code
    pub import_pkg_paths: Vec<String>,

    /// `|`-separated generation modes
    pub mode: String,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Transient options from flags and environment.
///
/// `None` (or an empty string / list) means "not given", so an explicit
/// `false` still overrides a `true` from the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dsn: Option<String>,
    pub db: Option<String>,
    /// Comma-separated table names
    pub tables: Option<String>,
    /// Comma-separated table names
    pub exclude_tables: Option<String>,
    pub only_model: Option<bool>,
    pub out_path: Option<String>,
    pub out_file: Option<String>,
    pub with_unit_test: Option<bool>,
    pub model_pkg_name: Option<String>,
    pub field_nullable: Option<bool>,
    pub field_coverable: Option<bool>,
    pub field_with_index_tag: Option<bool>,
    pub field_with_type_tag: Option<bool>,
    pub field_signable: Option<bool>,
    pub field_json_type_tag: Option<bool>,
    pub fields_type_mapping: Vec<String>,
    pub import_pkg_paths: Vec<String>,
    pub mode: Option<String>,
}

fn set_string(target: &mut String, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        *target = value.to_string();
    }
}

fn set_bool(target: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_list(target: &mut Vec<String>, value: &[String]) {
    if !value.is_empty() {
        *target = value.to_vec();
    }
}

impl Overrides {
    /// Apply every given option on top of `params`.
    pub fn apply_to(&self, params: &mut ConfigParams) {
        set_string(&mut params.dsn, &self.dsn);
        set_string(&mut params.db, &self.db);
        if let Some(list) = self.tables.as_deref().filter(|v| !v.is_empty()) {
            params.tables = tables::parse_list(list);
        }
        if let Some(list) = self.exclude_tables.as_deref().filter(|v| !v.is_empty()) {
            params.exclude_tables = tables::parse_list(list);
        }
        set_bool(&mut params.only_model, self.only_model);
        set_string(&mut params.out_path, &self.out_path);
        set_string(&mut params.out_file, &self.out_file);
        set_bool(&mut params.with_unit_test, self.with_unit_test);
        set_string(&mut params.model_pkg_name, &self.model_pkg_name);
        set_bool(&mut params.field_nullable, self.field_nullable);
        set_bool(&mut params.field_coverable, self.field_coverable);
        set_bool(&mut params.field_with_index_tag, self.field_with_index_tag);
        set_bool(&mut params.field_with_type_tag, self.field_with_type_tag);
        set_bool(&mut params.field_signable, self.field_signable);
        set_bool(&mut params.field_json_type_tag, self.field_json_type_tag);
        set_list(&mut params.fields_type_mapping, &self.fields_type_mapping);
        set_list(&mut params.import_pkg_paths, &self.import_pkg_paths);
        set_string(&mut params.mode, &self.mode);
    }
}

/// Which defaults a resolution applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Resolution for an actual run; a DSN is required
    Run,
    /// Resolution for writing a template config file; placeholders fill the gaps
    Template,
}

/// Per-field generation behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Nullable columns become optional fields
    pub nullable: bool,
    /// Columns with defaults become optional fields
    pub coverable: bool,
    /// Detect unsigned integer columns
    pub signable: bool,
    /// Emit index tags
    pub with_index_tag: bool,
    /// Emit type tags
    pub with_type_tag: bool,
    /// Emit JSON type tags
    pub json_type_tag: bool,
}

/// A fully resolved, read-only configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    dialect: Dialect,
    dsn: String,
    tables: Vec<String>,
    exclude_tables: Vec<String>,
    only_model: bool,
    out_path: PathBuf,
    out_file: String,
    with_unit_test: bool,
    model_pkg_name: String,
    fields: FieldOptions,
    fields_type_mapping: Vec<String>,
    type_mapping: TypeMapping,
    import_pkg_paths: Vec<String>,
    mode_spec: String,
    mode: GenerateMode,
    log_level: Option<String>,
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn or_defaults(value: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if value.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        value
    }
}

impl ResolvedConfig {
    /// Merge a config file block with overrides and apply defaults.
    pub fn resolve(
        file: Option<ConfigParams>,
        overrides: &Overrides,
        profile: Profile,
    ) -> Result<Self> {
        let mut params = file.unwrap_or_default();
        overrides.apply_to(&mut params);

        if params.dsn.is_empty() {
            match profile {
                Profile::Run => return Err(GenError::Config("dsn cannot be empty".into())),
                Profile::Template => {
                    let tag = if params.db.is_empty() {
                        defaults::DB
                    } else {
                        params.db.as_str()
                    };
                    params.dsn = defaults::dsn_for(tag).to_string();
                }
            }
        }

        let (dialect, dsn) = dsn::resolve(&params.db, &params.dsn);
        debug!(dialect = %dialect, dsn = %dsn::mask_password(&dsn), "resolved connection");

        if profile == Profile::Template {
            params.exclude_tables =
                or_defaults(params.exclude_tables, defaults::TEMPLATE_EXCLUDE_TABLES);
            params.tables = or_defaults(params.tables, defaults::TEMPLATE_TABLES);
            params.import_pkg_paths =
                or_defaults(params.import_pkg_paths, defaults::TEMPLATE_IMPORT_PKG_PATHS);
            params.fields_type_mapping = or_defaults(
                params.fields_type_mapping,
                defaults::TEMPLATE_FIELDS_TYPE_MAPPING,
            );
        }

        let fields = FieldOptions {
            nullable: params.field_nullable,
            coverable: params.field_coverable,
            signable: params.field_signable,
            with_index_tag: params.field_with_index_tag,
            with_type_tag: params.field_with_type_tag,
            json_type_tag: params.field_json_type_tag,
        };
        let mode_spec = or_default(params.mode, defaults::MODE);
        let type_mapping = TypeMapping::compile(&params.fields_type_mapping, fields.json_type_tag);

        Ok(Self {
            dialect,
            dsn,
            tables: tables::normalize(&params.tables),
            exclude_tables: tables::normalize(&params.exclude_tables),
            only_model: params.only_model,
            out_path: PathBuf::from(or_default(params.out_path, defaults::OUT_PATH)),
            out_file: or_default(params.out_file, defaults::OUT_FILE),
            with_unit_test: params.with_unit_test,
            model_pkg_name: or_default(params.model_pkg_name, defaults::MODEL_PKG_NAME),
            fields,
            fields_type_mapping: params.fields_type_mapping,
            type_mapping,
            import_pkg_paths: params.import_pkg_paths,
            mode: GenerateMode::parse(&mode_spec),
            mode_spec,
            log_level: params.log_level,
        })
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Canonical DSN for the dialect's driver
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn exclude_tables(&self) -> &[String] {
        &self.exclude_tables
    }

    pub fn only_model(&self) -> bool {
        self.only_model
    }

    pub fn out_path(&self) -> &PathBuf {
        &self.out_path
    }

    pub fn out_file(&self) -> &str {
        &self.out_file
    }

    pub fn with_unit_test(&self) -> bool {
        self.with_unit_test
    }

    pub fn model_pkg_name(&self) -> &str {
        &self.model_pkg_name
    }

    pub fn fields(&self) -> FieldOptions {
        self.fields
    }

    pub fn type_mapping(&self) -> &TypeMapping {
        &self.type_mapping
    }

    pub fn import_pkg_paths(&self) -> &[String] {
        &self.import_pkg_paths
    }

    pub fn mode(&self) -> GenerateMode {
        self.mode
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    /// Configuration handed to generators
    pub fn gen_config(&self) -> GenConfig {
        GenConfig {
            out_path: self.out_path.clone(),
            out_file: self.out_file.clone(),
            model_pkg_name: self.model_pkg_name.clone(),
            mode: self.mode,
            only_model: self.only_model,
            with_unit_test: self.with_unit_test,
            fields: self.fields,
            type_mapping: self.type_mapping.clone(),
            import_pkg_paths: self.import_pkg_paths.clone(),
        }
    }

    /// The resolved values in persisted form
    pub fn to_params(&self) -> ConfigParams {
        ConfigParams {
            dsn: self.dsn.clone(),
            db: self.dialect.to_string(),
            tables: self.tables.clone(),
            exclude_tables: self.exclude_tables.clone(),
            only_model: self.only_model,
            out_path: self.out_path.display().to_string(),
            out_file: self.out_file.clone(),
            with_unit_test: self.with_unit_test,
            model_pkg_name: self.model_pkg_name.clone(),
            field_nullable: self.fields.nullable,
            field_coverable: self.fields.coverable,
            field_with_index_tag: self.fields.with_index_tag,
            field_with_type_tag: self.fields.with_type_tag,
            field_signable: self.fields.signable,
            field_json_type_tag: self.fields.json_type_tag,
            fields_type_mapping: self.fields_type_mapping.clone(),
            import_pkg_paths: self.import_pkg_paths.clone(),
            mode: self.mode_spec.clone(),
            log_level: self.log_level.clone(),
        }
    }
}
