//! CLI entry point for gentool

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gentool::config::{load_config, save_config, Overrides, Profile, ResolvedConfig};
use gentool::generate::{self, PlanPrinter};
use gentool::print;

#[derive(Parser)]
#[command(name = "gentool")]
#[command(about = "Introspect a database schema and drive DAO/model code generation")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML format)
    #[arg(short, long, env = "GEN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct OverrideArgs {
    /// Database connection string
    #[arg(long, env = "GEN_DSN", global = true)]
    dsn: Option<String>,

    /// Database dialect (mysql, postgres, sqlite, sqlserver, clickhouse)
    #[arg(long, env = "GEN_DB", global = true)]
    db: Option<String>,

    /// Comma-separated tables to generate for
    #[arg(short, long, env = "GEN_TABLES", global = true)]
    tables: Option<String>,

    /// Comma-separated tables to skip
    #[arg(short, long, env = "GEN_EXCLUDE_TABLES", global = true)]
    exclude_tables: Option<String>,

    /// Generate models only
    #[arg(long, env = "GEN_ONLY_MODEL", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    only_model: Option<bool>,

    /// Output directory for query code
    #[arg(long, env = "GEN_OUT_PATH", global = true)]
    out_path: Option<String>,

    /// Output file name
    #[arg(long, env = "GEN_OUT_FILE", global = true)]
    out_file: Option<String>,

    /// Generation modes, `|`-separated (DefaultQuery|QueryInterface|OutContext)
    #[arg(long, env = "GEN_MODE", global = true)]
    mode: Option<String>,

    /// Generate unit tests for query code
    #[arg(long, env = "GEN_WITH_UNIT_TEST", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    with_unit_test: Option<bool>,

    /// Model package name
    #[arg(long, env = "GEN_MODEL_PKG_NAME", global = true)]
    model_pkg_name: Option<String>,

    /// Nullable columns become optional fields
    #[arg(long, env = "GEN_FIELD_NULLABLE", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    field_nullable: Option<bool>,

    /// Columns with defaults become optional fields
    #[arg(long, env = "GEN_FIELD_COVERABLE", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    field_coverable: Option<bool>,

    /// Emit index tags
    #[arg(long, env = "GEN_FIELD_WITH_INDEX_TAG", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    field_with_index_tag: Option<bool>,

    /// Emit type tags
    #[arg(long, env = "GEN_FIELD_WITH_TYPE_TAG", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    field_with_type_tag: Option<bool>,

    /// Detect unsigned integer columns
    #[arg(long, env = "GEN_FIELD_SIGNABLE", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    field_signable: Option<bool>,

    /// Emit JSON type tags and map jsonb columns
    #[arg(long, env = "GEN_FIELD_JSON_TYPE_TAG", global = true, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    field_json_type_tag: Option<bool>,

    /// `source:target` type mapping (repeatable)
    #[arg(short = 'm', long, env = "GEN_FIELDS_TYPE_MAPPING", global = true, value_delimiter = ',')]
    fields_type_mapping: Vec<String>,

    /// Extra import paths for generated code (repeatable)
    #[arg(short = 'p', long, env = "GEN_IMPORT_PKG_PATHS", global = true, value_delimiter = ',')]
    import_pkg_paths: Vec<String>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Overrides {
            dsn: args.dsn,
            db: args.db,
            tables: args.tables,
            exclude_tables: args.exclude_tables,
            only_model: args.only_model,
            out_path: args.out_path,
            out_file: args.out_file,
            with_unit_test: args.with_unit_test,
            model_pkg_name: args.model_pkg_name,
            field_nullable: args.field_nullable,
            field_coverable: args.field_coverable,
            field_with_index_tag: args.field_with_index_tag,
            field_with_type_tag: args.field_with_type_tag,
            field_signable: args.field_signable,
            field_json_type_tag: args.field_json_type_tag,
            fields_type_mapping: args.fields_type_mapping,
            import_pkg_paths: args.import_pkg_paths,
            mode: args.mode,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect the selected tables and run the generator (default)
    Generate,
    /// List tables with their comments
    Tables {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the columns of a table
    Describe {
        /// Table name
        table: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write a template configuration file
    Init {
        /// Target file or directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use log_level)
    let file = match &cli.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };

    // Priority: RUST_LOG env var > log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = file
        .as_ref()
        .and_then(|params| params.log_level.clone())
        .unwrap_or_else(|| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides::from(cli.overrides);

    if let Some(Commands::Init { path }) = &cli.command {
        let config = ResolvedConfig::resolve(file, &overrides, Profile::Template)?;
        let written = save_config(&config, path)?;
        info!("Configuration template written to {}", written.display());
        return Ok(());
    }

    let config = ResolvedConfig::resolve(file, &overrides, Profile::Run)?;

    match cli.command {
        Some(Commands::Tables { json }) => {
            let catalog = gentool::open_catalog(&config).await?;
            print::print_tables(
                catalog.as_ref(),
                config.tables(),
                config.exclude_tables(),
                json,
            )
            .await?;
        }
        Some(Commands::Describe { table, json }) => {
            let catalog = gentool::open_catalog(&config).await?;
            print::print_table(catalog.as_ref(), &table, json).await?;
        }
        _ => {
            let mut printer = PlanPrinter::new(std::io::stdout());
            let count = generate::run(&config, &mut printer).await?;
            info!("Generation plan completed for {} tables", count);
        }
    }

    Ok(())
}
