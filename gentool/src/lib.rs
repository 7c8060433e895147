//! gentool: resolve a generator configuration and introspect a live schema
//!
//! This crate provides both a CLI tool and a library. It merges a YAML
//! config file with command-line overrides, connects to MySQL, PostgreSQL,
//! SQLite or SQL Server through `gentool-catalog`, and hands the selected
//! tables, with their column metadata, to a [`generate::Generator`].
//!
//! # Library usage
//!
//! ```rust,ignore
//! use gentool::config::{Overrides, Profile, ResolvedConfig};
//! use gentool::generate::{self, PlanPrinter};
//!
//! async fn plan() -> gentool::Result<()> {
//!     let overrides = Overrides {
//!         dsn: Some("sqlite://./app.db".to_string()),
//!         ..Default::default()
//!     };
//!     let config = ResolvedConfig::resolve(None, &overrides, Profile::Run)?;
//!     let mut printer = PlanPrinter::new(std::io::stdout());
//!     generate::run(&config, &mut printer).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod introspect;
pub mod print;

pub use error::{GenError, Result};

use gentool_catalog::Catalog;
use tracing::info;

use config::{dsn::mask_password, ResolvedConfig};

/// Connect to the database named by a resolved configuration.
pub async fn open_catalog(config: &ResolvedConfig) -> Result<Box<dyn Catalog>> {
    info!(
        dialect = %config.dialect(),
        dsn = %mask_password(config.dsn()),
        "connecting to database"
    );
    gentool_catalog::connect(config.dialect(), config.dsn())
        .await
        .map_err(GenError::Connection)
}
