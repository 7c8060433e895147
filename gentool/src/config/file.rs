//! YAML config file loading and saving

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::defaults;
use super::settings::{ConfigParams, ResolvedConfig};
use crate::error::{GenError, Result};

/// On-disk config document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of the tool that wrote the file
    #[serde(default)]
    pub version: String,

    pub database: Option<ConfigParams>,
}

impl ConfigFile {
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: Some(config.to_params()),
        }
    }
}

/// Load the `database` block of a YAML config file using config-rs.
pub fn load_config(path: &Path) -> Result<ConfigParams> {
    debug!(path = %path.display(), "loading config file");
    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .build()?;
    let file: ConfigFile = settings.try_deserialize()?;
    file.database.ok_or_else(|| {
        GenError::Config(format!(
            "{}: missing `database` section",
            path.display()
        ))
    })
}

/// Write a resolved configuration as YAML and return the path written.
///
/// An extension-less `target` that does not exist yet is created as a
/// directory, and a directory target receives `config.yaml`. The final path
/// must end in `.yaml` or `.yml`.
pub fn save_config(config: &ResolvedConfig, target: &Path) -> Result<PathBuf> {
    let mut path = target.to_path_buf();
    if path.extension().is_none() {
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        if path.is_dir() {
            path.push(defaults::CONFIG_FILE_NAME);
        }
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension != "yaml" && extension != "yml" {
        return Err(GenError::Config(format!(
            "malformed save-path extension, expected .yaml or .yml: {}",
            path.display()
        )));
    }

    let content = serde_yaml::to_string(&ConfigFile::from_resolved(config))?;
    fs::write(&path, content)?;
    info!(path = %path.display(), "config file written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Overrides, Profile};
    use tempfile::TempDir;

    fn template() -> ResolvedConfig {
        ResolvedConfig::resolve(None, &Overrides::default(), Profile::Template).unwrap()
    }

    #[test]
    fn test_save_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("conf");
        let written = save_config(&template(), &target).unwrap();
        assert_eq!(written, target.join("config.yaml"));
        assert!(written.is_file());
    }

    #[test]
    fn test_save_into_existing_directory() {
        let dir = TempDir::new().unwrap();
        let written = save_config(&template(), dir.path()).unwrap();
        assert_eq!(written, dir.path().join("config.yaml"));
    }

    #[test]
    fn test_save_explicit_yml() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("gen.YML");
        assert_eq!(save_config(&template(), &target).unwrap(), target);
    }

    #[test]
    fn test_save_rejects_other_extensions() {
        let dir = TempDir::new().unwrap();
        let err = save_config(&template(), &dir.path().join("gen.toml")).unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = template();
        let written = save_config(&config, dir.path()).unwrap();

        let content = fs::read_to_string(&written).unwrap();
        assert!(content.contains("version:"));
        assert!(content.contains("database:"));
        assert!(content.contains("exclude_tables:"));

        let params = load_config(&written).unwrap();
        assert_eq!(params, config.to_params());
    }

    #[test]
    fn test_load_without_database_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "version: 0.1.0\n").unwrap();
        assert!(matches!(load_config(&path), Err(GenError::Config(_))));
    }

    #[test]
    fn test_load_partial_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.yaml");
        fs::write(
            &path,
            "database:\n  dsn: \"file:./t.db\"\n  tables:\n    - users\n  only_model: true\n",
        )
        .unwrap();
        let params = load_config(&path).unwrap();
        assert_eq!(params.dsn, "file:./t.db");
        assert_eq!(params.tables, vec!["users"]);
        assert!(params.only_model);
        assert!(params.mode.is_empty());
    }
}
