//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cpcdb/cpcdb.toml`
//! 3. Environment variables: `CPCDB_*` prefix (nested keys via `__`)

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Warehouse target configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Cloud project id, e.g. "patstat-mtc"
    pub project: Option<String>,
    /// Dataset holding the reference tables
    pub dataset: Option<String>,
    /// Table name of the hierarchy
    pub table: String,
}

impl WarehouseConfig {
    /// Fully qualified target (`project.dataset.table`), if project and
    /// dataset are configured.
    pub fn target(&self) -> Option<String> {
        match (&self.project, &self.dataset) {
            (Some(project), Some(dataset)) => Some(format!("{project}.{dataset}.{}", self.table)),
            _ => None,
        }
    }
}

/// Unified configuration for cpcdb.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Filename stem of the symbol-list artifact (release stamp varies)
    pub symbol_list_stem: String,
    /// Filename stem of the title-list artifact
    pub title_list_stem: String,
    /// Filename of the produced database (relative to the source directory)
    pub db_file: String,
    /// Rows per insert transaction during the bulk load
    pub batch_size: usize,
    /// Shallowest level included in composed breadcrumb titles
    pub title_floor_level: u32,
    /// Warehouse target for `publish`
    pub warehouse: WarehouseConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol_list_stem: "CPCSymbolList".to_string(),
            title_list_stem: "CPCTitleList".to_string(),
            db_file: "cpc-hierarchy.db".to_string(),
            batch_size: 10_000,
            title_floor_level: 7,
            warehouse: WarehouseConfig {
                project: None,
                dataset: None,
                table: "tls_cpc_hierarchy".to_string(),
            },
        }
    }
}

/// Get the XDG config directory for cpcdb.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cpcdb").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cpcdb.toml"))
}

impl Settings {
    /// Load settings with layered precedence: defaults, then the global
    /// config file, then `CPCDB_*` environment variables.
    pub fn load() -> Result<Self, ApplicationError> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("CPCDB")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        settings.expand_paths();
        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.db_file = shellexpand::full(&self.db_file)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.db_file.clone());
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load().expect("load defaults");
        assert_eq!(settings.symbol_list_stem, "CPCSymbolList");
        assert_eq!(settings.batch_size, 10_000);
        assert_eq!(settings.title_floor_level, 7);
        assert_eq!(settings.warehouse.table, "tls_cpc_hierarchy");
    }

    #[test]
    fn given_no_project_when_resolving_target_then_none() {
        let settings = Settings::default();
        assert_eq!(settings.warehouse.target(), None);
    }

    #[test]
    fn given_project_and_dataset_when_resolving_target_then_qualified_name() {
        let warehouse = WarehouseConfig {
            project: Some("patstat-mtc".to_string()),
            dataset: Some("patstat".to_string()),
            table: "tls_cpc_hierarchy".to_string(),
        };
        assert_eq!(
            warehouse.target().as_deref(),
            Some("patstat-mtc.patstat.tls_cpc_hierarchy")
        );
    }

    #[test]
    fn given_tilde_in_db_file_when_expanding_then_home_substituted() {
        let mut settings = Settings {
            db_file: "~/data/cpc.db".to_string(),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(
            settings.db_file.starts_with(&home),
            "db_file should start with home dir: {}",
            settings.db_file
        );
    }
}
