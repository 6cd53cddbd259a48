//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. The `--config` path, when given
//! 2. `$REPODASH_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/repodash/config.toml`
//! 4. `~/.repodash/config.toml`
//!
//! Unlike most tools, there is no useful default configuration: without a
//! list of repositories there is nothing to show. A missing file is
//! therefore [`ConfigError::NotFound`].
//!
//! # Example
//!
//! ```no_run
//! use repodash::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! for table in config.tables().unwrap() {
//!     println!("{}: {} repositories", table.kind, table.descriptors.len());
//! }
//! ```

pub mod schema;

pub use schema::{DashboardConfig, EngineConfig, GitTableConfig, SvnTableConfig, TableSettings};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::{DescriptorList, VcsKind};
use crate::engine::classify::UnrecognizedStatus;
use crate::engine::collect::CollectOptions;
use crate::engine::pool::PoolOptions;
use crate::vcs::AdapterOptions;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "REPODASH_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("{table}_table lists '{path}' more than once")]
    DuplicatePath { table: VcsKind, path: PathBuf },

    #[error("no config file found (searched: {})", format_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One table ready for the engine.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub kind: VcsKind,
    pub descriptors: DescriptorList,
    pub settings: TableSettings,
}

/// Loaded and validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub file: DashboardConfig,
    /// Where the file was read from
    path: PathBuf,
}

impl Config {
    /// Load configuration from `explicit` or the default locations.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotFound` if no candidate file exists
    /// - `ConfigError::ReadError` / `ParseError` if the file is unreadable
    /// - `ConfigError::InvalidValue` / `DuplicatePath` if validation fails
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match explicit {
            // An explicit path must exist; let the read report why not.
            Some(path) => path.to_path_buf(),
            None => Self::find()?,
        };
        Self::read(&path)
    }

    /// Read and validate a specific file.
    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents, path)
    }

    /// Parse and validate TOML text. `path` is used in error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Config, ConfigError> {
        let file: DashboardConfig =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        file.validate()?;
        Ok(Config {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Candidate locations, in search order.
    pub fn candidates() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Check $REPODASH_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(path));
        }

        // 2. Check $XDG_CONFIG_HOME/repodash/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("repodash/config.toml"));
        }

        // 3. Check ~/.repodash/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".repodash/config.toml"));
        }

        paths
    }

    fn find() -> Result<PathBuf, ConfigError> {
        let searched = Self::candidates();
        let found = searched.iter().find(|p| p.is_file()).cloned();
        found.ok_or(ConfigError::NotFound { searched })
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.file.engine
    }

    /// Configured tables, Git first.
    pub fn tables(&self) -> Result<Vec<TableConfig>, ConfigError> {
        let mut tables = Vec::new();
        if let Some(git) = &self.file.git_table {
            tables.push(TableConfig {
                kind: VcsKind::Git,
                descriptors: git.descriptors()?,
                settings: git.settings(),
            });
        }
        if let Some(svn) = &self.file.svn_table {
            tables.push(TableConfig {
                kind: VcsKind::Svn,
                descriptors: svn.descriptors()?,
                settings: svn.settings(),
            });
        }
        Ok(tables)
    }

    /// Collector options with defaults applied.
    pub fn collect_options(&self) -> CollectOptions {
        let engine = self.engine();
        CollectOptions {
            pool: PoolOptions::new(engine.max_workers(), engine.status_timeout()),
            fetch_timeout: engine.fetch_timeout(),
            include_untracked: engine.include_untracked(),
            unrecognized: if engine.strict_status() {
                UnrecognizedStatus::Error
            } else {
                UnrecognizedStatus::FailOpen
            },
        }
    }

    pub fn action_timeout(&self) -> Duration {
        self.engine().action_timeout()
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            shell: self.engine().shell.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [engine]
        strict_status = true
        shell = "alacritty"

        [[git_table.repo]]
        path = "/work/app"
        url = "git@github.com:org/app.git"
    "#;

    #[test]
    fn parse_builds_tables_and_options() {
        let config = Config::parse(SAMPLE, Path::new("test.toml")).unwrap();

        let tables = config.tables().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].kind, VcsKind::Git);
        assert_eq!(tables[0].descriptors.len(), 1);

        let options = config.collect_options();
        assert_eq!(options.unrecognized, UnrecognizedStatus::Error);
        assert_eq!(options.pool.max_workers, 10);
        assert_eq!(options.fetch_timeout, Duration::from_secs(20));
        assert_eq!(config.adapter_options().shell.as_deref(), Some("alacritty"));
        assert_eq!(config.path(), Path::new("test.toml"));
    }

    #[test]
    fn parse_error_names_file() {
        let err = Config::parse("[git_table", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn explicit_missing_file_is_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn read_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.path(), path.as_path());
    }

    #[test]
    fn not_found_lists_candidates() {
        let err = ConfigError::NotFound {
            searched: vec![PathBuf::from("/a.toml"), PathBuf::from("/b.toml")],
        };
        assert_eq!(
            err.to_string(),
            "no config file found (searched: /a.toml, /b.toml)"
        );
    }
}
