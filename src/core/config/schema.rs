//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Layout
//!
//! ```toml
//! [engine]
//! max_workers = 10
//! status_timeout_secs = 10
//! fetch_timeout_secs = 20
//! action_timeout_secs = 10
//! include_untracked = true
//! strict_status = false
//!
//! [git_table]
//! auto_update = true
//! auto_update_interval_secs = 900
//!
//! [[git_table.repo]]
//! path = "/work/app"
//! url = "git@github.com:org/app.git"
//! branch = "main"
//!
//! [[svn_table.repo]]
//! path = "/work/assets"
//! server_url = "https://svn.example.com/repos"
//! repo_dir = "assets/trunk"
//! ```
//!
//! # Compatibility
//!
//! Capitalized keys (`Path`, `Url`, `Branch`, `ServerUrl`, `RepoDir`,
//! `AutoUpdate`, `AutoUpdateTime`) are accepted as aliases so existing
//! dashboard files load unchanged.
//!
//! # Validation
//!
//! Config values are validated after parsing: timeouts and intervals must
//! be positive and repository paths must be unique within a table.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{DescriptorList, RepositoryDescriptor, TypeError, VcsKind};
use crate::engine::pool::DEFAULT_MAX_WORKERS;

/// Default periodic refresh interval.
pub const DEFAULT_AUTO_UPDATE_SECS: u64 = 900;

/// Whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Engine tuning
    #[serde(skip_serializing_if = "EngineConfig::is_unset")]
    pub engine: EngineConfig,

    /// Git repositories
    pub git_table: Option<GitTableConfig>,

    /// SVN repositories
    pub svn_table: Option<SvnTableConfig>,
}

impl DashboardConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidValue` for out-of-range values
    /// - `ConfigError::DuplicatePath` if a table lists a path twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if let Some(git) = &self.git_table {
            git.settings().validate(VcsKind::Git)?;
            git.descriptors()?;
        }
        if let Some(svn) = &self.svn_table {
            svn.settings().validate(VcsKind::Svn)?;
            svn.descriptors()?;
        }
        Ok(())
    }
}

/// Engine tuning. Every field is optional; accessors apply defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker pool width (default 10)
    pub max_workers: Option<usize>,

    /// Deadline for a status pass, seconds (default 10)
    pub status_timeout_secs: Option<u64>,

    /// Deadline for a fetch pass, seconds (default 20)
    pub fetch_timeout_secs: Option<u64>,

    /// Deadline for pull/push/clone, seconds (default 10)
    pub action_timeout_secs: Option<u64>,

    /// Count untracked files as dirty (default true)
    pub include_untracked: Option<bool>,

    /// Report unrecognized Git status text as an error (default false)
    pub strict_status: Option<bool>,

    /// Terminal program for `open --in shell`
    pub shell: Option<String>,
}

impl EngineConfig {
    /// No field is set.
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs.unwrap_or(10))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.unwrap_or(20))
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs.unwrap_or(10))
    }

    pub fn include_untracked(&self) -> bool {
        self.include_untracked.unwrap_or(true)
    }

    pub fn strict_status(&self) -> bool {
        self.strict_status.unwrap_or(false)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("status_timeout_secs", self.status_timeout_secs),
            ("fetch_timeout_secs", self.fetch_timeout_secs),
            ("action_timeout_secs", self.action_timeout_secs),
        ];
        for (name, value) in timeouts {
            if value == Some(0) {
                return Err(ConfigError::InvalidValue(format!(
                    "engine.{} must be greater than zero",
                    name
                )));
            }
        }
        if matches!(self.shell.as_deref(), Some(s) if s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "engine.shell cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Periodic refresh settings of one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSettings {
    pub auto_update: Option<bool>,
    pub auto_update_interval_secs: Option<u64>,
}

impl TableSettings {
    /// Refresh on a timer when watching (default false).
    pub fn auto_update(&self) -> bool {
        self.auto_update.unwrap_or(false)
    }

    /// Timer interval (default 900 s).
    pub fn interval(&self) -> Duration {
        Duration::from_secs(
            self.auto_update_interval_secs
                .unwrap_or(DEFAULT_AUTO_UPDATE_SECS),
        )
    }

    fn validate(&self, kind: VcsKind) -> Result<(), ConfigError> {
        if self.auto_update_interval_secs == Some(0) {
            return Err(ConfigError::InvalidValue(format!(
                "{}_table.auto_update_interval_secs must be greater than zero",
                kind
            )));
        }
        Ok(())
    }
}

/// `[git_table]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitTableConfig {
    #[serde(alias = "AutoUpdate")]
    pub auto_update: Option<bool>,

    /// Seconds
    #[serde(alias = "AutoUpdateTime")]
    pub auto_update_interval_secs: Option<u64>,

    /// Repositories, in display order
    pub repo: Vec<GitRepoEntry>,
}

impl GitTableConfig {
    pub fn settings(&self) -> TableSettings {
        TableSettings {
            auto_update: self.auto_update,
            auto_update_interval_secs: self.auto_update_interval_secs,
        }
    }

    /// Validated descriptor list for this table.
    pub fn descriptors(&self) -> Result<DescriptorList, ConfigError> {
        let items = self
            .repo
            .iter()
            .map(|r| RepositoryDescriptor {
                path: r.path.clone(),
                remote_url: r.url.clone(),
                expected_branch: r.branch.clone().filter(|b| !b.is_empty()),
                repo_dir: None,
            })
            .collect();
        build_list(VcsKind::Git, items)
    }
}

/// One `[[git_table.repo]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GitRepoEntry {
    #[serde(alias = "Path")]
    pub path: PathBuf,

    /// Clone URL
    #[serde(alias = "Url")]
    pub url: String,

    /// Expected branch
    #[serde(default, alias = "Branch")]
    pub branch: Option<String>,
}

/// `[svn_table]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SvnTableConfig {
    #[serde(alias = "AutoUpdate")]
    pub auto_update: Option<bool>,

    #[serde(alias = "AutoUpdateTime")]
    pub auto_update_interval_secs: Option<u64>,

    pub repo: Vec<SvnRepoEntry>,
}

impl SvnTableConfig {
    pub fn settings(&self) -> TableSettings {
        TableSettings {
            auto_update: self.auto_update,
            auto_update_interval_secs: self.auto_update_interval_secs,
        }
    }

    pub fn descriptors(&self) -> Result<DescriptorList, ConfigError> {
        let items = self
            .repo
            .iter()
            .map(|r| RepositoryDescriptor {
                path: r.path.clone(),
                remote_url: r.server_url.clone(),
                expected_branch: None,
                repo_dir: r.repo_dir.clone(),
            })
            .collect();
        build_list(VcsKind::Svn, items)
    }
}

/// One `[[svn_table.repo]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SvnRepoEntry {
    #[serde(alias = "Path")]
    pub path: PathBuf,

    #[serde(alias = "ServerUrl")]
    pub server_url: String,

    /// Directory below the server URL
    #[serde(default, alias = "RepoDir")]
    pub repo_dir: Option<String>,
}

fn build_list(
    kind: VcsKind,
    items: Vec<RepositoryDescriptor>,
) -> Result<DescriptorList, ConfigError> {
    DescriptorList::new(items).map_err(|e| match e {
        TypeError::DuplicatePath(path) => ConfigError::DuplicatePath { table: kind, path },
        TypeError::EmptyPath => {
            ConfigError::InvalidValue(format!("{}_table has a repository with an empty path", kind))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_fragment_omits_unset_engine_and_parses_back() {
        let config = DashboardConfig {
            git_table: Some(GitTableConfig {
                repo: vec![GitRepoEntry {
                    path: PathBuf::from("/work/app"),
                    url: "git@github.com:org/app.git".to_string(),
                    branch: Some("main".to_string()),
                }],
                ..GitTableConfig::default()
            }),
            ..DashboardConfig::default()
        };

        let text = toml::to_string_pretty(&config).unwrap();

        assert!(!text.contains("[engine]"));
        assert!(text.contains("[[git_table.repo]]"));
        let parsed: DashboardConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn parses_full_file() {
        let toml = r#"
            [engine]
            max_workers = 4
            strict_status = true

            [git_table]
            auto_update = true
            auto_update_interval_secs = 60

            [[git_table.repo]]
            path = "/work/app"
            url = "git@github.com:org/app.git"
            branch = "main"

            [[svn_table.repo]]
            path = "/work/assets"
            server_url = "https://svn.example.com/repos"
            repo_dir = "assets/trunk"
        "#;
        let config: DashboardConfig = toml::from_str(toml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.engine.max_workers(), 4);
        assert!(config.engine.strict_status());
        assert_eq!(config.engine.fetch_timeout(), Duration::from_secs(20));

        let git = config.git_table.unwrap();
        assert!(git.settings().auto_update());
        assert_eq!(git.settings().interval(), Duration::from_secs(60));
        let list = git.descriptors().unwrap();
        assert_eq!(list.as_slice()[0].expected_branch.as_deref(), Some("main"));

        let svn = config.svn_table.unwrap();
        assert!(!svn.settings().auto_update());
        assert_eq!(
            svn.descriptors().unwrap().as_slice()[0].remote_location(),
            "https://svn.example.com/repos/assets/trunk"
        );
    }

    #[test]
    fn accepts_capitalized_aliases() {
        let toml = r#"
            [git_table]
            AutoUpdate = true
            AutoUpdateTime = 300

            [[git_table.repo]]
            Path = 'D:\work\app'
            Url = "https://github.com/org/app.git"
            Branch = "develop"

            [svn_table]
            [[svn_table.repo]]
            Path = "/work/assets"
            ServerUrl = "https://svn.example.com/repos"
            RepoDir = "assets"
        "#;
        let config: DashboardConfig = toml::from_str(toml).unwrap();
        let git = config.git_table.unwrap();
        assert_eq!(git.settings().interval(), Duration::from_secs(300));
        assert_eq!(git.repo[0].branch.as_deref(), Some("develop"));
        assert_eq!(config.svn_table.unwrap().repo[0].repo_dir.as_deref(), Some("assets"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let toml = r#"
            [[git_table.repo]]
            path = "/a"
            url = "u"
            colour = "red"
        "#;
        assert!(toml::from_str::<DashboardConfig>(toml).is_err());
    }

    #[test]
    fn duplicate_paths_are_reported_per_table() {
        let toml = r#"
            [[svn_table.repo]]
            path = "/a"
            server_url = "u"

            [[svn_table.repo]]
            path = "/a"
            server_url = "v"
        "#;
        let config: DashboardConfig = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicatePath { table: VcsKind::Svn, .. })
        ));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = DashboardConfig {
            engine: EngineConfig {
                action_timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn empty_branch_means_none() {
        let table = GitTableConfig {
            repo: vec![GitRepoEntry {
                path: "/a".into(),
                url: "u".into(),
                branch: Some(String::new()),
            }],
            ..Default::default()
        };
        assert_eq!(table.descriptors().unwrap().as_slice()[0].expected_branch, None);
    }
}
