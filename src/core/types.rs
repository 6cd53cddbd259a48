//! core::types
//!
//! Domain types shared by the adapters, the engine, and the CLI.
//!
//! # Types
//!
//! - [`VcsKind`] - Which backend a table of repositories uses
//! - [`RepositoryDescriptor`] - User-declared repository to monitor
//! - [`DescriptorList`] - Descriptors with unique paths
//! - [`RemoteState`] - Semantic relationship between a working copy and its remote
//! - [`RepositoryStatus`] - Per-cycle status record for one descriptor
//! - [`ActionResult`] - Outcome of one mutating operation
//!
//! # Keys
//!
//! `path` is the join key everywhere. Result sets are never addressed by
//! position: collectors return records in completion order.
//!
//! # Examples
//!
//! ```
//! use repodash::core::types::{RemoteState, VcsKind};
//!
//! assert_eq!(RemoteState::PullRequired.label(VcsKind::Git), "Pull required");
//! assert_eq!(RemoteState::PullRequired.label(VcsKind::Svn), "Update required");
//! assert_eq!(RemoteState::NotApplicable.label(VcsKind::Git), "");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("duplicate repository path: {0}")]
    DuplicatePath(PathBuf),

    #[error("repository path cannot be empty")]
    EmptyPath,
}

/// Version-control backend of a repository table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Git,
    Svn,
}

impl VcsKind {
    /// Name of the metadata folder that marks a working copy.
    pub fn metadata_dir(&self) -> &'static str {
        match self {
            VcsKind::Git => ".git",
            VcsKind::Svn => ".svn",
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsKind::Git => write!(f, "git"),
            VcsKind::Svn => write!(f, "svn"),
        }
    }
}

/// A repository the user asked to monitor.
///
/// For Git, `remote_url` is the clone URL and `expected_branch` the branch
/// that should be checked out. For SVN, `remote_url` is the server URL and
/// `repo_dir` the directory below it; see [`remote_location`].
///
/// [`remote_location`]: RepositoryDescriptor::remote_location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Local working copy location.
    pub path: PathBuf,
    /// Clone URL (Git) or server URL (SVN).
    pub remote_url: String,
    /// Branch the working copy should have checked out (Git only).
    pub expected_branch: Option<String>,
    /// Directory below the server URL (SVN only).
    pub repo_dir: Option<String>,
}

impl RepositoryDescriptor {
    /// Create a descriptor with only a path and remote.
    pub fn new(path: impl Into<PathBuf>, remote_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            remote_url: remote_url.into(),
            expected_branch: None,
            repo_dir: None,
        }
    }

    /// Set the expected branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.expected_branch = Some(branch.into());
        self
    }

    /// Set the SVN repository directory.
    pub fn with_repo_dir(mut self, repo_dir: impl Into<String>) -> Self {
        self.repo_dir = Some(repo_dir.into());
        self
    }

    /// Full remote location.
    ///
    /// ```
    /// use repodash::core::types::RepositoryDescriptor;
    ///
    /// let svn = RepositoryDescriptor::new("/wc", "https://svn.example.com/repos/")
    ///     .with_repo_dir("/assets/trunk");
    /// assert_eq!(svn.remote_location(), "https://svn.example.com/repos/assets/trunk");
    ///
    /// let git = RepositoryDescriptor::new("/wc", "git@example.com:org/app.git");
    /// assert_eq!(git.remote_location(), "git@example.com:org/app.git");
    /// ```
    pub fn remote_location(&self) -> String {
        match self.repo_dir.as_deref().map(|d| d.trim_matches('/')) {
            Some(dir) if !dir.is_empty() => {
                format!("{}/{}", self.remote_url.trim_end_matches('/'), dir)
            }
            _ => self.remote_url.clone(),
        }
    }
}

/// A list of descriptors whose paths are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorList {
    items: Vec<RepositoryDescriptor>,
}

impl DescriptorList {
    /// Validate and wrap a descriptor list.
    ///
    /// # Errors
    ///
    /// - [`TypeError::DuplicatePath`] if two descriptors share a path
    /// - [`TypeError::EmptyPath`] if a descriptor has an empty path
    pub fn new(items: Vec<RepositoryDescriptor>) -> Result<Self, TypeError> {
        let mut seen = HashSet::new();
        for item in &items {
            if item.path.as_os_str().is_empty() {
                return Err(TypeError::EmptyPath);
            }
            if !seen.insert(item.path.clone()) {
                return Err(TypeError::DuplicatePath(item.path.clone()));
            }
        }
        Ok(Self { items })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a descriptor by path.
    pub fn get(&self, path: &Path) -> Option<&RepositoryDescriptor> {
        self.items.iter().find(|d| d.path == path)
    }

    /// Descriptors whose path is in `paths`, in list order.
    ///
    /// An empty `paths` slice selects every descriptor.
    pub fn select(&self, paths: &[PathBuf]) -> Vec<RepositoryDescriptor> {
        if paths.is_empty() {
            return self.items.clone();
        }
        self.items
            .iter()
            .filter(|d| paths.iter().any(|p| p == &d.path))
            .cloned()
            .collect()
    }

    pub fn as_slice(&self) -> &[RepositoryDescriptor] {
        &self.items
    }
}

/// Relationship between a working copy and its remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteState {
    UpToDate,
    PullRequired,
    PushRequired,
    PullAndPush,
    Error,
    /// The folder is not a working copy of this backend.
    NotApplicable,
}

impl RemoteState {
    /// Human-readable label in the wording of the given backend.
    pub fn label(&self, kind: VcsKind) -> &'static str {
        match (self, kind) {
            (RemoteState::UpToDate, _) => "Up-to-Date",
            (RemoteState::PullRequired, VcsKind::Git) => "Pull required",
            (RemoteState::PullRequired, VcsKind::Svn) => "Update required",
            (RemoteState::PushRequired, VcsKind::Git) => "Push your data",
            (RemoteState::PushRequired, VcsKind::Svn) => "Commit your data",
            (RemoteState::PullAndPush, _) => "Pull and Push",
            (RemoteState::Error, _) => "Error",
            (RemoteState::NotApplicable, _) => "",
        }
    }

    /// Whether the remote has changes the working copy lacks.
    pub fn needs_pull(&self) -> bool {
        matches!(self, RemoteState::PullRequired | RemoteState::PullAndPush)
    }

    /// Whether a push is meaningful.
    ///
    /// Diverged repositories must pull first, so only `PushRequired` counts.
    pub fn needs_push(&self) -> bool {
        matches!(self, RemoteState::PushRequired)
    }
}

/// Status record for one descriptor, produced once per collection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    /// Join key back to the descriptor.
    pub path: PathBuf,
    pub kind: VcsKind,
    /// Directory exists and contains the backend's metadata folder.
    pub exists: bool,
    /// Checked-out branch (Git) or branch path below the server (SVN).
    /// Empty when `exists` is false.
    pub active_ref: String,
    /// Uncommitted or untracked changes. Missing folders count as dirty.
    pub local_dirty: bool,
    pub remote_state: RemoteState,
    /// Short status listing, or the error text when `remote_state` is `Error`.
    pub raw_status_text: String,
    /// Configured remote location.
    pub remote_url: String,
    /// Remote location recorded in the working copy itself.
    pub used_url: String,
    pub expected_branch: Option<String>,
    /// Local revision (short commit id or SVN revision number).
    pub revision: String,
}

impl RepositoryStatus {
    /// Record for a folder that is not a working copy.
    pub fn missing(descriptor: &RepositoryDescriptor, kind: VcsKind) -> Self {
        Self {
            path: descriptor.path.clone(),
            kind,
            exists: false,
            active_ref: String::new(),
            local_dirty: true,
            remote_state: RemoteState::NotApplicable,
            raw_status_text: String::new(),
            remote_url: descriptor.remote_location(),
            used_url: String::new(),
            expected_branch: descriptor.expected_branch.clone(),
            revision: String::new(),
        }
    }

    /// Record for a working copy whose status could not be determined.
    pub fn failed(descriptor: &RepositoryDescriptor, kind: VcsKind, message: String) -> Self {
        Self {
            exists: true,
            remote_state: RemoteState::Error,
            raw_status_text: message,
            ..Self::missing(descriptor, kind)
        }
    }

    /// The checked-out branch differs from the expected one.
    pub fn branch_mismatch(&self) -> bool {
        match &self.expected_branch {
            Some(expected) => self.exists && !expected.is_empty() && *expected != self.active_ref,
            None => false,
        }
    }

    /// Label of the remote state in this record's backend wording.
    pub fn remote_label(&self) -> &'static str {
        self.remote_state.label(self.kind)
    }
}

/// Kind of mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Refresh,
    Pull,
    Push,
    Clone,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Refresh => write!(f, "refresh"),
            ActionKind::Pull => write!(f, "pull"),
            ActionKind::Push => write!(f, "push"),
            ActionKind::Clone => write!(f, "clone"),
        }
    }
}

/// Outcome of one mutating operation on one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub path: PathBuf,
    pub kind: ActionKind,
    pub succeeded: bool,
    /// Success summary, or the backend's error text.
    pub message: String,
}

impl ActionResult {
    pub fn success(path: impl Into<PathBuf>, kind: ActionKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            succeeded: true,
            message: message.into(),
        }
    }

    pub fn failure(path: impl Into<PathBuf>, kind: ActionKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            succeeded: false,
            message: message.into(),
        }
    }
}
