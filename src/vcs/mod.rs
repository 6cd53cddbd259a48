//! vcs
//!
//! Backend adapters for version-control working copies.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git and SVN. The engine talks to
//! a working copy exclusively through the [`VcsAdapter`] trait, and no other
//! module imports `git2` or spawns `git`/`svn` processes.
//!
//! Adapters are plain synchronous I/O wrappers. They hold no mutable state
//! and carry no concurrency logic; the engine runs them on its bounded
//! worker pool, one call sequence per repository.
//!
//! # Implementations
//!
//! - [`GitAdapter`]: `git2` for local reads, the `git` CLI for network
//!   operations and the textual status
//! - [`SvnAdapter`]: the `svn` CLI
//! - [`mock::MockAdapter`]: deterministic test double that records calls
//!
//! [`discover`] finds working copies below a folder.
//!
//! # Example
//!
//! ```no_run
//! use repodash::core::types::{RepositoryDescriptor, VcsKind};
//! use repodash::vcs::{adapter_for, AdapterOptions};
//!
//! let adapter = adapter_for(VcsKind::Git, &AdapterOptions::default());
//! let repo = RepositoryDescriptor::new("/work/app", "git@github.com:org/app.git");
//! if adapter.check_exists(&repo.path) {
//!     let dirty = adapter.is_dirty(&repo.path, true)?;
//!     println!("dirty: {}", dirty);
//! }
//! # Ok::<(), repodash::vcs::VcsError>(())
//! ```

pub mod command;
pub mod discover;
mod git;
pub mod mock;
mod shell;
mod svn;

pub use git::GitAdapter;
pub use shell::{browser_url, OpenTarget};
pub use svn::SvnAdapter;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::core::types::{RepositoryDescriptor, VcsKind};

/// Errors from adapter operations.
///
/// The categories drive how the engine reacts: `NotARepository` is an
/// expected state, `Adapter` becomes an `Error` status, `Command` text is
/// shown to the user verbatim, and `NotImplemented` is reported as a failed
/// action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VcsError {
    /// The path is not a working copy of this backend.
    #[error("not a {kind} working copy: {path}")]
    NotARepository {
        path: PathBuf,
        kind: VcsKind,
    },

    /// The backend could not run (missing executable, access denied,
    /// corrupted metadata).
    #[error("{path}: {message}")]
    Adapter {
        path: PathBuf,
        message: String,
    },

    /// A backend command ran and failed.
    ///
    /// `raw_output` is the backend's own message with its framing
    /// stripped; see [`strip_error_framing`].
    #[error("{raw_output}")]
    Command {
        path: PathBuf,
        raw_output: String,
    },

    /// The operation exists in the capability set but this backend does not
    /// provide it.
    #[error("{operation} is not yet implemented for {backend}")]
    NotImplemented {
        backend: VcsKind,
        operation: &'static str,
    },
}

impl VcsError {
    pub(crate) fn adapter(path: &Path, message: impl Into<String>) -> Self {
        VcsError::Adapter {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn command(path: &Path, raw: &str) -> Self {
        VcsError::Command {
            path: path.to_path_buf(),
            raw_output: strip_error_framing(raw),
        }
    }
}

/// Raw signal a backend exposes about its relationship to the remote.
///
/// Git reports it as text from `git status`; SVN as two monotonically
/// ordered revision numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSignal {
    StatusText(String),
    Revisions { local: u64, remote: u64 },
}

/// A revision identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// Git commit id (full hex).
    Commit(String),
    /// SVN revision number.
    Number(u64),
}

impl Revision {
    /// Short display form: 7 hex characters or the plain number.
    pub fn short(&self) -> String {
        match self {
            Revision::Commit(id) => id.chars().take(7).collect(),
            Revision::Number(n) => n.to_string(),
        }
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Commit(id) => write!(f, "{}", id),
            Revision::Number(n) => write!(f, "r{}", n),
        }
    }
}

/// Options shared by the concrete adapters.
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    /// Terminal program used by `open_in_shell`. Falls back to a platform
    /// default when unset.
    pub shell: Option<String>,
}

/// The capability set every backend exposes.
///
/// Methods that only read local metadata never touch the network.
/// `remote_signal`, `remote_revision`, `fetch`, `pull`, `push` and
/// `clone_repo` may.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the engine shares one adapter
/// across all worker tasks.
pub trait VcsAdapter: Send + Sync {
    /// Backend this adapter drives.
    fn kind(&self) -> VcsKind;

    /// True iff `path` is a directory containing the backend metadata folder.
    ///
    /// Never fails: a missing folder is an ordinary state before the first
    /// clone or checkout.
    fn check_exists(&self, path: &Path) -> bool {
        path.is_dir() && path.join(self.kind().metadata_dir()).is_dir()
    }

    /// Uncommitted modifications, or untracked files when requested.
    fn is_dirty(&self, path: &Path, include_untracked: bool) -> Result<bool, VcsError>;

    /// Currently checked-out branch or branch path.
    fn active_ref(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError>;

    /// Latest local revision.
    fn local_revision(&self, path: &Path) -> Result<Revision, VcsError>;

    /// Latest revision known to the remote.
    fn remote_revision(&self, descriptor: &RepositoryDescriptor) -> Result<Revision, VcsError>;

    /// Signal consumed by the status classifier.
    fn remote_signal(&self, descriptor: &RepositoryDescriptor) -> Result<RemoteSignal, VcsError>;

    /// Short status listing for detail display.
    fn status_text(&self, path: &Path, include_untracked: bool) -> Result<String, VcsError>;

    /// Remote location recorded in the working copy.
    fn used_url(&self, path: &Path) -> Result<String, VcsError>;

    /// Refresh local knowledge of the remote without touching the working tree.
    fn fetch(&self, path: &Path) -> Result<(), VcsError>;

    /// Bring remote changes into the working copy (Git pull, SVN update).
    fn pull(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError>;

    /// Propagate local commits to the remote (Git push, SVN commit).
    fn push(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError>;

    /// Materialize a new working copy at `descriptor.path` (Git clone, SVN checkout).
    fn clone_repo(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError>;

    fn open_in_explorer(&self, path: &Path) -> Result<(), VcsError>;

    fn open_in_shell(&self, path: &Path) -> Result<(), VcsError>;

    fn open_in_browser(&self, descriptor: &RepositoryDescriptor) -> Result<(), VcsError>;
}

/// Build the concrete adapter for a backend.
pub fn adapter_for(kind: VcsKind, options: &AdapterOptions) -> Arc<dyn VcsAdapter> {
    match kind {
        VcsKind::Git => Arc::new(GitAdapter::new(options.clone())),
        VcsKind::Svn => Arc::new(SvnAdapter::new(options.clone())),
    }
}

/// Strip the framing backends wrap around their error messages.
///
/// Removes a leading `fatal: `, `error: ` or `svn: E123456: ` marker and a
/// trailing `Aborting` line so only the meaningful message remains.
///
/// # Example
///
/// ```
/// use repodash::vcs::strip_error_framing;
///
/// let raw = "error: Your local changes to the following files would be overwritten by merge:\n\tREADME.md\nAborting\n";
/// assert_eq!(
///     strip_error_framing(raw),
///     "Your local changes to the following files would be overwritten by merge:\n\tREADME.md"
/// );
/// assert_eq!(
///     strip_error_framing("fatal: repository 'x' does not exist"),
///     "repository 'x' does not exist"
/// );
/// assert_eq!(
///     strip_error_framing("svn: E155007: '/tmp/x' is not a working copy"),
///     "'/tmp/x' is not a working copy"
/// );
/// ```
pub fn strip_error_framing(raw: &str) -> String {
    let mut text = raw.trim();

    for prefix in ["fatal: ", "error: "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }

    if let Some(rest) = text.strip_prefix("svn: E") {
        if let Some((code, message)) = rest.split_once(": ") {
            if code.chars().all(|c| c.is_ascii_digit()) {
                text = message;
            }
        }
    }

    if let Some(rest) = text.strip_suffix("Aborting") {
        text = rest.trim_end();
    }

    text.to_string()
}
