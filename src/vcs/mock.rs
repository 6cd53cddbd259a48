//! vcs::mock
//!
//! Mock adapter for deterministic testing.
//!
//! # Design
//!
//! The mock adapter keeps a map of configured working copies in memory and
//! answers every [`VcsAdapter`] call from it. Each call is recorded so tests
//! can assert which operations ran, on which paths, and how often. Failures
//! and latency can be injected per path and per call.
//!
//! Successful pull, push and clone calls update the stored repository the
//! way the real operation would, so a dispatcher that reclassifies after an
//! action sees the new state.
//!
//! # Example
//!
//! ```
//! use repodash::core::types::{RepositoryDescriptor, VcsKind};
//! use repodash::vcs::mock::{MockAdapter, MockCall, MockRepo};
//! use repodash::vcs::{RemoteSignal, VcsAdapter};
//!
//! let adapter = MockAdapter::new(VcsKind::Svn)
//!     .with_repo("/wc", MockRepo::default().revisions(10, 12));
//!
//! let d = RepositoryDescriptor::new("/wc", "https://svn.example.com/repos");
//! assert_eq!(
//!     adapter.remote_signal(&d).unwrap(),
//!     RemoteSignal::Revisions { local: 10, remote: 12 }
//! );
//!
//! adapter.pull(&d).unwrap();
//! assert_eq!(
//!     adapter.remote_signal(&d).unwrap(),
//!     RemoteSignal::Revisions { local: 12, remote: 12 }
//! );
//! assert_eq!(adapter.call_count(MockCall::Pull), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{RemoteSignal, Revision, VcsAdapter, VcsError};
use crate::core::types::{RepositoryDescriptor, VcsKind};

/// Status text a Git working copy in sync with its upstream prints.
pub const GIT_UP_TO_DATE: &str = "On branch main\nYour branch is up to date with 'origin/main'.";

/// Configured state of one mock working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRepo {
    pub exists: bool,
    pub dirty: bool,
    pub active_ref: String,
    pub signal: RemoteSignal,
    pub status_text: String,
    pub used_url: String,
    pub revision: Revision,
}

impl Default for MockRepo {
    fn default() -> Self {
        Self {
            exists: true,
            dirty: false,
            active_ref: "main".to_string(),
            signal: RemoteSignal::StatusText(GIT_UP_TO_DATE.to_string()),
            status_text: String::new(),
            used_url: String::new(),
            revision: Revision::Commit("0123456789abcdef0123456789abcdef01234567".to_string()),
        }
    }
}

impl MockRepo {
    /// A folder that is not a working copy yet.
    pub fn missing() -> Self {
        Self {
            exists: false,
            ..Self::default()
        }
    }

    pub fn dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    pub fn on_ref(mut self, active_ref: impl Into<String>) -> Self {
        self.active_ref = active_ref.into();
        self
    }

    /// Git-style status text returned by `remote_signal`.
    pub fn status(mut self, text: impl Into<String>) -> Self {
        self.signal = RemoteSignal::StatusText(text.into());
        self
    }

    /// SVN-style last-changed revisions returned by `remote_signal`.
    pub fn revisions(mut self, local: u64, remote: u64) -> Self {
        self.signal = RemoteSignal::Revisions { local, remote };
        self.revision = Revision::Number(local);
        self
    }

    pub fn used_url(mut self, url: impl Into<String>) -> Self {
        self.used_url = url.into();
        self
    }

    /// Bring the local side level with the remote.
    fn catch_up(&mut self) {
        match &mut self.signal {
            RemoteSignal::StatusText(text) => *text = GIT_UP_TO_DATE.to_string(),
            RemoteSignal::Revisions { local, remote } => {
                *local = *remote;
                self.revision = Revision::Number(*remote);
            }
        }
    }

    /// Bring the remote side level with the local one.
    fn publish(&mut self) {
        match &mut self.signal {
            RemoteSignal::StatusText(text) => *text = GIT_UP_TO_DATE.to_string(),
            RemoteSignal::Revisions { local, remote } => *remote = *local,
        }
    }
}

/// Adapter call, used for failure and latency injection and in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    CheckExists,
    IsDirty,
    ActiveRef,
    LocalRevision,
    RemoteRevision,
    RemoteSignal,
    StatusText,
    UsedUrl,
    Fetch,
    Pull,
    Push,
    Clone,
    OpenExplorer,
    OpenShell,
    OpenBrowser,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOperation {
    pub call: MockCall,
    pub path: PathBuf,
}

/// Mock adapter for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockAdapter {
    kind: VcsKind,
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    repos: HashMap<PathBuf, MockRepo>,
    failures: HashMap<(PathBuf, MockCall), VcsError>,
    delays: HashMap<(PathBuf, MockCall), Duration>,
    operations: Vec<MockOperation>,
}

impl MockAdapter {
    /// Create an empty mock for the given backend.
    pub fn new(kind: VcsKind) -> Self {
        Self {
            kind,
            inner: Arc::new(Mutex::new(MockInner::default())),
        }
    }

    /// Add or replace a working copy.
    pub fn with_repo(self, path: impl Into<PathBuf>, repo: MockRepo) -> Self {
        self.set_repo(path, repo);
        self
    }

    /// Make `call` on `path` fail with `error`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use repodash::core::types::VcsKind;
    /// use repodash::vcs::mock::{MockAdapter, MockCall, MockRepo};
    /// use repodash::vcs::{VcsAdapter, VcsError};
    ///
    /// let adapter = MockAdapter::new(VcsKind::Git)
    ///     .with_repo("/r", MockRepo::default())
    ///     .fail_on("/r", MockCall::Fetch, VcsError::Adapter {
    ///         path: "/r".into(),
    ///         message: "network unreachable".into(),
    ///     });
    /// assert!(adapter.fetch(Path::new("/r")).is_err());
    /// ```
    pub fn fail_on(self, path: impl Into<PathBuf>, call: MockCall, error: VcsError) -> Self {
        self.lock().failures.insert((path.into(), call), error);
        self
    }

    /// Make `call` on `path` sleep before answering.
    pub fn delay_on(self, path: impl Into<PathBuf>, call: MockCall, delay: Duration) -> Self {
        self.lock().delays.insert((path.into(), call), delay);
        self
    }

    /// Add or replace a working copy after construction.
    pub fn set_repo(&self, path: impl Into<PathBuf>, repo: MockRepo) {
        self.lock().repos.insert(path.into(), repo);
    }

    /// Current state of a working copy (for test verification).
    pub fn repo(&self, path: &Path) -> Option<MockRepo> {
        self.lock().repos.get(path).cloned()
    }

    /// Remove every injected failure.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Get all recorded operations, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Number of times `call` was made, across all paths.
    pub fn call_count(&self, call: MockCall) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| op.call == call)
            .count()
    }

    /// Calls made for one path, in call order.
    pub fn calls_for(&self, path: &Path) -> Vec<MockCall> {
        self.lock()
            .operations
            .iter()
            .filter(|op| op.path == path)
            .map(|op| op.call)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call, apply injected latency, then return the injected
    /// failure or the stored repository.
    fn enter(&self, call: MockCall, path: &Path) -> Result<MockRepo, VcsError> {
        let delay = {
            let mut inner = self.lock();
            inner.operations.push(MockOperation {
                call,
                path: path.to_path_buf(),
            });
            inner.delays.get(&(path.to_path_buf(), call)).copied()
        };

        // Sleep outside the lock so other workers keep going.
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let inner = self.lock();
        if let Some(error) = inner.failures.get(&(path.to_path_buf(), call)) {
            return Err(error.clone());
        }
        inner
            .repos
            .get(path)
            .cloned()
            .ok_or_else(|| VcsError::adapter(path, "unknown mock repository"))
    }

    fn update(&self, path: &Path, f: impl FnOnce(&mut MockRepo)) {
        if let Some(repo) = self.lock().repos.get_mut(path) {
            f(repo);
        }
    }
}

impl VcsAdapter for MockAdapter {
    fn kind(&self) -> VcsKind {
        self.kind
    }

    fn check_exists(&self, path: &Path) -> bool {
        self.enter(MockCall::CheckExists, path)
            .map(|repo| repo.exists)
            .unwrap_or(false)
    }

    fn is_dirty(&self, path: &Path, _include_untracked: bool) -> Result<bool, VcsError> {
        self.enter(MockCall::IsDirty, path).map(|repo| repo.dirty)
    }

    fn active_ref(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        self.enter(MockCall::ActiveRef, &descriptor.path)
            .map(|repo| repo.active_ref)
    }

    fn local_revision(&self, path: &Path) -> Result<Revision, VcsError> {
        self.enter(MockCall::LocalRevision, path)
            .map(|repo| repo.revision)
    }

    fn remote_revision(&self, descriptor: &RepositoryDescriptor) -> Result<Revision, VcsError> {
        let repo = self.enter(MockCall::RemoteRevision, &descriptor.path)?;
        Ok(match repo.signal {
            RemoteSignal::Revisions { remote, .. } => Revision::Number(remote),
            RemoteSignal::StatusText(_) => repo.revision,
        })
    }

    fn remote_signal(&self, descriptor: &RepositoryDescriptor) -> Result<RemoteSignal, VcsError> {
        self.enter(MockCall::RemoteSignal, &descriptor.path)
            .map(|repo| repo.signal)
    }

    fn status_text(&self, path: &Path, _include_untracked: bool) -> Result<String, VcsError> {
        self.enter(MockCall::StatusText, path)
            .map(|repo| repo.status_text)
    }

    fn used_url(&self, path: &Path) -> Result<String, VcsError> {
        self.enter(MockCall::UsedUrl, path).map(|repo| repo.used_url)
    }

    fn fetch(&self, path: &Path) -> Result<(), VcsError> {
        self.enter(MockCall::Fetch, path).map(|_| ())
    }

    fn pull(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        self.enter(MockCall::Pull, &descriptor.path)?;
        self.update(&descriptor.path, MockRepo::catch_up);
        Ok("Already up to date.".to_string())
    }

    fn push(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        self.enter(MockCall::Push, &descriptor.path)?;
        self.update(&descriptor.path, MockRepo::publish);
        Ok("pushed".to_string())
    }

    fn clone_repo(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        self.enter(MockCall::Clone, &descriptor.path)?;
        let branch = descriptor.expected_branch.clone();
        self.update(&descriptor.path, |repo| {
            repo.exists = true;
            if let Some(branch) = branch {
                repo.active_ref = branch;
            }
            repo.catch_up();
        });
        Ok(format!(
            "cloned {} into {}",
            descriptor.remote_url,
            descriptor.path.display()
        ))
    }

    fn open_in_explorer(&self, path: &Path) -> Result<(), VcsError> {
        self.enter(MockCall::OpenExplorer, path).map(|_| ())
    }

    fn open_in_shell(&self, path: &Path) -> Result<(), VcsError> {
        self.enter(MockCall::OpenShell, path).map(|_| ())
    }

    fn open_in_browser(&self, descriptor: &RepositoryDescriptor) -> Result<(), VcsError> {
        self.enter(MockCall::OpenBrowser, &descriptor.path)
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_path_does_not_exist() {
        let adapter = MockAdapter::new(VcsKind::Git);
        assert!(!adapter.check_exists(Path::new("/nowhere")));
        assert!(matches!(
            adapter.is_dirty(Path::new("/nowhere"), true),
            Err(VcsError::Adapter { .. })
        ));
    }

    #[test]
    fn records_operations_per_path() {
        let adapter = MockAdapter::new(VcsKind::Git)
            .with_repo("/a", MockRepo::default())
            .with_repo("/b", MockRepo::default().dirty(true));

        assert!(adapter.check_exists(Path::new("/a")));
        assert!(adapter.is_dirty(Path::new("/b"), false).unwrap());

        assert_eq!(adapter.calls_for(Path::new("/a")), vec![MockCall::CheckExists]);
        assert_eq!(adapter.calls_for(Path::new("/b")), vec![MockCall::IsDirty]);
        assert_eq!(adapter.operations().len(), 2);

        adapter.clear_operations();
        assert!(adapter.operations().is_empty());
    }

    #[test]
    fn clone_materializes_missing_repo() {
        let adapter = MockAdapter::new(VcsKind::Git).with_repo("/r1", MockRepo::missing());
        let d = RepositoryDescriptor::new("/r1", "git@example.com:org/r1.git").with_branch("dev");

        assert!(!adapter.check_exists(&d.path));
        adapter.clone_repo(&d).unwrap();
        assert!(adapter.check_exists(&d.path));
        assert_eq!(adapter.repo(&d.path).unwrap().active_ref, "dev");
    }

    #[test]
    fn push_publishes_local_revision() {
        let adapter =
            MockAdapter::new(VcsKind::Svn).with_repo("/wc", MockRepo::default().revisions(12, 10));
        let d = RepositoryDescriptor::new("/wc", "https://svn.example.com/repos");

        adapter.push(&d).unwrap();
        assert_eq!(
            adapter.repo(&d.path).unwrap().signal,
            RemoteSignal::Revisions {
                local: 12,
                remote: 12
            }
        );
    }

    #[test]
    fn injected_failure_leaves_state_untouched() {
        let adapter = MockAdapter::new(VcsKind::Git)
            .with_repo("/r", MockRepo::default().status("Your branch is behind 'origin/main'"))
            .fail_on(
                "/r",
                MockCall::Pull,
                VcsError::Command {
                    path: "/r".into(),
                    raw_output: "merge conflict".into(),
                },
            );
        let d = RepositoryDescriptor::new("/r", "u");

        let err = adapter.pull(&d).unwrap_err();
        assert_eq!(err.to_string(), "merge conflict");
        assert_eq!(
            adapter.repo(&d.path).unwrap().signal,
            RemoteSignal::StatusText("Your branch is behind 'origin/main'".into())
        );

        adapter.clear_failures();
        assert!(adapter.pull(&d).is_ok());
    }
}
