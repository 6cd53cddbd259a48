//! engine::classify
//!
//! Pure mapping from adapter output to [`RemoteState`], plus the
//! per-repository call sequence that produces a [`RepositoryStatus`].
//!
//! # Git
//!
//! The long-form `git status` text is searched for these phrases, first
//! match wins:
//!
//! | Phrase                      | State          |
//! |-----------------------------|----------------|
//! | `Your branch is up to date` | `UpToDate`     |
//! | `Your branch is ahead`      | `PushRequired` |
//! | `Your branch is behind`     | `PullRequired` |
//! | `have diverged`             | `PullAndPush`  |
//!
//! Anything else is resolved by [`UnrecognizedStatus`].
//!
//! # SVN
//!
//! Last-changed revisions are compared numerically.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{RemoteState, RepositoryDescriptor, RepositoryStatus};
use crate::vcs::{RemoteSignal, VcsAdapter, VcsError};

/// Status phrases in match order.
const GIT_PHRASES: &[(&str, RemoteState)] = &[
    ("Your branch is up to date", RemoteState::UpToDate),
    ("Your branch is ahead", RemoteState::PushRequired),
    ("Your branch is behind", RemoteState::PullRequired),
    ("have diverged", RemoteState::PullAndPush),
];

/// What to do with Git status text that matches no known phrase (no
/// upstream configured, detached HEAD, a localized git).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnrecognizedStatus {
    /// Report `UpToDate`.
    #[default]
    FailOpen,
    /// Report `Error` with the text attached.
    Error,
}

/// Classify Git status text.
///
/// Returns `None` when no phrase matches.
///
/// ```
/// use repodash::core::types::RemoteState;
/// use repodash::engine::classify::classify_status_text;
///
/// let text = "Your branch and 'origin/main' have diverged,\n\
///             and have 1 and 2 different commits each, respectively.";
/// assert_eq!(classify_status_text(text), Some(RemoteState::PullAndPush));
/// assert_eq!(classify_status_text("HEAD detached at 1a2b3c4"), None);
/// ```
pub fn classify_status_text(text: &str) -> Option<RemoteState> {
    GIT_PHRASES
        .iter()
        .find(|(phrase, _)| text.contains(phrase))
        .map(|(_, state)| *state)
}

/// Classify SVN last-changed revisions.
pub fn classify_revisions(local: u64, remote: u64) -> RemoteState {
    match local.cmp(&remote) {
        std::cmp::Ordering::Less => RemoteState::PullRequired,
        std::cmp::Ordering::Greater => RemoteState::PushRequired,
        std::cmp::Ordering::Equal => RemoteState::UpToDate,
    }
}

/// Classify any backend signal.
///
/// # Errors
///
/// Returns the unrecognized text when `policy` is [`UnrecognizedStatus::Error`].
pub fn classify(signal: &RemoteSignal, policy: UnrecognizedStatus) -> Result<RemoteState, String> {
    match signal {
        RemoteSignal::Revisions { local, remote } => Ok(classify_revisions(*local, *remote)),
        RemoteSignal::StatusText(text) => match (classify_status_text(text), policy) {
            (Some(state), _) => Ok(state),
            (None, UnrecognizedStatus::FailOpen) => Ok(RemoteState::UpToDate),
            (None, UnrecognizedStatus::Error) => {
                Err(format!("unrecognized status: {}", text.trim()))
            }
        },
    }
}

/// Build the status record for one descriptor.
///
/// Never fails. A folder that is not a working copy short-circuits to
/// [`RepositoryStatus::missing`] after a single `check_exists` call; any
/// adapter error yields a record with `remote_state = Error` and the error
/// text in `raw_status_text`.
pub fn classify_descriptor(
    adapter: &dyn VcsAdapter,
    descriptor: &RepositoryDescriptor,
    include_untracked: bool,
    policy: UnrecognizedStatus,
) -> RepositoryStatus {
    let kind = adapter.kind();
    let path = descriptor.path.as_path();

    if !adapter.check_exists(path) {
        debug!(path = %path.display(), "not a working copy");
        return RepositoryStatus::missing(descriptor, kind);
    }

    match read_status(adapter, descriptor, include_untracked, policy) {
        Ok(status) => status,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "status failed");
            RepositoryStatus::failed(descriptor, kind, err.to_string())
        }
    }
}

fn read_status(
    adapter: &dyn VcsAdapter,
    descriptor: &RepositoryDescriptor,
    include_untracked: bool,
    policy: UnrecognizedStatus,
) -> Result<RepositoryStatus, VcsError> {
    let path = descriptor.path.as_path();

    let signal = adapter.remote_signal(descriptor)?;
    let local_dirty = adapter.is_dirty(path, include_untracked)?;
    let active_ref = adapter.active_ref(descriptor)?;
    let status_text = adapter.status_text(path, include_untracked)?;

    // Informational only; a fresh repository has neither.
    let used_url = adapter.used_url(path).unwrap_or_default();
    let revision = adapter
        .local_revision(path)
        .map(|r| r.short())
        .unwrap_or_default();

    let (remote_state, raw_status_text) = match classify(&signal, policy) {
        Ok(state) => (state, status_text),
        Err(message) => (RemoteState::Error, message),
    };

    Ok(RepositoryStatus {
        path: descriptor.path.clone(),
        kind: adapter.kind(),
        exists: true,
        active_ref,
        local_dirty,
        remote_state,
        raw_status_text,
        remote_url: descriptor.remote_location(),
        used_url,
        expected_branch: descriptor.expected_branch.clone(),
        revision,
    })
}
