//! engine::collect
//!
//! Parallel status collection.
//!
//! Both passes run one task per descriptor on [`run_bounded`] and return
//! results in completion order; callers join on `path`. Per-repository
//! failures are folded into the results. A batch that hits its deadline
//! logs exactly one warning and returns what finished.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::classify::{classify_descriptor, UnrecognizedStatus};
use super::pool::{run_bounded, BatchOutcome, PoolOptions};
use crate::core::types::{RepositoryDescriptor, RepositoryStatus};
use crate::ui::log::LogSink;
use crate::vcs::{VcsAdapter, VcsError};

/// Default deadline for a fetch pass.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Options for a collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Width and deadline of the status pass.
    pub pool: PoolOptions,
    /// Deadline of the fetch pass.
    pub fetch_timeout: Duration,
    pub include_untracked: bool,
    pub unrecognized: UnrecognizedStatus,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            pool: PoolOptions::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            include_untracked: true,
            unrecognized: UnrecognizedStatus::default(),
        }
    }
}

/// Result of fetching one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(PathBuf),
    /// Not a working copy; nothing to fetch.
    Skipped(PathBuf),
    Failed(PathBuf, VcsError),
}

/// Classify every descriptor.
pub async fn collect_statuses(
    adapter: Arc<dyn VcsAdapter>,
    descriptors: Vec<RepositoryDescriptor>,
    options: &CollectOptions,
    sink: &dyn LogSink,
) -> BatchOutcome<RepositoryStatus> {
    let include_untracked = options.include_untracked;
    let policy = options.unrecognized;

    let outcome = run_bounded(descriptors, &options.pool, move |descriptor| {
        debug!(path = %descriptor.path.display(), "status start");
        let status = classify_descriptor(adapter.as_ref(), &descriptor, include_untracked, policy);
        debug!(path = %descriptor.path.display(), state = ?status.remote_state, "status done");
        status
    })
    .await;

    report_batch("Status check", &outcome, options.pool.timeout, sink);
    outcome
}

/// Fetch every descriptor that is a working copy.
///
/// Failures are logged as warnings and never stop the batch.
pub async fn prefetch(
    adapter: Arc<dyn VcsAdapter>,
    descriptors: Vec<RepositoryDescriptor>,
    options: &CollectOptions,
    sink: &dyn LogSink,
) -> BatchOutcome<FetchOutcome> {
    let pool = options.pool.with_timeout(options.fetch_timeout);

    let outcome = run_bounded(descriptors, &pool, move |descriptor| {
        let path = descriptor.path;
        if !adapter.check_exists(&path) {
            return FetchOutcome::Skipped(path);
        }
        debug!(path = %path.display(), "fetch start");
        match adapter.fetch(&path) {
            Ok(()) => FetchOutcome::Fetched(path),
            Err(err) => FetchOutcome::Failed(path, err),
        }
    })
    .await;

    for result in &outcome.results {
        if let FetchOutcome::Failed(path, err) = result {
            sink.warning(&format!("{}:\n{}", path.display(), err));
        }
    }
    report_batch("Fetch", &outcome, pool.timeout, sink);
    outcome
}

/// Log batch-level problems: one warning for a timeout, one for panics.
pub(crate) fn report_batch<R>(
    what: &str,
    outcome: &BatchOutcome<R>,
    timeout: Duration,
    sink: &dyn LogSink,
) {
    if outcome.timed_out {
        sink.warning(&format!(
            "{} timed out after {}s: {} of {} repositories did not finish",
            what,
            timeout.as_secs_f32(),
            outcome.abandoned(),
            outcome.expected
        ));
    }
    if outcome.failed > 0 {
        sink.warning(&format!(
            "{} failed unexpectedly for {} repositories",
            what, outcome.failed
        ));
    }
}
