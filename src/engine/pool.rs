//! engine::pool
//!
//! Bounded worker pool shared by every engine phase.
//!
//! # Design
//!
//! Each item becomes one task in a [`JoinSet`]. A task first takes a permit
//! from a [`Semaphore`] sized to `max_workers`, then runs the synchronous
//! work on `spawn_blocking` while holding it. The whole batch shares one
//! deadline: when it passes, tasks still queued or running are abandoned and
//! their late results are dropped. Blocking threads that are already busy
//! cannot be interrupted; they finish in the background and release their
//! permit when done.
//!
//! The pool never errors out of a batch. Panicking tasks are counted in
//! [`BatchOutcome::failed`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Default number of concurrent workers.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Pool width and batch deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    pub max_workers: usize,
    pub timeout: Duration,
}

impl PoolOptions {
    pub fn new(max_workers: usize, timeout: Duration) -> Self {
        Self {
            max_workers,
            timeout,
        }
    }

    /// Effective worker count; zero is treated as one.
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }

    /// Same width, different deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS, Duration::from_secs(10))
    }
}

/// Results of one batch, in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<R> {
    pub results: Vec<R>,
    /// The deadline passed before every task finished.
    pub timed_out: bool,
    /// Tasks that panicked.
    pub failed: usize,
    /// Number of items submitted.
    pub expected: usize,
}

impl<R> BatchOutcome<R> {
    /// Items that produced neither a result nor a failure.
    pub fn abandoned(&self) -> usize {
        self.expected
            .saturating_sub(self.results.len())
            .saturating_sub(self.failed)
    }

    pub fn is_complete(&self) -> bool {
        !self.timed_out && self.failed == 0 && self.results.len() == self.expected
    }
}

/// Run `task` over `items` with at most `options.workers()` in flight.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use repodash::engine::pool::{run_bounded, PoolOptions};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let options = PoolOptions::new(4, Duration::from_secs(5));
/// let outcome = run_bounded(vec![1, 2, 3], &options, |n| n * 10).await;
///
/// let mut results = outcome.results.clone();
/// results.sort();
/// assert_eq!(results, vec![10, 20, 30]);
/// assert!(outcome.is_complete());
/// # });
/// ```
pub async fn run_bounded<T, R, F>(items: Vec<T>, options: &PoolOptions, task: F) -> BatchOutcome<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let expected = items.len();
    let deadline = Instant::now() + options.timeout;
    let semaphore = Arc::new(Semaphore::new(options.workers()));
    let task = Arc::new(task);

    let mut join_set: JoinSet<Option<R>> = JoinSet::new();
    for item in items {
        let semaphore = Arc::clone(&semaphore);
        let task = Arc::clone(&task);

        join_set.spawn(async move {
            let permit = semaphore.acquire_owned().await.ok()?;
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                task(item)
            });
            handle.await.ok()
        });
    }

    let mut outcome = BatchOutcome {
        results: Vec::with_capacity(expected),
        timed_out: false,
        failed: 0,
        expected,
    };

    loop {
        match timeout_at(deadline, join_set.join_next()).await {
            Ok(Some(Ok(Some(result)))) => outcome.results.push(result),
            Ok(Some(Ok(None))) | Ok(Some(Err(_))) => outcome.failed += 1,
            Ok(None) => break,
            Err(_) => {
                outcome.timed_out = true;
                join_set.abort_all();
                break;
            }
        }
    }

    if outcome.timed_out {
        warn!(
            expected,
            finished = outcome.results.len(),
            timeout_ms = options.timeout.as_millis() as u64,
            "batch deadline passed"
        );
    } else {
        debug!(expected, failed = outcome.failed, "batch finished");
    }

    outcome
}
