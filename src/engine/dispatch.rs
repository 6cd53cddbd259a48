//! engine::dispatch
//!
//! Refresh, pull, push and clone workflows for one repository table.
//!
//! # Lifecycle
//!
//! Every action runs the same phases in order:
//!
//! ```text
//! [Fetch] -> Mutate -> Reclassify -> Merge -> Report
//! ```
//!
//! Refresh has a fetch pass and no mutation; the mutating actions skip the
//! fetch. Progress is published as [`ActionState`] on a `watch` channel so a
//! presentation layer can follow along without polling the table.
//!
//! # Targets
//!
//! Actions take a subset of paths (empty means every descriptor). Within the
//! subset, each action only touches rows it makes sense for:
//!
//! | Action | Targets                               |
//! |--------|---------------------------------------|
//! | pull   | rows whose working copy exists        |
//! | push   | rows whose remote state is `PushRequired` |
//! | clone  | rows whose working copy does not exist |
//!
//! After mutating, the whole subset is reclassified and merged.
//!
//! Merged records follow descriptor order, whatever order the workers
//! finished in. A descriptor whose status check missed the deadline is
//! merged as an `Error` row rather than left out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use super::collect::{collect_statuses, prefetch, report_batch, CollectOptions};
use super::pool::run_bounded;
use super::table::RepositoryTable;
use crate::core::types::{
    ActionKind, ActionResult, DescriptorList, RepositoryDescriptor, RepositoryStatus, VcsKind,
};
use crate::ui::log::LogSink;
use crate::vcs::{OpenTarget, VcsAdapter, VcsError};

/// Default deadline for a pull, push or clone batch.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from dispatcher entry points that act on a single repository.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown repository: {0}")]
    UnknownPath(PathBuf),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("background task failed: {0}")]
    Join(String),
}

/// Phase of a running action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Fetch,
    Mutate,
    Reclassify,
    Merge,
    Report,
}

/// Observable state of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Running { action: ActionKind, phase: ActionPhase },
    Done(ActionKind),
    /// At least one target failed or a batch hit its deadline.
    Failed(ActionKind),
}

impl ActionState {
    pub fn is_running(&self) -> bool {
        matches!(self, ActionState::Running { .. })
    }
}

/// Outcome of one dispatcher invocation.
#[derive(Debug, Clone)]
pub struct ActionReport {
    pub action: ActionKind,
    /// One result per mutated target. Empty for refresh.
    pub results: Vec<ActionResult>,
    /// Fresh status records merged into the table.
    pub statuses: Vec<RepositoryStatus>,
    /// Some batch hit its deadline.
    pub timed_out: bool,
    /// Terminal state: `Done` or `Failed`.
    pub state: ActionState,
}

impl ActionReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.state, ActionState::Done(_))
    }
}

/// Drives actions for one table.
pub struct Dispatcher {
    adapter: Arc<dyn VcsAdapter>,
    descriptors: RwLock<DescriptorList>,
    table: RepositoryTable,
    sink: Arc<dyn LogSink>,
    options: CollectOptions,
    action_timeout: Duration,
    fetch: bool,
    state: watch::Sender<ActionState>,
}

impl Dispatcher {
    pub fn new(
        adapter: Arc<dyn VcsAdapter>,
        descriptors: DescriptorList,
        sink: Arc<dyn LogSink>,
        options: CollectOptions,
    ) -> Self {
        let (state, _) = watch::channel(ActionState::Idle);
        Self {
            adapter,
            descriptors: RwLock::new(descriptors),
            table: RepositoryTable::new(),
            sink,
            options,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            fetch: true,
            state,
        }
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Refresh from what the working copies already know, without a
    /// fetch pass.
    pub fn without_fetch(mut self) -> Self {
        self.fetch = false;
        self
    }

    pub fn kind(&self) -> VcsKind {
        self.adapter.kind()
    }

    pub fn table(&self) -> &RepositoryTable {
        &self.table
    }

    pub fn descriptors(&self) -> DescriptorList {
        self.descriptors
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Follow action progress.
    pub fn subscribe(&self) -> watch::Receiver<ActionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ActionState {
        *self.state.borrow()
    }

    /// Install a new descriptor list and rebuild the whole table.
    pub async fn reload(&self, descriptors: DescriptorList) -> ActionReport {
        *self.descriptors.write().unwrap_or_else(|e| e.into_inner()) = descriptors;
        let all = self.descriptors().as_slice().to_vec();
        self.refresh_subset(all, true).await
    }

    /// Fetch and reclassify a subset, merging into the table.
    pub async fn refresh(&self, paths: &[PathBuf]) -> ActionReport {
        let subset = self.resolve(paths);
        self.refresh_subset(subset, false).await
    }

    /// Refresh everything. Suitable for a periodic timer.
    pub async fn run_cycle(&self) -> ActionReport {
        self.refresh(&[]).await
    }

    pub async fn pull(&self, paths: &[PathBuf]) -> ActionReport {
        let subset = self.resolve(paths);
        let targets = self.targets(&subset, |row| row.exists);
        self.mutate(ActionKind::Pull, subset, targets).await
    }

    /// Push rows that have local commits to publish; other rows in the
    /// subset are only reclassified.
    pub async fn push(&self, paths: &[PathBuf]) -> ActionReport {
        let subset = self.resolve(paths);
        let targets = self.targets(&subset, |row| row.remote_state.needs_push());
        self.mutate(ActionKind::Push, subset, targets).await
    }

    /// Clone or check out rows whose working copy does not exist yet.
    pub async fn clone_missing(&self, paths: &[PathBuf]) -> ActionReport {
        let subset = self.resolve(paths);
        let targets = self.targets(&subset, |row| !row.exists);
        self.mutate(ActionKind::Clone, subset, targets).await
    }

    /// Open a repository in the explorer, a terminal or a browser.
    pub async fn open(&self, path: &Path, target: OpenTarget) -> Result<(), DispatchError> {
        let descriptor = self
            .descriptors()
            .get(path)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownPath(path.to_path_buf()))?;
        let adapter = Arc::clone(&self.adapter);

        let result = tokio::task::spawn_blocking(move || match target {
            OpenTarget::Explorer => adapter.open_in_explorer(&descriptor.path),
            OpenTarget::Shell => adapter.open_in_shell(&descriptor.path),
            OpenTarget::Browser => adapter.open_in_browser(&descriptor),
        })
        .await
        .map_err(|e| DispatchError::Join(e.to_string()))?;

        Ok(result?)
    }

    fn set_phase(&self, action: ActionKind, phase: ActionPhase) {
        debug!(%action, ?phase, "phase");
        self.state.send_replace(ActionState::Running { action, phase });
    }

    /// Descriptors for `paths`, warning about paths that are not configured.
    fn resolve(&self, paths: &[PathBuf]) -> Vec<RepositoryDescriptor> {
        let descriptors = self.descriptors();
        for path in paths {
            if descriptors.get(path).is_none() {
                self.sink
                    .warning(&format!("{}: not a configured repository, skipped", path.display()));
            }
        }
        descriptors.select(paths)
    }

    /// Members of `subset` whose current table row satisfies `predicate`.
    fn targets(
        &self,
        subset: &[RepositoryDescriptor],
        predicate: impl Fn(&RepositoryStatus) -> bool,
    ) -> Vec<RepositoryDescriptor> {
        subset
            .iter()
            .filter(|d| self.table.get(&d.path).map_or(false, |row| predicate(&row)))
            .cloned()
            .collect()
    }

    async fn refresh_subset(&self, subset: Vec<RepositoryDescriptor>, full: bool) -> ActionReport {
        let action = ActionKind::Refresh;
        self.sink
            .info(&format!("Update {} repository table...", self.kind()));

        let (fetch_timed_out, fetch_failed) = if self.fetch {
            self.set_phase(action, ActionPhase::Fetch);
            let fetched = prefetch(
                Arc::clone(&self.adapter),
                subset.clone(),
                &self.options,
                self.sink.as_ref(),
            )
            .await;
            (fetched.timed_out, fetched.failed > 0)
        } else {
            (false, false)
        };

        self.set_phase(action, ActionPhase::Reclassify);
        let collected = collect_statuses(
            Arc::clone(&self.adapter),
            subset.clone(),
            &self.options,
            self.sink.as_ref(),
        )
        .await;

        self.set_phase(action, ActionPhase::Merge);
        let statuses = self.in_descriptor_order(&subset, collected.results);
        if full {
            self.table.replace_all(statuses.clone());
        } else {
            self.table.merge_patch(statuses.clone());
        }

        self.set_phase(action, ActionPhase::Report);
        let timed_out = fetch_timed_out || collected.timed_out;
        let failed = timed_out || fetch_failed || collected.failed > 0;
        self.finish(action, Vec::new(), statuses, timed_out, failed)
    }

    async fn mutate(
        &self,
        action: ActionKind,
        subset: Vec<RepositoryDescriptor>,
        targets: Vec<RepositoryDescriptor>,
    ) -> ActionReport {
        self.sink
            .info(&format!("{} {} repositories...", verb(action), self.kind()));

        self.set_phase(action, ActionPhase::Mutate);
        let target_paths: Vec<PathBuf> = targets.iter().map(|d| d.path.clone()).collect();
        let adapter = Arc::clone(&self.adapter);
        let pool = self.options.pool.with_timeout(self.action_timeout);
        let outcome = run_bounded(targets, &pool, move |descriptor| {
            debug!(%action, path = %descriptor.path.display(), "mutate start");
            let result = match action {
                ActionKind::Pull => adapter.pull(&descriptor),
                ActionKind::Push => adapter.push(&descriptor),
                ActionKind::Clone => adapter.clone_repo(&descriptor),
                ActionKind::Refresh => adapter.fetch(&descriptor.path).map(|_| String::new()),
            };
            match result {
                Ok(message) => ActionResult::success(&descriptor.path, action, message),
                Err(err) => ActionResult::failure(&descriptor.path, action, err.to_string()),
            }
        })
        .await;
        report_batch(&verb(action), &outcome, pool.timeout, self.sink.as_ref());

        let mut results = outcome.results;
        let mutate_timed_out = outcome.timed_out;
        let mutate_panicked = outcome.failed > 0;
        for path in target_paths {
            if !results.iter().any(|r| r.path == path) {
                results.push(ActionResult::failure(
                    path,
                    action,
                    format!("did not finish within {}s", pool.timeout.as_secs_f32()),
                ));
            }
        }

        self.set_phase(action, ActionPhase::Reclassify);
        let collected = collect_statuses(
            Arc::clone(&self.adapter),
            subset.clone(),
            &self.options,
            self.sink.as_ref(),
        )
        .await;

        self.set_phase(action, ActionPhase::Merge);
        let statuses = self.in_descriptor_order(&subset, collected.results);
        self.table.merge_patch(statuses.clone());

        self.set_phase(action, ActionPhase::Report);
        for result in &results {
            let line = format!("{}:\n{}", result.path.display(), result.message);
            if result.succeeded {
                self.sink.info(&line);
            } else {
                self.sink.warning(&line);
            }
        }

        let timed_out = mutate_timed_out || collected.timed_out;
        let failed = timed_out
            || mutate_panicked
            || collected.failed > 0
            || results.iter().any(|r| !r.succeeded);
        self.finish(action, results, statuses, timed_out, failed)
    }

    /// Arrange collected records in descriptor order. A descriptor whose
    /// status check did not finish gets an `Error` row.
    fn in_descriptor_order(
        &self,
        subset: &[RepositoryDescriptor],
        collected: Vec<RepositoryStatus>,
    ) -> Vec<RepositoryStatus> {
        let mut by_path: HashMap<PathBuf, RepositoryStatus> = collected
            .into_iter()
            .map(|status| (status.path.clone(), status))
            .collect();
        let timeout = self.options.pool.timeout;

        subset
            .iter()
            .map(|descriptor| {
                by_path.remove(&descriptor.path).unwrap_or_else(|| {
                    RepositoryStatus::failed(
                        descriptor,
                        self.kind(),
                        format!(
                            "status check did not finish within {}s",
                            timeout.as_secs_f32()
                        ),
                    )
                })
            })
            .collect()
    }

    fn finish(
        &self,
        action: ActionKind,
        results: Vec<ActionResult>,
        statuses: Vec<RepositoryStatus>,
        timed_out: bool,
        failed: bool,
    ) -> ActionReport {
        self.sink.info("...done!");
        let state = if failed {
            ActionState::Failed(action)
        } else {
            ActionState::Done(action)
        };
        self.state.send_replace(state);

        ActionReport {
            action,
            results,
            statuses,
            timed_out,
            state,
        }
    }
}

fn verb(action: ActionKind) -> String {
    match action {
        ActionKind::Refresh => "Refresh",
        ActionKind::Pull => "Pull",
        ActionKind::Push => "Push",
        ActionKind::Clone => "Clone",
    }
    .to_string()
}
