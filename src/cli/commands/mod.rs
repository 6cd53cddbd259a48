//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the configuration and selects tables
//! 2. Builds one engine dispatcher per table
//! 3. Formats and displays output
//!
//! Handlers do NOT touch working copies directly.
//!
//! # Async Commands
//!
//! The engine is async. Handlers are synchronous wrappers that build a
//! multi-threaded runtime, `block_on` the async implementation, and shut the
//! runtime down with a bounded wait so a stuck backend thread abandoned by a
//! batch deadline cannot keep the process alive.

mod actions;
mod completion;
mod discover;
mod open;
mod status;
mod watch;

pub use actions::{clone, pull, push};
pub use completion::completion;
pub use discover::discover;
pub use open::open;
pub use status::status;
pub use watch::watch;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::cli::args::{Command, TableFilter};
use crate::core::config::{Config, TableConfig};
use crate::core::types::RepositoryStatus;
use crate::engine::Dispatcher;
use crate::ui::log::{ConsoleSink, LogSink};
use crate::ui::output::{self, Verbosity};
use crate::vcs::adapter_for;

/// How long runtime shutdown waits for abandoned blocking work.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Settings from global flags, shared by every handler.
#[derive(Debug, Clone)]
pub struct Context {
    /// `--config` override
    pub config: Option<PathBuf>,
    pub table: TableFilter,
    pub verbosity: Verbosity,
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Status { no_fetch, json } => status::status(ctx, no_fetch, json),
        Command::Pull { paths } => actions::pull(ctx, &paths),
        Command::Push { paths } => actions::push(ctx, &paths),
        Command::Clone { paths } => actions::clone(ctx, &paths),
        Command::Open { path, target } => open::open(ctx, &path, target.into()),
        Command::Watch { interval } => watch::watch(ctx, interval),
        Command::Discover { root, depth } => discover::discover(ctx, &root, depth),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Run a future to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(future);
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(output)
}

/// Load the config and the tables selected by `--table`.
pub(crate) fn load_tables(ctx: &Context) -> Result<(Config, Vec<TableConfig>)> {
    let config = Config::load(ctx.config.as_deref())?;
    let tables: Vec<TableConfig> = config
        .tables()?
        .into_iter()
        .filter(|t| ctx.table.includes(t.kind))
        .collect();

    if tables.is_empty() {
        bail!(
            "no repository tables configured in '{}'",
            config.path().display()
        );
    }
    Ok((config, tables))
}

/// Build the dispatcher for one table.
pub(crate) fn dispatcher(
    config: &Config,
    table: &TableConfig,
    sink: Arc<dyn LogSink>,
) -> Dispatcher {
    Dispatcher::new(
        adapter_for(table.kind, &config.adapter_options()),
        table.descriptors.clone(),
        sink,
        config.collect_options(),
    )
    .with_action_timeout(config.action_timeout())
}

pub(crate) fn console_sink(ctx: &Context) -> Arc<dyn LogSink> {
    Arc::new(ConsoleSink::new(ctx.verbosity))
}

/// Print one table's rows under a heading.
pub(crate) fn print_table(table: &TableConfig, rows: &[RepositoryStatus], verbosity: Verbosity) {
    let heading = match table.kind {
        crate::core::types::VcsKind::Git => "Git repositories",
        crate::core::types::VcsKind::Svn => "SVN repositories",
    };
    output::print(heading, verbosity);
    println!("{}", output::format_status_table(rows));
}
