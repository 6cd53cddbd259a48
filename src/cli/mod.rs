//! cli
//!
//! Command-line interface layer for repodash.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the `tracing` subscriber
//! - Load configuration and delegate to command handlers
//! - Does NOT touch working copies directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and drives a
//! [`crate::engine::Dispatcher`] per repository table. All working copy
//! access flows through the engine and its adapters.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell, TableFilter};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let ctx = commands::Context {
        config: cli.config.clone(),
        table: cli.table,
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    commands::dispatch(cli.command, &ctx)
}

/// Diagnostics go to stderr. `--debug` turns on this crate's debug events;
/// otherwise `RUST_LOG` applies, defaulting to errors only so the
/// user-facing log lines are not repeated.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("repodash=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    // A second initialisation (tests calling run twice) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
