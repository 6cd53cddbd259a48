//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <file>`: Use this config file instead of searching
//! - `--table git|svn|all`: Restrict to one repository table
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::types::VcsKind;
use crate::vcs::discover::DEFAULT_MAX_DEPTH;
use crate::vcs::OpenTarget;

/// repodash - Sync state of your local Git and SVN working copies at a glance
#[derive(Parser, Debug)]
#[command(name = "repodash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: $REPODASH_CONFIG, then the standard locations)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Which repository table to act on
    #[arg(long, global = true, value_enum, default_value_t = TableFilter::All)]
    pub table: TableFilter,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; only warnings and results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Table selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFilter {
    Git,
    Svn,
    All,
}

impl TableFilter {
    pub fn includes(&self, kind: VcsKind) -> bool {
        match self {
            TableFilter::All => true,
            TableFilter::Git => kind == VcsKind::Git,
            TableFilter::Svn => kind == VcsKind::Svn,
        }
    }
}

/// Where `open` sends a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OpenIn {
    Explorer,
    Shell,
    Browser,
}

impl From<OpenIn> for OpenTarget {
    fn from(value: OpenIn) -> Self {
        match value {
            OpenIn::Explorer => OpenTarget::Explorer,
            OpenIn::Shell => OpenTarget::Shell,
            OpenIn::Browser => OpenTarget::Browser,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the sync state of every configured repository
    #[command(
        long_about = "Show the sync state of every configured repository.\n\n\
            Fetches from each remote, then reports per repository the checked-out \
            branch, whether the working copy has local changes, and how it relates \
            to its remote (Up-to-Date, Pull required, Push your data, Pull and Push).",
        after_help = "\
EXAMPLES:
    # Full status of all tables
    repodash status

    # Skip the network fetch; use what the working copies already know
    repodash status --no-fetch

    # Machine-readable output for scripting
    repodash status --json --table git"
    )]
    Status {
        /// Do not fetch before classifying
        #[arg(long)]
        no_fetch: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pull (Git) or update (SVN) existing working copies
    Pull {
        /// Repositories to pull (default: all)
        paths: Vec<PathBuf>,
    },

    /// Push repositories that have local commits to publish
    #[command(
        long_about = "Push repositories that have local commits to publish.\n\n\
            Only repositories whose remote state is 'Push your data' are pushed; \
            the others are refreshed and left alone."
    )]
    Push {
        /// Repositories to push (default: all)
        paths: Vec<PathBuf>,
    },

    /// Clone configured repositories whose folder does not exist yet
    Clone {
        /// Repositories to clone (default: all missing)
        paths: Vec<PathBuf>,
    },

    /// Open a repository in the file explorer, a terminal, or a browser
    Open {
        /// Repository path as configured
        path: PathBuf,

        /// Where to open it
        #[arg(long = "in", value_enum, default_value_t = OpenIn::Explorer)]
        target: OpenIn,
    },

    /// Refresh periodically until interrupted
    #[command(
        long_about = "Refresh periodically until interrupted.\n\n\
            Prints the table after each cycle. Without --interval only tables with \
            auto_update enabled are watched, each at its auto_update_interval_secs \
            (900 seconds by default). With --interval every selected table is \
            refreshed at that period."
    )]
    Watch {
        /// Seconds between refreshes (overrides the config)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Find working copies below a folder and print config entries for them
    #[command(
        long_about = "Find working copies below a folder and print config entries for them.\n\n\
            Every directory holding a .git or .svn folder is reported once; the search \
            does not descend into working copies. Remote URLs and checked-out branches \
            are read from the working copies themselves. The output is TOML that can be \
            pasted into the config file.",
        after_help = "\
EXAMPLES:
    # Everything below ~/work
    repodash discover ~/work

    # Only Git repositories, at most two levels deep
    repodash discover ~/work --depth 2 --table git"
    )]
    Discover {
        /// Folder to search
        root: PathBuf,

        /// How many levels below the folder to search
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        depth: usize,
    },

    /// Generate shell completion scripts
    #[command(after_help = "\
INSTALLATION:
    # Bash
    repodash completion bash > ~/.local/share/bash-completion/completions/repodash

    # Zsh
    repodash completion zsh > ~/.zfunc/_repodash

    # Fish
    repodash completion fish > ~/.config/fish/completions/repodash.fish

    # PowerShell
    repodash completion powershell >> $PROFILE")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shells supported by `completion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
