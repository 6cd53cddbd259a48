//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use crate::core::types::{ActionResult, RepositoryStatus};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

const HEADERS: [&str; 5] = ["PATH", "BRANCH", "LOCAL", "REMOTE", "REVISION"];

/// Render status rows as an aligned text table.
///
/// Missing working copies show `-` for branch and `missing` for the local
/// column. A branch that differs from the expected one is flagged.
///
/// ```
/// use repodash::core::types::{RepositoryDescriptor, RepositoryStatus, VcsKind};
/// use repodash::ui::output::format_status_table;
///
/// let d = RepositoryDescriptor::new("/r1", "url");
/// let table = format_status_table(&[RepositoryStatus::missing(&d, VcsKind::Git)]);
/// assert!(table.lines().nth(1).unwrap().starts_with("/r1"));
/// assert!(table.contains("missing"));
/// ```
pub fn format_status_table(rows: &[RepositoryStatus]) -> String {
    let cells: Vec<[String; 5]> = rows.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(join_padded(&HEADERS.map(String::from), &widths));
    for row in &cells {
        lines.push(join_padded(row, &widths));
    }
    lines.join("\n")
}

fn row_cells(status: &RepositoryStatus) -> [String; 5] {
    let branch = if !status.exists {
        "-".to_string()
    } else if status.branch_mismatch() {
        format!(
            "{} (expected {})",
            status.active_ref,
            status.expected_branch.as_deref().unwrap_or_default()
        )
    } else {
        status.active_ref.clone()
    };

    let local = if !status.exists {
        "missing"
    } else if status.local_dirty {
        "dirty"
    } else {
        "clean"
    };

    [
        status.path.display().to_string(),
        branch,
        local.to_string(),
        status.remote_label().to_string(),
        status.revision.clone(),
    ]
}

fn join_padded(cells: &[String; 5], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// One line per action result.
pub fn format_results(results: &[ActionResult]) -> String {
    results
        .iter()
        .map(|r| {
            let mark = if r.succeeded { "ok" } else { "failed" };
            format!("{} {}: {}", mark, r.path.display(), first_line(&r.message))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
