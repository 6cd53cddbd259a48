//! Repodash - sync state dashboard for local Git and SVN working copies
//!
//! Repodash watches a configured set of working copies and reports, per
//! repository, whether it exists, which branch is checked out, whether it
//! has local changes, and how it relates to its remote (up to date, pull
//! required, push required, diverged). It can pull, push and clone in
//! bulk and open a repository in the explorer, a terminal or a browser.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, drives the engine)
//! - [`engine`] - Bounded worker pool, classification, status table, actions
//! - [`core`] - Domain types and configuration
//! - [`vcs`] - One adapter per version-control backend
//! - [`ui`] - Log sinks and output formatting
//!
//! # Invariants
//!
//! 1. Repository paths are unique within a table
//! 2. Results are joined to rows by path, never by position
//! 3. A failure in one repository never aborts the batch
//! 4. Every batch finishes within its deadline; late work is abandoned

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
pub mod vcs;
