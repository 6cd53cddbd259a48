//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`log`] - Log sink injected into the engine
//! - [`output`] - Table and result formatting, verbosity
//!
//! # Design
//!
//! All output goes through this module. The engine only sees the
//! [`log::LogSink`] trait; the CLI picks the implementation.

pub mod log;
pub mod output;
