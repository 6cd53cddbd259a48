//! ui::log
//!
//! User-facing log sink.
//!
//! # Design
//!
//! Engine components never print. They receive an `Arc<dyn LogSink>` and
//! report progress through it, so the presentation decides where lines go:
//!
//! - [`ConsoleSink`] - timestamped lines on stderr, verbosity aware
//! - [`TracingSink`] - forwards to `tracing` events
//! - [`MemorySink`] - captures lines for tests and embedding
//!
//! Lines read `[HH:MM:SS] [Info] message` or `[HH:MM:SS] [Warning] message`.

use std::fmt;
use std::sync::Mutex;

use chrono::{Local, NaiveTime};

use super::output::Verbosity;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Warning => write!(f, "Warning"),
        }
    }
}

/// Destination for user-facing progress and failure messages.
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => self.info(message),
            LogLevel::Warning => self.warning(message),
        }
    }
}

/// Format one log line.
///
/// ```
/// use chrono::NaiveTime;
/// use repodash::ui::log::{format_line, LogLevel};
///
/// let at = NaiveTime::from_hms_opt(9, 5, 3).unwrap();
/// assert_eq!(
///     format_line(at, LogLevel::Warning, "/r1:\nfatal"),
///     "[09:05:03] [Warning] /r1:\nfatal"
/// );
/// ```
pub fn format_line(at: NaiveTime, level: LogLevel, message: &str) -> String {
    format!("[{}] [{}] {}", at.format("%H:%M:%S"), level, message)
}

/// Writes timestamped lines to stderr.
///
/// Info lines are dropped in quiet mode; warnings are always shown.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    verbosity: Verbosity,
}

impl ConsoleSink {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn emit(&self, level: LogLevel, message: &str) {
        eprintln!("{}", format_line(Local::now().time(), level, message));
    }
}

impl LogSink for ConsoleSink {
    fn info(&self, message: &str) {
        if self.verbosity != Verbosity::Quiet {
            self.emit(LogLevel::Info, message);
        }
    }

    fn warning(&self, message: &str) {
        self.emit(LogLevel::Warning, message);
    }
}

/// Forwards lines to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "repodash", "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "repodash", "{}", message);
    }
}

/// One captured line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warning)
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(LogLevel::Info)
    }

    /// Whether any line at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lock().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

impl LogSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.push(LogLevel::Warning, message);
    }
}
