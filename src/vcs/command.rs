//! vcs::command
//!
//! Running backend executables.
//!
//! Every `git` and `svn` invocation goes through [`run_tool`], which pins the
//! locale so status text is stable English, disables interactive credential
//! prompts, and normalizes spawn failures into [`VcsError::Adapter`].

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::VcsError;

/// Captured output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout and stderr joined, for commands that report progress on stderr.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            (true, _) => self.stderr.clone(),
        }
    }

    /// Best text to show when the command failed.
    pub fn failure_text(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Run `program` with `args`.
///
/// `cwd` is the working directory; `subject` is the repository path used in
/// error values (they differ for clone, where `cwd` is the parent).
///
/// # Errors
///
/// [`VcsError::Adapter`] when the executable cannot be started. A command
/// that runs and exits non-zero is *not* an error here; callers inspect
/// [`ToolOutput::success`].
pub fn run_tool(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    subject: &Path,
) -> Result<ToolOutput, VcsError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    debug!(program, ?args, path = %subject.display(), "running tool");

    let output = cmd.output().map_err(|e| {
        VcsError::adapter(subject, format!("failed to run {}: {}", program, e))
    })?;

    Ok(ToolOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
