//! vcs::git
//!
//! Git adapter.
//!
//! Local reads (dirty check, active branch, HEAD, origin URL) go through
//! `git2`. Anything that talks to the remote, plus the long-form status text
//! the classifier reads, goes through the `git` executable so the user's
//! credential helpers and SSH configuration apply.
//!
//! # Error Handling
//!
//! `git2` failures and spawn failures become [`VcsError::Adapter`]. A `git`
//! command that exits non-zero becomes [`VcsError::Command`] carrying its
//! stderr with the `fatal: `/`error: ` framing removed.

use std::path::Path;

use super::command::{run_tool, ToolOutput};
use super::shell::{self, OpenTarget};
use super::{AdapterOptions, RemoteSignal, Revision, VcsAdapter, VcsError};
use crate::core::types::{RepositoryDescriptor, VcsKind};

const GIT: &str = "git";

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct WorktreeStatus {
    /// Number of staged changes
    staged: usize,
    /// Number of unstaged changes to tracked files
    unstaged: usize,
    /// Number of untracked files (if requested)
    untracked: usize,
    /// Whether there are unresolved conflicts
    has_conflicts: bool,
}

impl WorktreeStatus {
    fn is_dirty(&self, include_untracked: bool) -> bool {
        self.staged > 0
            || self.unstaged > 0
            || self.has_conflicts
            || (include_untracked && self.untracked > 0)
    }
}

/// Git-backed [`VcsAdapter`].
#[derive(Debug, Clone, Default)]
pub struct GitAdapter {
    options: AdapterOptions,
}

impl GitAdapter {
    pub fn new(options: AdapterOptions) -> Self {
        Self { options }
    }

    fn open(path: &Path) -> Result<git2::Repository, VcsError> {
        git2::Repository::open(path).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => VcsError::NotARepository {
                path: path.to_path_buf(),
                kind: VcsKind::Git,
            },
            _ => VcsError::adapter(path, e.message()),
        })
    }

    fn worktree_status(
        path: &Path,
        include_untracked: bool,
    ) -> Result<WorktreeStatus, VcsError> {
        let repo = Self::open(path)?;
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(include_untracked)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| VcsError::adapter(path, e.message()))?;

        let mut result = WorktreeStatus::default();

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }

            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }

            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    /// Run `git` inside the working copy and fail on non-zero exit.
    fn git_in(path: &Path, args: &[&str]) -> Result<ToolOutput, VcsError> {
        let output = run_tool(GIT, args, Some(path), path)?;
        if output.success {
            Ok(output)
        } else {
            Err(VcsError::command(path, output.failure_text()))
        }
    }

    /// Branch to compare against on the remote.
    fn target_branch(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        match descriptor.expected_branch.as_deref() {
            Some(branch) if !branch.is_empty() => Ok(branch.to_string()),
            _ => self.active_ref(descriptor),
        }
    }
}

impl VcsAdapter for GitAdapter {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn is_dirty(&self, path: &Path, include_untracked: bool) -> Result<bool, VcsError> {
        Ok(Self::worktree_status(path, include_untracked)?.is_dirty(include_untracked))
    }

    fn active_ref(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        let path = descriptor.path.as_path();
        let repo = Self::open(path)?;

        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                // Fresh repository: HEAD names a branch with no commits yet.
                let head_ref = repo
                    .find_reference("HEAD")
                    .map_err(|e| VcsError::adapter(path, e.message()))?;
                let target = head_ref.symbolic_target().unwrap_or_default();
                return Ok(target.trim_start_matches("refs/heads/").to_string());
            }
            Err(e) => return Err(VcsError::adapter(path, e.message())),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }

        let short = head
            .target()
            .map(|oid| oid.to_string().chars().take(7).collect::<String>())
            .unwrap_or_default();
        Ok(format!("(detached {})", short))
    }

    fn local_revision(&self, path: &Path) -> Result<Revision, VcsError> {
        let repo = Self::open(path)?;
        let head = repo.head().map_err(|e| VcsError::adapter(path, e.message()))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| VcsError::adapter(path, e.message()))?;
        Ok(Revision::Commit(commit.id().to_string()))
    }

    fn remote_revision(&self, descriptor: &RepositoryDescriptor) -> Result<Revision, VcsError> {
        let path = descriptor.path.as_path();
        let branch = self.target_branch(descriptor)?;
        let url = if descriptor.remote_url.is_empty() {
            self.used_url(path)?
        } else {
            descriptor.remote_url.clone()
        };
        let refname = format!("refs/heads/{}", branch);

        let output = Self::git_in(path, &["ls-remote", "--heads", &url, &refname])?;
        parse_ls_remote(&output.stdout, &refname)
            .map(Revision::Commit)
            .ok_or_else(|| {
                VcsError::adapter(path, format!("branch '{}' not found on {}", branch, url))
            })
    }

    fn remote_signal(&self, descriptor: &RepositoryDescriptor) -> Result<RemoteSignal, VcsError> {
        let output = Self::git_in(&descriptor.path, &["status"])?;
        Ok(RemoteSignal::StatusText(output.stdout))
    }

    fn status_text(&self, path: &Path, include_untracked: bool) -> Result<String, VcsError> {
        let untracked = if include_untracked { "-unormal" } else { "-uno" };
        let output = Self::git_in(path, &["status", "--short", untracked])?;
        Ok(output.stdout)
    }

    fn used_url(&self, path: &Path) -> Result<String, VcsError> {
        let repo = Self::open(path)?;
        let remote = match repo.find_remote("origin") {
            Ok(remote) => remote,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(String::new()),
            Err(e) => return Err(VcsError::adapter(path, e.message())),
        };
        Ok(remote.url().unwrap_or_default().to_string())
    }

    fn fetch(&self, path: &Path) -> Result<(), VcsError> {
        Self::git_in(path, &["fetch"]).map(|_| ())
    }

    fn pull(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        let output = Self::git_in(&descriptor.path, &["pull"])?;
        Ok(output.stdout)
    }

    fn push(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        let output = Self::git_in(&descriptor.path, &["push"])?;
        Ok(output.combined())
    }

    fn clone_repo(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        let path = descriptor.path.as_path();
        let target = path.to_string_lossy().to_string();

        let mut args = vec!["clone"];
        if let Some(branch) = descriptor.expected_branch.as_deref() {
            if !branch.is_empty() {
                args.extend(["--branch", branch]);
            }
        }
        args.push(descriptor.remote_url.as_str());
        args.push(target.as_str());

        let output = run_tool(GIT, &args, None, path)?;
        if output.success {
            Ok(format!("cloned {} into {}", descriptor.remote_url, path.display()))
        } else {
            Err(VcsError::command(path, output.failure_text()))
        }
    }

    fn open_in_explorer(&self, path: &Path) -> Result<(), VcsError> {
        shell::open(OpenTarget::Explorer, path, self.options.shell.as_deref(), None)
    }

    fn open_in_shell(&self, path: &Path) -> Result<(), VcsError> {
        shell::open(OpenTarget::Shell, path, self.options.shell.as_deref(), None)
    }

    fn open_in_browser(&self, descriptor: &RepositoryDescriptor) -> Result<(), VcsError> {
        let url = match self.used_url(&descriptor.path) {
            Ok(url) if !url.is_empty() => url,
            _ => descriptor.remote_url.clone(),
        };
        shell::open(
            OpenTarget::Browser,
            &descriptor.path,
            self.options.shell.as_deref(),
            Some(&url),
        )
    }
}

/// Find the commit id for `refname` in `git ls-remote` output.
fn parse_ls_remote(output: &str, refname: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (oid, name) = line.split_once('\t')?;
        (name.trim() == refname).then(|| oid.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ls_remote_finds_branch() {
        let output = "1111111111111111111111111111111111111111\trefs/heads/dev\n\
                      2222222222222222222222222222222222222222\trefs/heads/main";
        assert_eq!(
            parse_ls_remote(output, "refs/heads/main").as_deref(),
            Some("2222222222222222222222222222222222222222")
        );
        assert_eq!(parse_ls_remote(output, "refs/heads/nope"), None);
    }

    #[test]
    fn untracked_only_counts_when_requested() {
        let status = WorktreeStatus {
            untracked: 2,
            ..Default::default()
        };
        assert!(status.is_dirty(true));
        assert!(!status.is_dirty(false));
    }

    #[test]
    fn open_non_repository_is_not_a_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = GitAdapter::open(dir.path());
        assert!(matches!(result, Err(VcsError::NotARepository { .. })));
    }
}
