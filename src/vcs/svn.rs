//! vcs::svn
//!
//! SVN adapter driving the `svn` command-line client.
//!
//! SVN has no separate fetch step: the remote revision is queried directly
//! from the server when the status is classified, so [`VcsAdapter::fetch`]
//! succeeds without doing anything. Commit and checkout are not provided and
//! return [`VcsError::NotImplemented`].

use std::path::Path;

use super::command::{run_tool, ToolOutput};
use super::shell::{self, OpenTarget};
use super::{AdapterOptions, RemoteSignal, Revision, VcsAdapter, VcsError};
use crate::core::types::{RepositoryDescriptor, VcsKind};

const SVN: &str = "svn";

/// First-column codes of `svn status` that mark a working copy dirty:
/// modified, added, deleted, conflicted, missing.
const DIRTY_CODES: &[char] = &['M', 'A', 'D', 'C', '!'];

/// Code for items not under version control.
const UNVERSIONED: char = '?';

/// SVN-backed [`VcsAdapter`].
#[derive(Debug, Clone, Default)]
pub struct SvnAdapter {
    options: AdapterOptions,
}

impl SvnAdapter {
    pub fn new(options: AdapterOptions) -> Self {
        Self { options }
    }

    /// Run `svn` non-interactively inside the working copy.
    fn svn_in(path: &Path, args: &[&str]) -> Result<ToolOutput, VcsError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.extend_from_slice(args);
        full.push("--non-interactive");

        let output = run_tool(SVN, &full, Some(path), path)?;
        if output.success {
            Ok(output)
        } else {
            Err(VcsError::command(path, output.failure_text()))
        }
    }

    fn info_item(path: &Path, item: &str, target: Option<&str>) -> Result<String, VcsError> {
        let mut args = vec!["info", "--show-item", item];
        if let Some(target) = target {
            args.push(target);
        }
        Ok(Self::svn_in(path, &args)?.stdout)
    }

    fn last_changed(path: &Path, target: Option<&str>) -> Result<u64, VcsError> {
        let raw = Self::info_item(path, "last-changed-revision", target)?;
        raw.trim().parse().map_err(|_| {
            VcsError::adapter(path, format!("unexpected revision output: {:?}", raw))
        })
    }

    fn dirty_entries(path: &Path, include_untracked: bool) -> Result<Vec<String>, VcsError> {
        let output = Self::svn_in(path, &["status"])?;
        Ok(parse_status(&output.stdout, include_untracked))
    }
}

impl VcsAdapter for SvnAdapter {
    fn kind(&self) -> VcsKind {
        VcsKind::Svn
    }

    fn is_dirty(&self, path: &Path, include_untracked: bool) -> Result<bool, VcsError> {
        Ok(!Self::dirty_entries(path, include_untracked)?.is_empty())
    }

    fn active_ref(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        let url = self.used_url(&descriptor.path)?;
        Ok(branch_below(&url, &descriptor.remote_url))
    }

    fn local_revision(&self, path: &Path) -> Result<Revision, VcsError> {
        Self::last_changed(path, None).map(Revision::Number)
    }

    fn remote_revision(&self, descriptor: &RepositoryDescriptor) -> Result<Revision, VcsError> {
        let location = descriptor.remote_location();
        Self::last_changed(&descriptor.path, Some(&location)).map(Revision::Number)
    }

    fn remote_signal(&self, descriptor: &RepositoryDescriptor) -> Result<RemoteSignal, VcsError> {
        let local = Self::last_changed(&descriptor.path, None)?;
        let location = descriptor.remote_location();
        let remote = Self::last_changed(&descriptor.path, Some(&location))?;
        Ok(RemoteSignal::Revisions { local, remote })
    }

    fn status_text(&self, path: &Path, include_untracked: bool) -> Result<String, VcsError> {
        Ok(Self::dirty_entries(path, include_untracked)?.join("\n"))
    }

    fn used_url(&self, path: &Path) -> Result<String, VcsError> {
        Self::info_item(path, "url", None)
    }

    fn fetch(&self, _path: &Path) -> Result<(), VcsError> {
        Ok(())
    }

    fn pull(&self, descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        Ok(Self::svn_in(&descriptor.path, &["update"])?.stdout)
    }

    fn push(&self, _descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        Err(VcsError::NotImplemented {
            backend: VcsKind::Svn,
            operation: "commit",
        })
    }

    fn clone_repo(&self, _descriptor: &RepositoryDescriptor) -> Result<String, VcsError> {
        Err(VcsError::NotImplemented {
            backend: VcsKind::Svn,
            operation: "checkout",
        })
    }

    fn open_in_explorer(&self, path: &Path) -> Result<(), VcsError> {
        shell::open(OpenTarget::Explorer, path, self.options.shell.as_deref(), None)
    }

    fn open_in_shell(&self, path: &Path) -> Result<(), VcsError> {
        shell::open(OpenTarget::Shell, path, self.options.shell.as_deref(), None)
    }

    fn open_in_browser(&self, descriptor: &RepositoryDescriptor) -> Result<(), VcsError> {
        let location = descriptor.remote_location();
        shell::open(
            OpenTarget::Browser,
            &descriptor.path,
            self.options.shell.as_deref(),
            Some(&location),
        )
    }
}

/// Dirty entries from `svn status` output, as `"<code> <path>"` lines.
fn parse_status(output: &str, include_untracked: bool) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let code = line.chars().next()?;
            let dirty = DIRTY_CODES.contains(&code) || (include_untracked && code == UNVERSIONED);
            if !dirty {
                return None;
            }
            // Seven status columns, a space, then the path.
            let item = line.get(8..).unwrap_or_default().trim();
            Some(format!("{} {}", code, item))
        })
        .collect()
}

/// Path of `url` below `server`, or the whole URL when it lies elsewhere.
fn branch_below(url: &str, server: &str) -> String {
    let server = server.trim_end_matches('/');
    match url.strip_prefix(server) {
        Some(rest) if !server.is_empty() => rest.trim_matches('/').to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "\
M       src/main.c
?       notes.txt
!       gone.h
A  +    copied.c
X       vendor/lib

Performing status on external item at 'vendor/lib':
C       conflict.txt";

    #[test]
    fn status_parsing_without_untracked() {
        let entries = parse_status(STATUS, false);
        assert_eq!(
            entries,
            vec![
                "M src/main.c",
                "! gone.h",
                "A copied.c",
                "C conflict.txt"
            ]
        );
    }

    #[test]
    fn status_parsing_with_untracked() {
        let entries = parse_status(STATUS, true);
        assert!(entries.contains(&"? notes.txt".to_string()));
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn branch_is_relative_to_server() {
        assert_eq!(
            branch_below(
                "https://svn.example.com/repos/assets/trunk",
                "https://svn.example.com/repos/"
            ),
            "assets/trunk"
        );
        assert_eq!(
            branch_below("https://other.example.com/x", "https://svn.example.com/repos"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn commit_and_checkout_are_not_implemented() {
        let adapter = SvnAdapter::default();
        let d = RepositoryDescriptor::new("/wc", "https://svn.example.com/repos");
        assert!(matches!(
            adapter.push(&d),
            Err(VcsError::NotImplemented { operation: "commit", .. })
        ));
        assert!(matches!(
            adapter.clone_repo(&d),
            Err(VcsError::NotImplemented { operation: "checkout", .. })
        ));
    }

    #[test]
    fn fetch_is_a_no_op() {
        let adapter = SvnAdapter::default();
        assert!(adapter.fetch(Path::new("/does/not/matter")).is_ok());
    }
}
