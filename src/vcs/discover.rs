//! vcs::discover
//!
//! Finding working copies below a root folder.
//!
//! A directory holding a `.git` or `.svn` folder is a working copy. The
//! walk does not descend into working copies, so submodules and nested
//! checkouts are not reported separately.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::VcsAdapter;
use crate::core::types::{RepositoryDescriptor, VcsKind};

/// How many levels below the root are searched by default.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// A working copy found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredRepo {
    pub kind: VcsKind,
    pub path: PathBuf,
}

/// Backend whose metadata folder `dir` contains, if any.
pub fn working_copy_kind(dir: &Path) -> Option<VcsKind> {
    [VcsKind::Git, VcsKind::Svn]
        .into_iter()
        .find(|kind| dir.join(kind.metadata_dir()).is_dir())
}

/// Walk `root` up to `max_depth` levels deep and collect working copies,
/// sorted by path.
///
/// Unreadable directories are skipped. Symlinks are not followed.
pub fn find_working_copies(root: &Path, max_depth: usize) -> Vec<DiscoveredRepo> {
    let mut found = Vec::new();
    let mut entries = WalkDir::new(root)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = entries.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(kind) = working_copy_kind(entry.path()) {
            found.push(DiscoveredRepo {
                kind,
                path: entry.path().to_path_buf(),
            });
            entries.skip_current_dir();
        }
    }

    debug!(root = %root.display(), count = found.len(), "discovery done");
    found
}

/// Descriptor for a discovered working copy, filled from what the working
/// copy records about itself: its remote and (Git) its checked-out branch.
///
/// Values the backend cannot read are left empty.
pub fn describe(adapter: &dyn VcsAdapter, repo: &DiscoveredRepo) -> RepositoryDescriptor {
    let url = adapter.used_url(&repo.path).unwrap_or_else(|err| {
        debug!(path = %repo.path.display(), %err, "no remote recorded");
        String::new()
    });
    let descriptor = RepositoryDescriptor::new(&repo.path, url);

    match repo.kind {
        VcsKind::Git => match adapter.active_ref(&descriptor) {
            Ok(branch) if !branch.is_empty() => descriptor.with_branch(branch),
            _ => descriptor,
        },
        VcsKind::Svn => descriptor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::mock::{MockAdapter, MockRepo};
    use tempfile::TempDir;

    fn mark(root: &Path, rel: &str, kind: VcsKind) {
        std::fs::create_dir_all(root.join(rel).join(kind.metadata_dir())).unwrap();
    }

    #[test]
    fn finds_git_and_svn_working_copies_in_path_order() {
        let root = TempDir::new().unwrap();
        mark(root.path(), "b/assets", VcsKind::Svn);
        mark(root.path(), "a/app", VcsKind::Git);
        std::fs::create_dir_all(root.path().join("c/empty")).unwrap();

        let found = find_working_copies(root.path(), DEFAULT_MAX_DEPTH);

        assert_eq!(
            found,
            vec![
                DiscoveredRepo {
                    kind: VcsKind::Git,
                    path: root.path().join("a/app"),
                },
                DiscoveredRepo {
                    kind: VcsKind::Svn,
                    path: root.path().join("b/assets"),
                },
            ]
        );
    }

    #[test]
    fn does_not_descend_into_working_copies() {
        let root = TempDir::new().unwrap();
        mark(root.path(), "app", VcsKind::Git);
        mark(root.path(), "app/vendor/lib", VcsKind::Git);

        let found = find_working_copies(root.path(), DEFAULT_MAX_DEPTH);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, root.path().join("app"));
    }

    #[test]
    fn root_itself_can_be_a_working_copy() {
        let root = TempDir::new().unwrap();
        mark(root.path(), ".", VcsKind::Svn);
        mark(root.path(), "sub", VcsKind::Git);

        let found = find_working_copies(root.path(), DEFAULT_MAX_DEPTH);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, VcsKind::Svn);
    }

    #[test]
    fn depth_limit_is_respected() {
        let root = TempDir::new().unwrap();
        mark(root.path(), "one/two/three", VcsKind::Git);

        assert!(find_working_copies(root.path(), 2).is_empty());
        assert_eq!(find_working_copies(root.path(), 3).len(), 1);
    }

    #[test]
    fn missing_root_finds_nothing() {
        assert!(find_working_copies(Path::new("/nonexistent/repodash-root"), 4).is_empty());
    }

    #[test]
    fn describe_reads_url_and_branch() {
        let mock = MockAdapter::new(VcsKind::Git).with_repo(
            "/wc/app",
            MockRepo::default()
                .used_url("git@example.com:org/app.git")
                .on_ref("develop"),
        );
        let repo = DiscoveredRepo {
            kind: VcsKind::Git,
            path: PathBuf::from("/wc/app"),
        };

        let d = describe(&mock, &repo);

        assert_eq!(d.remote_url, "git@example.com:org/app.git");
        assert_eq!(d.expected_branch.as_deref(), Some("develop"));
    }

    #[test]
    fn describe_leaves_unreadable_values_empty() {
        let mock = MockAdapter::new(VcsKind::Git);
        let repo = DiscoveredRepo {
            kind: VcsKind::Git,
            path: PathBuf::from("/wc/unknown"),
        };

        let d = describe(&mock, &repo);

        assert_eq!(d.remote_url, "");
        assert_eq!(d.expected_branch, None);
    }
}
