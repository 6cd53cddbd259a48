//! Integration tests for the Git adapter.
//!
//! These tests build real repositories with the `git` CLI inside tempfile
//! directories: a bare "remote" plus clones of it, so ahead, behind and
//! diverged states come from actual commits and fetches.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use repodash::core::types::{RemoteState, RepositoryDescriptor, VcsKind};
use repodash::engine::classify::classify_descriptor;
use repodash::engine::UnrecognizedStatus;
use repodash::vcs::{AdapterOptions, GitAdapter, VcsAdapter, VcsError};

/// A bare remote on branch `main` with one commit, plus a seed clone used
/// to publish further commits.
struct Remote {
    root: TempDir,
    bare: PathBuf,
    seed: PathBuf,
}

impl Remote {
    fn new() -> Self {
        let root = TempDir::new().expect("failed to create temp dir");
        let bare = root.path().join("remote.git");
        run_git(root.path(), &["init", "--bare", bare.to_str().unwrap()]);
        run_git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let seed = root.path().join("seed");
        run_git(
            root.path(),
            &["clone", bare.to_str().unwrap(), seed.to_str().unwrap()],
        );
        configure(&seed);
        run_git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        commit_file(&seed, "README.md", "# Test Repo\n", "Initial commit");
        run_git(&seed, &["push", "-u", "origin", "main"]);

        Self { root, bare, seed }
    }

    fn url(&self) -> String {
        self.bare.to_string_lossy().to_string()
    }

    /// Clone the remote into `name`.
    fn clone(&self, name: &str) -> PathBuf {
        let path = self.root.path().join(name);
        run_git(
            self.root.path(),
            &["clone", self.bare.to_str().unwrap(), path.to_str().unwrap()],
        );
        configure(&path);
        path
    }

    /// Commit in the seed clone and push it to the remote.
    fn publish(&self, file: &str, content: &str) {
        commit_file(&self.seed, file, content, &format!("Update {}", file));
        run_git(&self.seed, &["push"]);
    }

    fn descriptor(&self, path: &Path) -> RepositoryDescriptor {
        RepositoryDescriptor::new(path, self.url()).with_branch("main")
    }
}

fn configure(path: &Path) {
    run_git(path, &["config", "user.email", "test@example.com"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "pull.rebase", "false"]);
}

fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo.join(file), content).unwrap();
    run_git(repo, &["add", file]);
    run_git(repo, &["commit", "-m", message]);
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("LC_ALL", "C")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn adapter() -> GitAdapter {
    GitAdapter::new(AdapterOptions::default())
}

fn state_of(adapter: &GitAdapter, descriptor: &RepositoryDescriptor) -> RemoteState {
    classify_descriptor(adapter, descriptor, true, UnrecognizedStatus::Error).remote_state
}

#[test]
fn fresh_clone_is_clean_and_up_to_date() {
    let remote = Remote::new();
    let path = remote.clone("work");
    let git = adapter();
    let d = remote.descriptor(&path);

    assert!(git.check_exists(&path));
    assert!(!git.is_dirty(&path, true).unwrap());
    assert_eq!(git.active_ref(&d).unwrap(), "main");
    assert_eq!(git.used_url(&path).unwrap(), remote.url());

    let status = classify_descriptor(&git, &d, true, UnrecognizedStatus::Error);
    assert!(status.exists);
    assert!(!status.local_dirty);
    assert_eq!(status.remote_state, RemoteState::UpToDate);
    assert_eq!(status.remote_label(), "Up-to-Date");
    assert_eq!(status.revision.len(), 7);
    assert!(!status.branch_mismatch());
}

#[test]
fn local_commit_requires_push() {
    let remote = Remote::new();
    let path = remote.clone("work");
    commit_file(&path, "local.txt", "local\n", "Local work");

    let git = adapter();
    assert_eq!(state_of(&git, &remote.descriptor(&path)), RemoteState::PushRequired);
}

#[test]
fn remote_commit_requires_pull_after_fetch() {
    let remote = Remote::new();
    let path = remote.clone("work");
    remote.publish("remote.txt", "remote\n");

    let git = adapter();
    let d = remote.descriptor(&path);

    // Nothing is known about the new commit until a fetch.
    assert_eq!(state_of(&git, &d), RemoteState::UpToDate);

    git.fetch(&path).unwrap();
    assert_eq!(state_of(&git, &d), RemoteState::PullRequired);

    git.pull(&d).unwrap();
    assert_eq!(state_of(&git, &d), RemoteState::UpToDate);
    assert!(path.join("remote.txt").exists());
}

#[test]
fn commits_on_both_sides_diverge() {
    let remote = Remote::new();
    let path = remote.clone("work");
    commit_file(&path, "local.txt", "local\n", "Local work");
    remote.publish("remote.txt", "remote\n");

    let git = adapter();
    git.fetch(&path).unwrap();

    let d = remote.descriptor(&path);
    assert_eq!(state_of(&git, &d), RemoteState::PullAndPush);
    assert_eq!(RemoteState::PullAndPush.label(VcsKind::Git), "Pull and Push");
}

#[test]
fn push_publishes_local_commits() {
    let remote = Remote::new();
    let path = remote.clone("work");
    commit_file(&path, "local.txt", "local\n", "Local work");

    let git = adapter();
    let d = remote.descriptor(&path);
    git.push(&d).unwrap();

    assert_eq!(state_of(&git, &d), RemoteState::UpToDate);
    assert_eq!(
        git.remote_revision(&d).unwrap(),
        git.local_revision(&path).unwrap()
    );
}

#[test]
fn untracked_files_only_count_when_requested() {
    let remote = Remote::new();
    let path = remote.clone("work");
    std::fs::write(path.join("scratch.txt"), "notes\n").unwrap();

    let git = adapter();
    assert!(git.is_dirty(&path, true).unwrap());
    assert!(!git.is_dirty(&path, false).unwrap());
    assert!(git
        .status_text(&path, true)
        .unwrap()
        .contains("?? scratch.txt"));
    assert!(!git
        .status_text(&path, false)
        .unwrap()
        .contains("scratch.txt"));
}

#[test]
fn modified_tracked_file_is_dirty() {
    let remote = Remote::new();
    let path = remote.clone("work");
    std::fs::write(path.join("README.md"), "# Changed\n").unwrap();

    let git = adapter();
    assert!(git.is_dirty(&path, false).unwrap());
    assert!(git
        .status_text(&path, false)
        .unwrap()
        .contains("README.md"));
}

#[test]
fn pull_over_local_changes_reports_backend_text() {
    let remote = Remote::new();
    let path = remote.clone("work");
    remote.publish("README.md", "# From remote\n");
    std::fs::write(path.join("README.md"), "# Local edit\n").unwrap();

    let git = adapter();
    let err = git.pull(&remote.descriptor(&path)).unwrap_err();

    match &err {
        VcsError::Command { raw_output, .. } => {
            assert!(!raw_output.starts_with("error: "));
            assert!(raw_output.contains("would be overwritten"));
        }
        other => panic!("expected a command error, got {:?}", other),
    }
    assert!(!err.to_string().contains("Aborting"));
}

#[test]
fn branch_mismatch_is_visible() {
    let remote = Remote::new();
    let path = remote.clone("work");
    run_git(&path, &["checkout", "-b", "feature"]);

    let git = adapter();
    let d = remote.descriptor(&path);
    let status = classify_descriptor(&git, &d, true, UnrecognizedStatus::FailOpen);
    assert_eq!(status.active_ref, "feature");
    assert!(status.branch_mismatch());

    // A branch without upstream has no tracking text at all.
    let strict = classify_descriptor(&git, &d, true, UnrecognizedStatus::Error);
    assert_eq!(strict.remote_state, RemoteState::Error);
    assert!(strict.raw_status_text.starts_with("unrecognized status"));
}

#[test]
fn missing_folder_short_circuits() {
    let remote = Remote::new();
    let path = remote.root.path().join("not-cloned");
    let git = adapter();
    let d = remote.descriptor(&path);

    assert!(!git.check_exists(&path));
    let status = classify_descriptor(&git, &d, true, UnrecognizedStatus::Error);
    assert!(!status.exists);
    assert!(status.local_dirty);
    assert_eq!(status.remote_state, RemoteState::NotApplicable);
    assert_eq!(status.remote_label(), "");
}

#[test]
fn clone_repo_creates_working_copy() {
    let remote = Remote::new();
    let path = remote.root.path().join("fresh");
    let git = adapter();
    let d = remote.descriptor(&path);

    let message = git.clone_repo(&d).unwrap();
    assert!(message.contains("cloned"));
    assert!(git.check_exists(&path));
    assert_eq!(git.active_ref(&d).unwrap(), "main");
}

#[test]
fn clone_of_unknown_remote_fails_with_command_error() {
    let remote = Remote::new();
    let path = remote.root.path().join("fresh");
    let d = RepositoryDescriptor::new(&path, remote.root.path().join("nope.git").to_string_lossy());

    let err = adapter().clone_repo(&d).unwrap_err();
    assert!(matches!(err, VcsError::Command { .. }));
    assert!(err.to_string().contains("does not exist"));
}
