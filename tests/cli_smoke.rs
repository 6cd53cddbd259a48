//! Smoke tests for the repodash binary.
//!
//! These run the real executable against config files in temporary
//! directories. Repositories point at folders that do not exist, or at
//! bare `.git` marker folders, so no `git` or `svn` process is ever started.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn repodash() -> Command {
    let mut cmd = Command::cargo_bin("repodash").unwrap();
    // Keep the developer's own config out of the picture.
    cmd.env_remove("REPODASH_CONFIG")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", "/nonexistent-xdg")
        .env("HOME", "/nonexistent-home");
    cmd
}

/// A config with one missing Git repository and one missing SVN working copy.
fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let git_path = dir.child("work/app");
    let svn_path = dir.child("work/assets");
    let config = dir.child("config.toml");
    config
        .write_str(&format!(
            r#"
[engine]
max_workers = 2

[git_table]
AutoUpdate = true
[[git_table.repo]]
Path = "{}"
Url = "git@example.com:org/app.git"
Branch = "main"

[svn_table]
[[svn_table.repo]]
path = "{}"
server_url = "https://svn.example.com/repos"
repo_dir = "assets/trunk"
"#,
            git_path.path().display(),
            svn_path.path().display()
        ))
        .unwrap();
    config.path().to_path_buf()
}

#[test]
fn help_lists_commands() {
    repodash()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn version_flag_works() {
    repodash()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("repodash"));
}

#[test]
fn completion_generates_script() {
    repodash()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repodash"));
}

#[test]
fn missing_config_is_reported() {
    repodash()
        .args(["--config", "/nonexistent/repodash.toml", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn no_config_anywhere_lists_searched_locations() {
    repodash()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no config file found"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.child("config.toml");
    config.write_str("[git_table]\nunknown_key = 1\n").unwrap();

    repodash()
        .arg("--config")
        .arg(config.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn status_json_reports_missing_repositories() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = repodash()
        .arg("--config")
        .arg(&config)
        .args(["status", "--no-fetch", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tables = value.as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["table"], "git");
    assert_eq!(tables[1]["table"], "svn");

    let git_row = &tables[0]["repositories"][0];
    assert_eq!(git_row["exists"], false);
    assert_eq!(git_row["local_dirty"], true);
    assert_eq!(git_row["remote_state"], "not_applicable");
    assert_eq!(git_row["expected_branch"], "main");

    let svn_row = &tables[1]["repositories"][0];
    assert_eq!(
        svn_row["remote_url"],
        "https://svn.example.com/repos/assets/trunk"
    );

    dir.close().unwrap();
}

#[test]
fn status_logs_table_updates_to_stderr() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    repodash()
        .env("REPODASH_CONFIG", &config)
        .args(["--table", "git", "status", "--no-fetch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Git repositories"))
        .stdout(predicate::str::contains("SVN repositories").not())
        .stderr(predicate::str::contains("[Info] Update git repository table..."))
        .stderr(predicate::str::contains("...done!"));
}

#[test]
fn quiet_status_has_no_info_lines() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    repodash()
        .arg("--config")
        .arg(&config)
        .args(["-q", "status", "--no-fetch"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[Info]").not());
}

#[test]
fn pull_rejects_unconfigured_path() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    repodash()
        .arg("--config")
        .arg(&config)
        .args(["pull", "/somewhere/else"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a configured repository"));
}

#[test]
fn pull_with_nothing_to_do_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    repodash()
        .arg("--config")
        .arg(&config)
        .args(["--table", "git", "pull"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to pull."));
}

#[test]
fn open_rejects_unconfigured_path() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    repodash()
        .arg("--config")
        .arg(&config)
        .args(["open", "/somewhere/else", "--in", "shell"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a configured repository"));
}

#[test]
fn watch_rejects_zero_interval() {
    repodash()
        .args(["watch", "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1 second"));
}

#[test]
fn watch_without_auto_update_tables_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    repodash()
        .arg("--config")
        .arg(&config)
        .args(["--table", "svn", "watch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no table has auto_update enabled"));
}

#[test]
fn table_filter_without_matching_table_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.child("config.toml");
    config
        .write_str("[git_table]\n[[git_table.repo]]\npath = \"/x\"\nurl = \"u\"\n")
        .unwrap();

    repodash()
        .arg("--config")
        .arg(config.path())
        .args(["--table", "svn", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no repository tables configured"));
}

#[test]
fn discover_prints_config_entries() {
    let dir = TempDir::new().unwrap();
    dir.child("work/app/.git").create_dir_all().unwrap();
    dir.child("work/app/nested/.git").create_dir_all().unwrap();
    dir.child("work/notes").create_dir_all().unwrap();

    repodash()
        .arg("discover")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[[git_table.repo]]"))
        .stdout(predicate::str::contains("app"))
        .stdout(predicate::str::contains("nested").not())
        .stdout(predicate::str::contains("svn_table").not());
}

#[test]
fn discover_honors_table_filter() {
    let dir = TempDir::new().unwrap();
    dir.child("app/.git").create_dir_all().unwrap();

    repodash()
        .args(["--table", "svn", "discover"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No working copies found"));
}

#[test]
fn discover_rejects_missing_folder() {
    repodash()
        .args(["discover", "/nonexistent/repodash-root"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}
