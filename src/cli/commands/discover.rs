//! discover command - Print config entries for working copies found on disk

use std::path::Path;

use anyhow::{bail, Result};

use super::Context;
use crate::core::config::schema::{GitRepoEntry, SvnRepoEntry};
use crate::core::config::DashboardConfig;
use crate::core::types::VcsKind;
use crate::ui::output;
use crate::vcs::discover::{describe, find_working_copies};
use crate::vcs::{adapter_for, AdapterOptions};

/// Search `root` and print a config fragment listing what was found.
pub fn discover(ctx: &Context, root: &Path, depth: usize) -> Result<()> {
    if !root.is_dir() {
        bail!("not a directory: {}", root.display());
    }

    let found: Vec<_> = find_working_copies(root, depth)
        .into_iter()
        .filter(|repo| ctx.table.includes(repo.kind))
        .collect();
    if found.is_empty() {
        output::print(
            format!("No working copies found below {}.", root.display()),
            ctx.verbosity,
        );
        return Ok(());
    }

    let options = AdapterOptions::default();
    let git = adapter_for(VcsKind::Git, &options);
    let svn = adapter_for(VcsKind::Svn, &options);

    let mut config = DashboardConfig::default();
    for repo in &found {
        match repo.kind {
            VcsKind::Git => {
                let d = describe(git.as_ref(), repo);
                config
                    .git_table
                    .get_or_insert_with(Default::default)
                    .repo
                    .push(GitRepoEntry {
                        path: d.path,
                        url: d.remote_url,
                        branch: d.expected_branch,
                    });
            }
            VcsKind::Svn => {
                let d = describe(svn.as_ref(), repo);
                config
                    .svn_table
                    .get_or_insert_with(Default::default)
                    .repo
                    .push(SvnRepoEntry {
                        path: d.path,
                        server_url: d.remote_url,
                        repo_dir: None,
                    });
            }
        }
    }

    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
