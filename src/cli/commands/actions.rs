//! cli::commands::actions
//!
//! Pull, push and clone.
//!
//! Each action first rebuilds the table so target selection sees current
//! state, then mutates the targets and prints the results and the refreshed
//! rows. Push needs an up-to-date remote state and refreshes with a fetch;
//! pull and clone only need to know which working copies exist.
//!
//! Paths given on the command line are matched against each table's
//! configured paths. A path configured in no selected table is an error.

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::{block_on, console_sink, dispatcher, load_tables, print_table, Context};
use crate::core::config::TableConfig;
use crate::core::types::ActionKind;
use crate::engine::ActionReport;
use crate::ui::output;

/// Pull (Git) or update (SVN) existing working copies.
pub fn pull(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    run_action(ctx, ActionKind::Pull, paths)
}

/// Push repositories whose remote state is "Push your data".
pub fn push(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    run_action(ctx, ActionKind::Push, paths)
}

/// Clone repositories whose folder does not exist yet.
pub fn clone(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    run_action(ctx, ActionKind::Clone, paths)
}

fn run_action(ctx: &Context, action: ActionKind, paths: &[PathBuf]) -> Result<()> {
    let (config, tables) = load_tables(ctx)?;

    let unknown: Vec<String> = paths
        .iter()
        .filter(|p| !tables.iter().any(|t| t.descriptors.get(p).is_some()))
        .map(|p| p.display().to_string())
        .collect();
    if !unknown.is_empty() {
        bail!("not a configured repository: {}", unknown.join(", "));
    }

    let sink = console_sink(ctx);
    let reports: Vec<(&TableConfig, ActionReport)> = block_on(async {
        let mut reports = Vec::new();
        for table in &tables {
            let subset = paths_in(table, paths);
            if !paths.is_empty() && subset.is_empty() {
                continue;
            }

            let mut d = dispatcher(&config, table, sink.clone());
            if action != ActionKind::Push {
                d = d.without_fetch();
            }
            d.reload(table.descriptors.clone()).await;

            let report = match action {
                ActionKind::Pull => d.pull(&subset).await,
                ActionKind::Push => d.push(&subset).await,
                ActionKind::Clone => d.clone_missing(&subset).await,
                ActionKind::Refresh => d.refresh(&subset).await,
            };
            reports.push((table, report));
        }
        reports
    })?;

    let mut failed = 0;
    let mut total = 0;
    for (table, report) in &reports {
        if !report.results.is_empty() {
            println!("{}", output::format_results(&report.results));
        }
        print_table(table, &report.statuses, ctx.verbosity);
        total += report.results.len();
        failed += report.results.iter().filter(|r| !r.succeeded).count();
    }

    if total == 0 {
        output::print(format!("Nothing to {}.", action), ctx.verbosity);
    }
    if failed > 0 {
        bail!("{} of {} repositories failed to {}", failed, total, action);
    }
    if reports.iter().any(|(_, r)| r.timed_out) {
        bail!("{} did not finish in time", action);
    }
    Ok(())
}

/// The requested paths that belong to `table`.
fn paths_in(table: &TableConfig, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|p| table.descriptors.get(p).is_some())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TableSettings;
    use crate::core::types::{DescriptorList, RepositoryDescriptor, VcsKind};

    #[test]
    fn paths_are_split_by_table() {
        let table = TableConfig {
            kind: VcsKind::Git,
            descriptors: DescriptorList::new(vec![
                RepositoryDescriptor::new("/a", "u"),
                RepositoryDescriptor::new("/b", "u"),
            ])
            .unwrap(),
            settings: TableSettings::default(),
        };
        let picked = paths_in(&table, &[PathBuf::from("/b"), PathBuf::from("/svn/x")]);
        assert_eq!(picked, vec![PathBuf::from("/b")]);
    }
}
