//! cli::commands::watch
//!
//! Keep tables up to date on a timer until interrupted.
//!
//! With `--interval` every selected table refreshes at that period.
//! Without it, only tables with `auto_update = true` run, each at its own
//! `auto_update_interval_secs`. Each table gets its own loop; a slow
//! refresh in one table does not hold back the others.

use std::time::Duration;

use anyhow::{bail, Result};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{block_on, console_sink, dispatcher, load_tables, print_table, Context};
use crate::core::config::TableConfig;
use crate::engine::Dispatcher;
use crate::ui::output::{self, Verbosity};

/// Run the watch command.
pub fn watch(ctx: &Context, interval: Option<u64>) -> Result<()> {
    if interval == Some(0) {
        bail!("--interval must be at least 1 second");
    }

    let (config, tables) = load_tables(ctx)?;
    let timed: Vec<(TableConfig, Duration)> = tables
        .into_iter()
        .filter_map(|table| {
            let period = match interval {
                Some(secs) => Duration::from_secs(secs),
                None if table.settings.auto_update() => table.settings.interval(),
                None => return None,
            };
            Some((table, period))
        })
        .collect();

    if timed.is_empty() {
        bail!("no table has auto_update enabled; pass --interval to watch anyway");
    }

    let sink = console_sink(ctx);
    let verbosity = ctx.verbosity;

    block_on(async move {
        let mut loops = JoinSet::new();
        for (table, period) in timed {
            let d = dispatcher(&config, &table, sink.clone());
            loops.spawn(watch_table(d, table, period, verbosity));
        }

        tokio::select! {
            signal = tokio::signal::ctrl_c() => signal?,
            Some(joined) = loops.join_next() => {
                if let Err(err) = joined {
                    bail!("watch loop failed: {}", err);
                }
            }
        }

        loops.abort_all();
        output::print("Stopped watching.", verbosity);
        Ok::<(), anyhow::Error>(())
    })?
}

/// Rebuild the table once, then run a refresh cycle every `period`.
async fn watch_table(d: Dispatcher, table: TableConfig, period: Duration, verbosity: Verbosity) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    ticker.tick().await;
    d.reload(table.descriptors.clone()).await;
    print_table(&table, &d.table().snapshot(), verbosity);

    loop {
        ticker.tick().await;
        debug!(kind = %table.kind, generation = d.table().generation(), "timer refresh");
        d.run_cycle().await;
        print_table(&table, &d.table().snapshot(), verbosity);
    }
}
