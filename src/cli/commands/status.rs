//! cli::commands::status
//!
//! Show the sync state of every configured repository.
//!
//! # Example
//!
//! ```bash
//! # Fetch, classify, print
//! repodash status
//!
//! # Only the SVN table, as JSON
//! repodash status --table svn --json
//! ```

use anyhow::Result;
use serde_json::json;

use super::{block_on, console_sink, dispatcher, load_tables, print_table, Context};

/// Run the status command.
pub fn status(ctx: &Context, no_fetch: bool, json: bool) -> Result<()> {
    let (config, tables) = load_tables(ctx)?;
    let sink = console_sink(ctx);

    let snapshots = block_on(async {
        let mut snapshots = Vec::with_capacity(tables.len());
        for table in &tables {
            let mut d = dispatcher(&config, table, sink.clone());
            if no_fetch {
                d = d.without_fetch();
            }
            d.reload(table.descriptors.clone()).await;
            snapshots.push(d.table().snapshot());
        }
        snapshots
    })?;

    if json {
        let value: Vec<_> = tables
            .iter()
            .zip(&snapshots)
            .map(|(table, rows)| {
                json!({
                    "table": table.kind,
                    "repositories": rows,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for (table, rows) in tables.iter().zip(&snapshots) {
            print_table(table, rows, ctx.verbosity);
        }
    }

    Ok(())
}
