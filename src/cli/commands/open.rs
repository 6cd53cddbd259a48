//! cli::commands::open
//!
//! Open a configured repository in the file explorer, a terminal, or the
//! browser. The path must belong to one of the selected tables.

use std::path::Path;

use anyhow::{anyhow, Result};

use super::{block_on, console_sink, dispatcher, load_tables, Context};
use crate::vcs::OpenTarget;

/// Run the open command.
pub fn open(ctx: &Context, path: &Path, target: OpenTarget) -> Result<()> {
    let (config, tables) = load_tables(ctx)?;
    let table = tables
        .iter()
        .find(|t| t.descriptors.get(path).is_some())
        .ok_or_else(|| anyhow!("not a configured repository: {}", path.display()))?;

    let d = dispatcher(&config, table, console_sink(ctx));
    block_on(d.open(path, target))??;
    Ok(())
}
