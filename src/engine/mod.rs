//! engine
//!
//! Status reconciliation: decides how each working copy relates to its
//! remote and keeps a table of the answers current.
//!
//! # Architecture
//!
//! ```text
//! descriptors -> collect (adapter + classify on the pool) -> table
//!                    ^                                        |
//!                    +---------- dispatch (mutate) <----------+
//! ```
//!
//! - [`classify`] - Pure mapping from adapter output to a remote state
//! - [`pool`] - The one bounded worker pool every phase runs on
//! - [`collect`] - Parallel fetch and status passes
//! - [`table`] - Path-keyed records with replace and merge
//! - [`dispatch`] - Refresh, pull, push and clone workflows
//!
//! # Invariants
//!
//! - Per-repository failures never escalate; they become `Error` records or
//!   failed action results
//! - A batch that exceeds its deadline returns partial results and logs one
//!   warning
//! - The table is the only state shared across phases
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use repodash::core::types::{DescriptorList, RepositoryDescriptor, VcsKind};
//! use repodash::engine::{CollectOptions, Dispatcher};
//! use repodash::ui::log::TracingSink;
//! use repodash::vcs::{adapter_for, AdapterOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let list = DescriptorList::new(vec![
//!     RepositoryDescriptor::new("/work/app", "git@github.com:org/app.git").with_branch("main"),
//! ])?;
//! let dispatcher = Dispatcher::new(
//!     adapter_for(VcsKind::Git, &AdapterOptions::default()),
//!     list.clone(),
//!     Arc::new(TracingSink),
//!     CollectOptions::default(),
//! );
//!
//! dispatcher.reload(list).await;
//! for row in dispatcher.table().snapshot() {
//!     println!("{} {}", row.path.display(), row.remote_label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod collect;
pub mod dispatch;
pub mod pool;
pub mod table;

pub use classify::UnrecognizedStatus;
pub use collect::{collect_statuses, prefetch, CollectOptions, FetchOutcome};
pub use dispatch::{ActionPhase, ActionReport, ActionState, DispatchError, Dispatcher};
pub use pool::{run_bounded, BatchOutcome, PoolOptions};
pub use table::RepositoryTable;
