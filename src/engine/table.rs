//! engine::table
//!
//! Path-keyed table of status records.
//!
//! # Invariants
//!
//! - Paths are unique.
//! - Row order is insertion order; merging never reorders existing rows.
//! - Every mutation happens inside a single write-lock critical section, so
//!   readers see a table either before or after a merge, never in between.
//!
//! A poisoned lock is recovered rather than propagated: the table only ever
//! holds complete records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::types::RepositoryStatus;

#[derive(Debug, Default)]
struct TableInner {
    rows: Vec<RepositoryStatus>,
    index: HashMap<PathBuf, usize>,
    generation: u64,
}

impl TableInner {
    fn upsert(&mut self, record: RepositoryStatus) {
        match self.index.get(&record.path) {
            Some(&i) => self.rows[i] = record,
            None => {
                self.index.insert(record.path.clone(), self.rows.len());
                self.rows.push(record);
            }
        }
    }
}

/// Shared handle to a repository table. Clones refer to the same table.
#[derive(Debug, Clone, Default)]
pub struct RepositoryTable {
    inner: Arc<RwLock<TableInner>>,
}

impl RepositoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard every row and install `records`.
    ///
    /// Duplicate paths collapse to the last record, kept at the position of
    /// the first.
    pub fn replace_all(&self, records: Vec<RepositoryStatus>) {
        let mut inner = self.write();
        inner.rows.clear();
        inner.index.clear();
        for record in records {
            inner.upsert(record);
        }
        inner.generation += 1;
    }

    /// Overwrite rows with matching paths, append rows with new paths.
    ///
    /// ```
    /// use repodash::core::types::{RepositoryDescriptor, RepositoryStatus, VcsKind};
    /// use repodash::engine::table::RepositoryTable;
    ///
    /// let row = |p: &str| RepositoryStatus::missing(&RepositoryDescriptor::new(p, "u"), VcsKind::Git);
    /// let table = RepositoryTable::new();
    /// table.replace_all(vec![row("/a"), row("/b")]);
    /// table.merge_patch(vec![row("/c"), row("/a")]);
    ///
    /// let paths: Vec<String> = table
    ///     .snapshot()
    ///     .iter()
    ///     .map(|s| s.path.display().to_string())
    ///     .collect();
    /// assert_eq!(paths, vec!["/a", "/b", "/c"]);
    /// ```
    pub fn merge_patch(&self, records: Vec<RepositoryStatus>) {
        let mut inner = self.write();
        for record in records {
            inner.upsert(record);
        }
        inner.generation += 1;
    }

    /// Copy of every row, in table order.
    pub fn snapshot(&self) -> Vec<RepositoryStatus> {
        self.read().rows.clone()
    }

    pub fn get(&self, path: &Path) -> Option<RepositoryStatus> {
        let inner = self.read();
        inner.index.get(path).map(|&i| inner.rows[i].clone())
    }

    pub fn len(&self) -> usize {
        self.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().rows.is_empty()
    }

    /// Counter bumped by every mutation.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Paths of rows matching `predicate`, in table order.
    pub fn paths_where(&self, predicate: impl Fn(&RepositoryStatus) -> bool) -> Vec<PathBuf> {
        self.read()
            .rows
            .iter()
            .filter(|row| predicate(row))
            .map(|row| row.path.clone())
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, TableInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
