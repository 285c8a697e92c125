//! In-memory table backend for testing and ephemeral use.
//!
//! [`InMemoryBackend`] keeps both tables in a `HashMap` behind a shared
//! `RwLock`. Clones share the same tables, so a test can hand one clone to a
//! [`LinkStore`](crate::LinkStore) and inspect what it persisted through
//! another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{Result, StoreError};
use crate::relation::Relation;
use crate::traits::{Record, TableBackend};

/// An in-memory implementation of [`TableBackend`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackend {
    tables: Arc<RwLock<HashMap<Relation, Vec<Record>>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryBackend {
    /// Create a backend with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-seeded with raw records, as if written earlier.
    pub fn with_tables(signs: Vec<Record>, targets: Vec<Record>) -> Self {
        let mut tables = HashMap::new();
        tables.insert(Relation::Signs, signs);
        tables.insert(Relation::Targets, targets);
        Self {
            tables: Arc::new(RwLock::new(tables)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `write_table` calls across all clones.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of the records currently stored for `relation`.
    pub fn records(&self, relation: Relation) -> Vec<Record> {
        self.read_table(relation).unwrap_or_default()
    }
}

impl TableBackend for InMemoryBackend {
    fn read_table(&self, relation: Relation) -> Result<Vec<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;
        Ok(tables.get(&relation).cloned().unwrap_or_default())
    }

    fn write_table(&mut self, relation: Relation, records: &[Record]) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;
        tables.insert(relation, records.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
