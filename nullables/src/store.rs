//! Nullable store: the whole `Store` contract in memory.
//!
//! Committed state is an immutable snapshot of per-table maps behind an
//! `Arc`. Readers clone the `Arc` and never block. A writer copies the
//! tables it locked, edits the copies and swaps them into a new snapshot on
//! commit; tables it did not lock are left as other writers committed them.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lattice_store::{
    CountPolicy, KvIter, ReadTxn, Store, StoreError, Table, TableGuards, TableLocks, WriteTxn,
};

type TableData = BTreeMap<Vec<u8>, BTreeSet<Vec<u8>>>;

#[derive(Clone)]
struct Snapshot {
    tables: Vec<Arc<TableData>>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            tables: (0..Table::COUNT).map(|_| Arc::new(TableData::new())).collect(),
        }
    }
}

fn first_value(data: &TableData, key: &[u8]) -> Option<Vec<u8>> {
    data.get(key).and_then(|values| values.iter().next().cloned())
}

fn iter_table<'a>(data: &'a TableData, start: Option<&[u8]>) -> KvIter<'a> {
    let lower = match start {
        Some(start) => Bound::Included(start.to_vec()),
        None => Bound::Unbounded,
    };
    Box::new(
        data.range((lower, Bound::Unbounded))
            .flat_map(|(key, values)| values.iter().map(move |v| Ok((key.clone(), v.clone())))),
    )
}

/// Entry count, or zero for estimate-policy tables when `estimating`.
fn count_table(data: &TableData, table: Table, estimating: bool) -> u64 {
    if estimating && table.count_policy() == CountPolicy::Estimate {
        return 0;
    }
    data.values().map(|values| values.len() as u64).sum()
}

/// In-memory backend for tests.
pub struct NullStore {
    committed: Arc<Mutex<Arc<Snapshot>>>,
    locks: Arc<TableLocks>,
    read_only: bool,
    estimating: bool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            committed: Arc::new(Mutex::new(Arc::new(Snapshot::empty()))),
            locks: Arc::new(TableLocks::new()),
            read_only: false,
            estimating: false,
        }
    }

    /// A store whose `count` on estimate-policy tables always reports zero,
    /// as a badly stale engine estimate would.
    pub fn with_estimated_counts() -> Self {
        Self {
            estimating: true,
            ..Self::new()
        }
    }

    /// A read-only handle over the same data.
    pub fn read_only_view(&self) -> Self {
        Self {
            committed: Arc::clone(&self.committed),
            locks: Arc::clone(&self.locks),
            read_only: true,
            estimating: self.estimating,
        }
    }

    fn committed(&self) -> MutexGuard<'_, Arc<Snapshot>> {
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.committed())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for NullStore {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>, StoreError> {
        Ok(Box::new(NullReadTxn {
            snapshot: self.snapshot(),
            estimating: self.estimating,
        }))
    }

    fn begin_write(&self, tables: &[Table]) -> Result<Box<dyn WriteTxn + '_>, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        let guards = self.locks.acquire(tables);
        // Taken after locking, so every locked table is at its latest commit.
        let base = self.snapshot();
        let working = guards
            .tables()
            .iter()
            .map(|t| (*t, (*base.tables[t.index()]).clone()))
            .collect();
        Ok(Box::new(NullWriteTxn {
            store: self,
            base,
            working,
            guards,
        }))
    }

    fn read_only(&self) -> bool {
        self.read_only
    }

    fn copy_compacted(&self, _destination: &Path) -> Result<(), StoreError> {
        Err(StoreError::Backend(
            "the in-memory store has nothing to compact".into(),
        ))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

struct NullReadTxn {
    snapshot: Arc<Snapshot>,
    estimating: bool,
}

impl ReadTxn for NullReadTxn {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(first_value(&self.snapshot.tables[table.index()], key))
    }

    fn iter_from<'a>(&'a self, table: Table, start: Option<&[u8]>) -> Result<KvIter<'a>, StoreError> {
        Ok(iter_table(&self.snapshot.tables[table.index()], start))
    }

    fn count(&self, table: Table) -> Result<u64, StoreError> {
        Ok(count_table(
            &self.snapshot.tables[table.index()],
            table,
            self.estimating,
        ))
    }
}

struct NullWriteTxn<'a> {
    store: &'a NullStore,
    base: Arc<Snapshot>,
    working: BTreeMap<Table, TableData>,
    guards: TableGuards<'a>,
}

impl NullWriteTxn<'_> {
    fn table(&self, table: Table) -> &TableData {
        self.working
            .get(&table)
            .unwrap_or_else(|| &self.base.tables[table.index()])
    }

    fn table_mut(&mut self, table: Table) -> Result<&mut TableData, StoreError> {
        self.working
            .get_mut(&table)
            .ok_or(StoreError::TableNotLocked(table))
    }
}

impl ReadTxn for NullWriteTxn<'_> {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(first_value(self.table(table), key))
    }

    fn iter_from<'a>(&'a self, table: Table, start: Option<&[u8]>) -> Result<KvIter<'a>, StoreError> {
        Ok(iter_table(self.table(table), start))
    }

    fn count(&self, table: Table) -> Result<u64, StoreError> {
        Ok(count_table(self.table(table), table, self.store.estimating))
    }
}

impl WriteTxn for NullWriteTxn<'_> {
    fn put(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let data = self.table_mut(table)?;
        if table.allows_duplicates() {
            data.entry(key.to_vec()).or_default().insert(value.to_vec());
        } else {
            data.insert(key.to_vec(), BTreeSet::from([value.to_vec()]));
        }
        Ok(())
    }

    fn delete(&mut self, table: Table, key: &[u8]) -> Result<(), StoreError> {
        let existed = self.table_mut(table)?.remove(key).is_some();
        debug_assert!(existed, "delete of missing key in {}", table.name());
        Ok(())
    }

    fn delete_value(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let data = self.table_mut(table)?;
        let mut removed = false;
        if let Some(values) = data.get_mut(key) {
            removed = values.remove(value);
            if values.is_empty() {
                data.remove(key);
            }
        }
        debug_assert!(removed, "delete of missing value in {}", table.name());
        Ok(())
    }

    fn drop_table(&mut self, table: Table) -> Result<(), StoreError> {
        self.table_mut(table)?.clear();
        Ok(())
    }

    fn locked_tables(&self) -> &[Table] {
        self.guards.tables()
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let NullWriteTxn {
            store,
            working,
            guards,
            ..
        } = *self;
        let mut committed = store.committed();
        let mut next = Snapshot::clone(&committed);
        for (table, data) in working {
            next.tables[table.index()] = Arc::new(data);
        }
        *committed = Arc::new(next);
        drop(committed);
        drop(guards);
        Ok(())
    }
}
