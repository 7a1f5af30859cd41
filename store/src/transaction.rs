//! Backend-neutral transaction traits.

use std::path::Path;

use crate::{StoreError, Table};

/// Ordered `(key, value)` pairs. Duplicate-key tables yield one pair per
/// value, values of the same key in byte order.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreError>> + 'a>;

/// A snapshot view of the store.
///
/// Changes committed after the snapshot was taken are invisible. Read
/// transactions never block writers or other readers.
pub trait ReadTxn {
    /// Value stored under `key`; the first value for duplicate-key tables.
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn exists(&self, table: Table, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(table, key)?.is_some())
    }

    /// Forward iteration starting at the first key `>= start`.
    fn iter_from<'a>(&'a self, table: Table, start: Option<&[u8]>) -> Result<KvIter<'a>, StoreError>;

    fn iter<'a>(&'a self, table: Table) -> Result<KvIter<'a>, StoreError> {
        self.iter_from(table, None)
    }

    /// Every value stored under `key`.
    fn get_all(&self, table: Table, key: &[u8]) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut values = Vec::new();
        for entry in self.iter_from(table, Some(key))? {
            let (k, v) = entry?;
            if k != key {
                break;
            }
            values.push(v);
        }
        Ok(values)
    }

    /// Number of entries. See [`Table::count_policy`] for which tables may estimate.
    fn count(&self, table: Table) -> Result<u64, StoreError>;

    /// Whether `table` holds no entries. Exact for every table, unlike
    /// [`ReadTxn::count`].
    fn is_empty(&self, table: Table) -> Result<bool, StoreError> {
        match self.iter(table)?.next() {
            None => Ok(true),
            Some(entry) => entry.map(|_| false),
        }
    }
}

/// A write transaction holding the locks of the tables it declared.
///
/// Dropping without [`WriteTxn::commit`] aborts: none of its writes become
/// visible. Reads through a write transaction see its own writes.
pub trait WriteTxn: ReadTxn {
    /// Insert or replace; adds another value on duplicate-key tables.
    fn put(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key` with all of its values.
    ///
    /// The key must exist: callers check first, and a missing key trips a
    /// debug assertion.
    fn delete(&mut self, table: Table, key: &[u8]) -> Result<(), StoreError>;

    /// Remove a single value of a duplicate-key table.
    fn delete_value(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove every entry, leaving an empty table.
    fn drop_table(&mut self, table: Table) -> Result<(), StoreError>;

    /// Tables this transaction may write, in lock order.
    fn locked_tables(&self) -> &[Table];

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// A storage backend.
pub trait Store: Send + Sync {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>, StoreError>;

    /// Lock `tables` (in table order, blocking while another writer holds
    /// any of them) and open a write transaction over them.
    fn begin_write(&self, tables: &[Table]) -> Result<Box<dyn WriteTxn + '_>, StoreError>;

    fn read_only(&self) -> bool;

    /// Write a compacted copy of the whole store into `destination`.
    fn copy_compacted(&self, destination: &Path) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}
