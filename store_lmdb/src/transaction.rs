//! LMDB read and write transactions.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};

use lattice_store::{KvIter, ReadTxn, StoreError, Table, TableGuards, WriteTxn};

use crate::error::backend;
use crate::{LmdbError, LmdbStore};

fn get(
    db: Option<Database<Bytes, Bytes>>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<Option<Vec<u8>>, StoreError> {
    match db {
        Some(db) => Ok(db.get(txn, key).map_err(backend)?.map(<[u8]>::to_vec)),
        None => Ok(None),
    }
}

fn iter_from<'t>(
    db: Option<Database<Bytes, Bytes>>,
    txn: &'t RoTxn,
    start: Option<&[u8]>,
) -> Result<KvIter<'t>, StoreError> {
    let Some(db) = db else {
        return Ok(Box::new(std::iter::empty()));
    };
    let owned = |entry: heed::Result<(&[u8], &[u8])>| {
        entry
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .map_err(backend)
    };
    match start {
        Some(start) => {
            let range = (Bound::Included(start), Bound::Unbounded);
            Ok(Box::new(db.range(txn, &range).map_err(backend)?.map(owned)))
        }
        None => Ok(Box::new(db.iter(txn).map_err(backend)?.map(owned))),
    }
}

fn count(db: Option<Database<Bytes, Bytes>>, txn: &RoTxn) -> Result<u64, StoreError> {
    match db {
        Some(db) => db.len(txn).map_err(backend),
        None => Ok(0),
    }
}

pub(crate) struct LmdbReadTxn<'a> {
    pub(crate) store: &'a LmdbStore,
    pub(crate) txn: RoTxn<'a>,
}

impl ReadTxn for LmdbReadTxn<'_> {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        get(self.store.database(table), &self.txn, key)
    }

    fn iter_from<'a>(&'a self, table: Table, start: Option<&[u8]>) -> Result<KvIter<'a>, StoreError> {
        iter_from(self.store.database(table), &self.txn, start)
    }

    fn count(&self, table: Table) -> Result<u64, StoreError> {
        count(self.store.database(table), &self.txn)
    }
}

/// Field order matters: the engine transaction ends before the table
/// locks are released.
pub(crate) struct LmdbWriteTxn<'a> {
    pub(crate) store: &'a LmdbStore,
    pub(crate) txn: RwTxn<'a>,
    pub(crate) guards: TableGuards<'a>,
}

impl LmdbWriteTxn<'_> {
    fn writable(&self, table: Table) -> Result<Database<Bytes, Bytes>, StoreError> {
        if !self.guards.holds(table) {
            return Err(StoreError::TableNotLocked(table));
        }
        self.store
            .database(table)
            .ok_or_else(|| LmdbError::MissingTable(table.name()).into())
    }
}

impl ReadTxn for LmdbWriteTxn<'_> {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        get(self.store.database(table), &self.txn, key)
    }

    fn iter_from<'a>(&'a self, table: Table, start: Option<&[u8]>) -> Result<KvIter<'a>, StoreError> {
        iter_from(self.store.database(table), &self.txn, start)
    }

    fn count(&self, table: Table) -> Result<u64, StoreError> {
        count(self.store.database(table), &self.txn)
    }
}

impl WriteTxn for LmdbWriteTxn<'_> {
    fn put(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let db = self.writable(table)?;
        db.put(&mut self.txn, key, value).map_err(backend)
    }

    fn delete(&mut self, table: Table, key: &[u8]) -> Result<(), StoreError> {
        let db = self.writable(table)?;
        let existed = db.delete(&mut self.txn, key).map_err(backend)?;
        debug_assert!(existed, "delete of missing key in {}", table.name());
        Ok(())
    }

    fn delete_value(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let db = self.writable(table)?;
        let removed = db
            .delete_one_duplicate(&mut self.txn, key, value)
            .map_err(backend)?;
        debug_assert!(removed, "delete of missing value in {}", table.name());
        Ok(())
    }

    fn drop_table(&mut self, table: Table) -> Result<(), StoreError> {
        let db = self.writable(table)?;
        db.clear(&mut self.txn).map_err(backend)
    }

    fn locked_tables(&self) -> &[Table] {
        self.guards.tables()
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let LmdbWriteTxn { txn, guards, .. } = *self;
        txn.commit().map_err(backend)?;
        drop(guards);
        Ok(())
    }
}
