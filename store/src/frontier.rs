//! Frontier index: chain head hash -> owning account.
//!
//! Legacy blocks do not name their account; it is found by looking up
//! their `previous` here. A previous block that is not a frontier has
//! already been built upon.

use lattice_types::{Account, BlockHash};

use crate::record::fixed;
use crate::{ReadTxn, StoreError, Table, WriteTxn};

pub trait FrontierStore: ReadTxn {
    fn frontier_get(&self, head: &BlockHash) -> Result<Option<Account>, StoreError> {
        self.get(Table::Frontiers, head.as_bytes())?
            .map(|bytes| Ok(Account::new(fixed(&bytes, "frontier account")?)))
            .transpose()
    }

    fn frontier_count(&self) -> Result<u64, StoreError> {
        self.count(Table::Frontiers)
    }
}

impl<T: ReadTxn + ?Sized> FrontierStore for T {}

pub trait FrontierStoreMut: WriteTxn {
    fn frontier_put(&mut self, head: &BlockHash, account: &Account) -> Result<(), StoreError> {
        self.put(Table::Frontiers, head.as_bytes(), account.as_bytes())
    }

    fn frontier_del(&mut self, head: &BlockHash) -> Result<(), StoreError> {
        self.delete(Table::Frontiers, head.as_bytes())
    }
}

impl<T: WriteTxn + ?Sized> FrontierStoreMut for T {}
