//! Unchecked (gap) blocks keyed by the hash they wait for.
//!
//! Several blocks may wait on the same hash, so the table keeps duplicate
//! keys; each value is a tag-prefixed block.

use lattice_types::{Block, BlockHash};

use crate::{ReadTxn, StoreError, Table, WriteTxn};

pub trait UncheckedStore: ReadTxn {
    /// Blocks waiting for `dependency`, in encoded byte order.
    fn unchecked_get(&self, dependency: &BlockHash) -> Result<Vec<Block>, StoreError> {
        self.get_all(Table::Unchecked, dependency.as_bytes())?
            .iter()
            .map(|bytes| Ok(Block::deserialize_typed(bytes)?))
            .collect()
    }

    fn unchecked_count(&self) -> Result<u64, StoreError> {
        self.count(Table::Unchecked)
    }
}

impl<T: ReadTxn + ?Sized> UncheckedStore for T {}

pub trait UncheckedStoreMut: WriteTxn {
    /// Park `block` until `dependency` appears. Parking the same block twice
    /// keeps one entry.
    fn unchecked_put(&mut self, dependency: &BlockHash, block: &Block) -> Result<(), StoreError> {
        self.put(
            Table::Unchecked,
            dependency.as_bytes(),
            &block.serialize_typed(),
        )
    }

    fn unchecked_del(&mut self, dependency: &BlockHash, block: &Block) -> Result<(), StoreError> {
        self.delete_value(
            Table::Unchecked,
            dependency.as_bytes(),
            &block.serialize_typed(),
        )
    }
}

impl<T: WriteTxn + ?Sized> UncheckedStoreMut for T {}
