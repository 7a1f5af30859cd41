//! Blocks and their sidebands.
//!
//! A block is stored under its hash as the tag-prefixed block encoding
//! followed by the sideband record.

use lattice_types::{Account, Amount, Block, BlockHash, Epoch, Reader, Timestamp, Writer};
use serde::{Deserialize, Serialize};

use crate::record::{decode, encode};
use crate::{ReadTxn, StoreError, Table, WriteTxn};

/// What a block did to its account, fixed when it was applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDetails {
    pub is_send: bool,
    pub is_receive: bool,
    pub is_epoch: bool,
}

/// Metadata computed when a block is applied; not covered by its signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSideband {
    pub account: Account,
    /// Next block in the chain, zero while this block is the head.
    pub successor: BlockHash,
    /// Account balance after this block.
    pub balance: Amount,
    /// 1 for the open block.
    pub height: u64,
    pub timestamp: Timestamp,
    pub epoch: Epoch,
    pub details: BlockDetails,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlock {
    pub block: Block,
    pub sideband: BlockSideband,
}

impl StoredBlock {
    pub fn hash(&self) -> BlockHash {
        self.block.hash()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut w = Writer::new();
        w.write_u8(self.block.block_type().as_u8());
        self.block.write(&mut w);
        w.write_bytes(&encode(&self.sideband)?);
        Ok(w.into_inner())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let mut r = Reader::new(bytes);
        let block = Block::read_typed(&mut r)?;
        let sideband = decode(&bytes[bytes.len() - r.remaining()..])?;
        Ok(Self { block, sideband })
    }
}

pub trait BlockStore: ReadTxn {
    fn block_get_stored(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError> {
        self.get(Table::Blocks, hash.as_bytes())?
            .map(|bytes| StoredBlock::from_bytes(&bytes))
            .transpose()
    }

    fn block_get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        Ok(self.block_get_stored(hash)?.map(|s| s.block))
    }

    fn block_sideband(&self, hash: &BlockHash) -> Result<Option<BlockSideband>, StoreError> {
        Ok(self.block_get_stored(hash)?.map(|s| s.sideband))
    }

    fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        self.exists(Table::Blocks, hash.as_bytes())
    }

    /// Successor of an existing block, zero when it is the head.
    fn block_successor(&self, hash: &BlockHash) -> Result<Option<BlockHash>, StoreError> {
        Ok(self.block_sideband(hash)?.map(|s| s.successor))
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        self.count(Table::Blocks)
    }
}

impl<T: ReadTxn + ?Sized> BlockStore for T {}

pub trait BlockStoreMut: WriteTxn {
    fn block_put(
        &mut self,
        hash: &BlockHash,
        block: &Block,
        sideband: &BlockSideband,
    ) -> Result<(), StoreError> {
        let stored = StoredBlock {
            block: block.clone(),
            sideband: sideband.clone(),
        };
        self.put(Table::Blocks, hash.as_bytes(), &stored.to_bytes()?)
    }

    fn block_set_successor(
        &mut self,
        hash: &BlockHash,
        successor: &BlockHash,
    ) -> Result<(), StoreError> {
        let mut stored = self
            .block_get_stored(hash)?
            .ok_or_else(|| StoreError::NotFound(format!("block {hash}")))?;
        stored.sideband.successor = *successor;
        self.put(Table::Blocks, hash.as_bytes(), &stored.to_bytes()?)
    }

    fn block_del(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.delete(Table::Blocks, hash.as_bytes())
    }
}

impl<T: WriteTxn + ?Sized> BlockStoreMut for T {}
