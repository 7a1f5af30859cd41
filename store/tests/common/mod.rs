#![allow(dead_code)]

use lattice_store::{
    AccountInfo, AccountStoreMut, BlockDetails, BlockSideband, BlockStoreMut, FrontierStoreMut,
    MetaStoreMut, ReadTxn, Store, Table, WriteTxn,
};
use lattice_types::{
    Account, Amount, Block, BlockHash, ChangeBlock, Epoch, OpenBlock, Signature, Timestamp,
};

pub fn account(byte: u8) -> Account {
    Account::new([byte; 32])
}

pub fn open_block(owner: Account, representative: Account) -> Block {
    Block::Open(OpenBlock {
        source: BlockHash::new([0xee; 32]),
        representative,
        account: owner,
        signature: Signature::ZERO,
        work: 0,
    })
}

pub fn change_block(previous: BlockHash, representative: Account) -> Block {
    Block::Change(ChangeBlock {
        previous,
        representative,
        signature: Signature::ZERO,
        work: 0,
    })
}

pub fn sideband(owner: Account, balance: Amount, height: u64) -> BlockSideband {
    BlockSideband {
        account: owner,
        successor: BlockHash::ZERO,
        balance,
        height,
        timestamp: Timestamp::new(1_000),
        epoch: Epoch::Epoch0,
        details: BlockDetails::default(),
    }
}

/// Write `blocks` as `owner`'s chain without successor links, plus the
/// account record and frontier, the way an old schema left them.
pub fn seed_chain(txn: &mut dyn WriteTxn, owner: Account, balance: Amount, blocks: &[Block]) {
    let mut rep_block = BlockHash::ZERO;
    for (i, block) in blocks.iter().enumerate() {
        if block.representative_field().is_some() {
            rep_block = block.hash();
        }
        txn.block_put(&block.hash(), block, &sideband(owner, balance, i as u64 + 1))
            .unwrap();
    }
    let head = blocks.last().unwrap().hash();
    txn.account_put(
        &owner,
        &AccountInfo {
            head,
            rep_block,
            open_block: blocks[0].hash(),
            balance,
            modified: Timestamp::new(1_000),
            block_count: blocks.len() as u64,
            epoch: Epoch::Epoch0,
        },
    )
    .unwrap();
    txn.frontier_put(&head, &owner).unwrap();
}

pub fn set_version(store: &dyn Store, version: u32) {
    let mut txn = store.begin_write(&[Table::Meta]).unwrap();
    txn.version_put(version).unwrap();
    txn.commit().unwrap();
}

/// Every entry of every table, for before/after comparisons.
pub fn dump<T: ReadTxn + ?Sized>(txn: &T) -> Vec<(Table, Vec<u8>, Vec<u8>)> {
    let mut entries = Vec::new();
    for table in Table::ALL {
        for entry in txn.iter(table).unwrap() {
            let (k, v) = entry.unwrap();
            entries.push((table, k, v));
        }
    }
    entries
}
