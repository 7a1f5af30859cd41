#![allow(dead_code)]

use std::sync::Arc;

use lattice_crypto::{keypair_from_seed, sign_block};
use lattice_ledger::{
    dev_genesis_key, Ledger, LedgerConstants, LedgerError, ProcessReturn, PROCESS_TABLES,
};
use lattice_nullables::{NullClock, NullStore};
use lattice_store::{ReadTxn, Store, Table};
use lattice_types::{
    Account, Amount, Block, BlockHash, ChangeBlock, KeyPair, Link, OpenBlock, ReceiveBlock,
    SendBlock, Signature, StateBlock,
};

/// An initialized ledger over an in-memory store.
pub struct Fixture {
    pub store: NullStore,
    pub ledger: Ledger,
    pub clock: Arc<NullClock>,
    pub genesis: KeyPair,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_constants(LedgerConstants::dev())
    }

    pub fn with_constants(constants: LedgerConstants) -> Self {
        let store = NullStore::new();
        let clock = Arc::new(NullClock::new(1_000));
        let ledger = Ledger::new(constants, clock.clone());
        assert!(ledger.initialize(&store).unwrap());
        Self {
            store,
            ledger,
            clock,
            genesis: dev_genesis_key(),
        }
    }

    pub fn genesis_account(&self) -> Account {
        self.genesis.account()
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.ledger.constants.genesis.hash()
    }

    pub fn read(&self) -> Box<dyn ReadTxn + '_> {
        self.store.begin_read().unwrap()
    }

    /// Process one block in its own committed transaction.
    pub fn process(&self, block: &Block) -> ProcessReturn {
        let mut txn = self.store.begin_write(PROCESS_TABLES).unwrap();
        let result = self.ledger.process(txn.as_mut(), block).unwrap();
        txn.commit().unwrap();
        result
    }

    /// Roll back in its own transaction, committing only on success.
    pub fn rollback(&self, hash: &BlockHash) -> Result<Vec<Block>, LedgerError> {
        let mut txn = self.store.begin_write(PROCESS_TABLES).unwrap();
        let removed = self.ledger.rollback(txn.as_mut(), hash)?;
        txn.commit().unwrap();
        Ok(removed)
    }

    pub fn confirm(&self, hash: &BlockHash) -> bool {
        let mut txn = self.store.begin_write(&[Table::ConfirmationHeight]).unwrap();
        let moved = self.ledger.confirm(txn.as_mut(), hash).unwrap();
        txn.commit().unwrap();
        moved
    }

    pub fn balance(&self, account: &Account) -> Amount {
        self.ledger.balance(&*self.read(), account).unwrap()
    }

    pub fn weight(&self, representative: &Account) -> Amount {
        self.ledger.weight(&*self.read(), representative).unwrap()
    }

    pub fn head(&self, account: &Account) -> Option<BlockHash> {
        self.ledger.latest(&*self.read(), account).unwrap()
    }

    pub fn exists(&self, hash: &BlockHash) -> bool {
        self.ledger.block_exists(&*self.read(), hash).unwrap()
    }

    /// Every entry of every table.
    pub fn dump(&self) -> Vec<(Table, Vec<u8>, Vec<u8>)> {
        let txn = self.read();
        let mut entries = Vec::new();
        for table in Table::ALL {
            for entry in txn.iter(table).unwrap() {
                let (key, value) = entry.unwrap();
                entries.push((table, key, value));
            }
        }
        entries
    }
}

pub fn key(byte: u8) -> KeyPair {
    keypair_from_seed(&[byte; 32])
}

pub fn signed(mut block: Block, key: &KeyPair) -> Block {
    sign_block(&mut block, &key.private);
    block
}

pub fn send(key: &KeyPair, previous: BlockHash, destination: Account, balance: Amount) -> Block {
    signed(
        Block::Send(SendBlock {
            previous,
            destination,
            balance,
            signature: Signature::ZERO,
            work: 0,
        }),
        key,
    )
}

pub fn receive(key: &KeyPair, previous: BlockHash, source: BlockHash) -> Block {
    signed(
        Block::Receive(ReceiveBlock {
            previous,
            source,
            signature: Signature::ZERO,
            work: 0,
        }),
        key,
    )
}

pub fn open(key: &KeyPair, source: BlockHash, representative: Account) -> Block {
    signed(
        Block::Open(OpenBlock {
            source,
            representative,
            account: key.account(),
            signature: Signature::ZERO,
            work: 0,
        }),
        key,
    )
}

pub fn change(key: &KeyPair, previous: BlockHash, representative: Account) -> Block {
    signed(
        Block::Change(ChangeBlock {
            previous,
            representative,
            signature: Signature::ZERO,
            work: 0,
        }),
        key,
    )
}

/// A state block for `account`, signed by `signer`.
pub fn state_for(
    signer: &KeyPair,
    account: Account,
    previous: BlockHash,
    representative: Account,
    balance: Amount,
    link: Link,
) -> Block {
    signed(
        Block::State(StateBlock {
            account,
            previous,
            representative,
            balance,
            link,
            signature: Signature::ZERO,
            work: 0,
        }),
        signer,
    )
}

pub fn state(
    key: &KeyPair,
    previous: BlockHash,
    representative: Account,
    balance: Amount,
    link: Link,
) -> Block {
    state_for(key, key.account(), previous, representative, balance, link)
}

pub fn raw(amount: u128) -> Amount {
    Amount::raw(amount)
}

/// Genesis balance after sending `sent` in total.
pub fn genesis_after(sent: u128) -> Amount {
    Amount::raw(u128::MAX - sent)
}
