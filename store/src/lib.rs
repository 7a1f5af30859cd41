//! Transactional table store for the lattice ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements the
//! [`Store`], [`ReadTxn`] and [`WriteTxn`] traits over a fixed set of
//! logical [`Table`]s. Everything above the backend (typed records, the
//! schema migrator, the ledger) depends only on these traits.

pub mod account;
pub mod block;
pub mod confirmation_height;
pub mod error;
pub mod flusher;
pub mod frontier;
pub mod maintenance;
pub mod meta;
pub mod migration;
pub mod peer;
pub mod pending;
pub mod record;
pub mod rep_weights;
pub mod table;
pub mod transaction;
pub mod unchecked;
pub mod vote_cache;

pub use account::{AccountInfo, AccountIter, AccountStore, AccountStoreMut};
pub use block::{BlockDetails, BlockSideband, BlockStore, BlockStoreMut, StoredBlock};
pub use confirmation_height::{
    ConfirmationHeightInfo, ConfirmationHeightStore, ConfirmationHeightStoreMut,
};
pub use error::StoreError;
pub use flusher::{flush_vote_cache, VoteCacheFlusher};
pub use frontier::{FrontierStore, FrontierStoreMut};
pub use meta::{MetaStore, MetaStoreMut};
pub use migration::{
    MigrationOutcome, Migrator, CURRENT_SCHEMA_VERSION, MINIMUM_SCHEMA_VERSION,
};
pub use peer::{PeerStore, PeerStoreMut};
pub use pending::{PendingInfo, PendingKey, PendingStore, PendingStoreMut};
pub use rep_weights::{
    OnlineWeightStore, OnlineWeightStoreMut, RepWeightStore, RepWeightStoreMut,
};
pub use table::{CountPolicy, Table, TableGuards, TableLocks};
pub use transaction::{KvIter, ReadTxn, Store, WriteTxn};
pub use unchecked::{UncheckedStore, UncheckedStoreMut};
pub use vote_cache::{VoteSequenceCache, VoteSequenceStore};
