//! The ledger: validation and application of blocks over a `Store`.
//!
//! A `Ledger` holds no per-account state of its own. Every operation runs
//! inside a transaction opened by the caller, so the caller decides what is
//! committed together. `process` and `rollback` live in their own modules.

use std::sync::Arc;

use lattice_store::{
    AccountInfo, AccountStore, AccountStoreMut, BlockDetails, BlockSideband, BlockStore,
    BlockStoreMut, ConfirmationHeightInfo, ConfirmationHeightStore, ConfirmationHeightStoreMut,
    FrontierStoreMut, PendingInfo, PendingKey, PendingStore, ReadTxn, RepWeightStore,
    RepWeightStoreMut, Store, StoredBlock, Table, WriteTxn,
};
use lattice_types::{Account, Amount, Block, BlockHash, Clock, Epoch, Root};

use crate::{LedgerConstants, LedgerError};

/// Tables written by `process` and `rollback`.
pub const PROCESS_TABLES: &[Table] = &[
    Table::Accounts,
    Table::Blocks,
    Table::Frontiers,
    Table::Pending,
    Table::RepWeights,
    Table::Unchecked,
];

/// Tables written by `Ledger::initialize`.
pub const GENESIS_TABLES: &[Table] = &[
    Table::Accounts,
    Table::Blocks,
    Table::ConfirmationHeight,
    Table::Frontiers,
    Table::RepWeights,
];

pub struct Ledger {
    pub constants: LedgerConstants,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Ledger {
    pub fn new(constants: LedgerConstants, clock: Arc<dyn Clock>) -> Self {
        Self { constants, clock }
    }

    /// Write the genesis block into an empty store. Returns `false` and
    /// changes nothing if the store already holds accounts or blocks.
    pub fn initialize(&self, store: &dyn Store) -> Result<bool, LedgerError> {
        let mut txn = store.begin_write(GENESIS_TABLES)?;
        if !txn.is_empty(Table::Accounts)? || !txn.is_empty(Table::Blocks)? {
            return Ok(false);
        }

        let genesis = &self.constants.genesis;
        let hash = genesis.hash();
        let now = self.clock.now();
        txn.block_put(
            &hash,
            &genesis.block,
            &BlockSideband {
                account: genesis.account,
                successor: BlockHash::ZERO,
                balance: genesis.supply,
                height: 1,
                timestamp: now,
                epoch: Epoch::Epoch0,
                details: BlockDetails::default(),
            },
        )?;
        txn.account_put(
            &genesis.account,
            &AccountInfo {
                head: hash,
                rep_block: hash,
                open_block: hash,
                balance: genesis.supply,
                modified: now,
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        )?;
        txn.frontier_put(&hash, &genesis.account)?;
        txn.rep_weight_add(&genesis.account, genesis.supply)?;
        txn.confirmation_height_put(
            &genesis.account,
            &ConfirmationHeightInfo {
                height: 1,
                frontier: hash,
            },
        )?;
        txn.commit()?;

        tracing::info!(
            network = self.constants.network.as_str(),
            genesis = %hash,
            "initialized ledger with genesis block"
        );
        Ok(true)
    }

    pub fn block_get<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Block>, LedgerError> {
        Ok(txn.block_get(hash)?)
    }

    pub fn block_exists<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<bool, LedgerError> {
        Ok(txn.block_exists(hash)?)
    }

    pub fn block_with_sideband<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<StoredBlock>, LedgerError> {
        Ok(txn.block_get_stored(hash)?)
    }

    /// Head block of `account`.
    pub fn latest<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Option<BlockHash>, LedgerError> {
        Ok(txn.account_get(account)?.map(|info| info.head))
    }

    pub fn account_get<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Option<AccountInfo>, LedgerError> {
        Ok(txn.account_get(account)?)
    }

    /// Balance of `account`; zero for unopened accounts.
    pub fn balance<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Amount, LedgerError> {
        Ok(txn
            .account_get(account)?
            .map_or(Amount::ZERO, |info| info.balance))
    }

    /// Account balance right after `hash` was applied.
    pub fn balance_of_block<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Amount>, LedgerError> {
        Ok(txn.block_sideband(hash)?.map(|sideband| sideband.balance))
    }

    /// Amount moved by `hash`: the balance difference to its predecessor.
    pub fn amount_of_block<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Amount>, LedgerError> {
        let Some(stored) = txn.block_get_stored(hash)? else {
            return Ok(None);
        };
        let previous = stored.block.previous();
        if previous.is_zero() {
            return Ok(Some(stored.sideband.balance));
        }
        let before = txn
            .block_sideband(&previous)?
            .ok_or(LedgerError::MissingBlock(previous))?
            .balance;
        let after = stored.sideband.balance;
        Ok(Some(if after >= before {
            after.saturating_sub(before)
        } else {
            before.saturating_sub(after)
        }))
    }

    pub fn account_of_block<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(txn.block_sideband(hash)?.map(|sideband| sideband.account))
    }

    /// Most recent block at or before `hash` that names a representative.
    pub fn representative_block<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<BlockHash>, LedgerError> {
        let mut current = *hash;
        while !current.is_zero() {
            let Some(block) = txn.block_get(&current)? else {
                return Ok(None);
            };
            if block.representative_field().is_some() {
                return Ok(Some(current));
            }
            current = block.previous();
        }
        Ok(None)
    }

    /// Representative named by the block `rep_block`.
    pub(crate) fn representative_of<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        rep_block: &BlockHash,
    ) -> Result<Account, LedgerError> {
        txn.block_get(rep_block)?
            .and_then(|block| block.representative_field())
            .ok_or(LedgerError::MissingBlock(*rep_block))
    }

    pub fn weight<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        representative: &Account,
    ) -> Result<Amount, LedgerError> {
        Ok(txn.rep_weight(representative)?)
    }

    pub fn pending_get<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        key: &PendingKey,
    ) -> Result<Option<PendingInfo>, LedgerError> {
        Ok(txn.pending_get(key)?)
    }

    pub fn pending_exists<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        key: &PendingKey,
    ) -> Result<bool, LedgerError> {
        Ok(txn.pending_exists(key)?)
    }

    pub fn pending_for_account<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, LedgerError> {
        Ok(txn.pending_for_account(account)?)
    }

    /// `(account, head)` pairs in account order, starting at `start`. Lazy:
    /// each item is read from `txn` as the iterator advances.
    pub fn frontiers<'t, T: ReadTxn + ?Sized>(
        &self,
        txn: &'t T,
        start: Option<&Account>,
    ) -> Result<impl Iterator<Item = Result<(Account, BlockHash), LedgerError>> + 't, LedgerError>
    {
        Ok(txn.accounts_iter(start)?.map(|entry| {
            entry
                .map(|(account, info)| (account, info.head))
                .map_err(LedgerError::from)
        }))
    }

    /// Every block of `account` from its open block to its head, read lazily
    /// by following successors.
    pub fn chain<'t, T: ReadTxn + ?Sized>(
        &self,
        txn: &'t T,
        account: &Account,
    ) -> Result<Chain<'t, T>, LedgerError> {
        let next = match txn.account_get(account)? {
            Some(info) => info.open_block,
            None => BlockHash::ZERO,
        };
        Ok(Chain { txn, next })
    }

    /// Block following `root`: the open block when `root` is an opened
    /// account, otherwise the successor of the block `root` names.
    pub fn successor<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        root: &Root,
    ) -> Result<Option<BlockHash>, LedgerError> {
        let account = Account::new(*root.as_bytes());
        if let Some(info) = txn.account_get(&account)? {
            return Ok(Some(info.open_block));
        }
        let hash = BlockHash::new(*root.as_bytes());
        Ok(txn
            .block_successor(&hash)?
            .filter(|successor| !successor.is_zero()))
    }

    /// Number of blocks. May be an estimate; see `Table::count_policy`.
    pub fn block_count<T: ReadTxn + ?Sized>(&self, txn: &T) -> Result<u64, LedgerError> {
        Ok(txn.block_count()?)
    }

    pub fn account_count<T: ReadTxn + ?Sized>(&self, txn: &T) -> Result<u64, LedgerError> {
        Ok(txn.account_count()?)
    }

    /// Zero height for accounts without a record.
    pub fn confirmation_height_get<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<ConfirmationHeightInfo, LedgerError> {
        Ok(txn.confirmation_height_get(account)?.unwrap_or_default())
    }

    /// Raise the owning account's confirmation height to `hash`. Never
    /// lowers it. Returns whether the height moved.
    ///
    /// Needs a write transaction holding `Table::ConfirmationHeight`.
    pub fn confirm(&self, txn: &mut dyn WriteTxn, hash: &BlockHash) -> Result<bool, LedgerError> {
        let sideband = txn
            .block_sideband(hash)?
            .ok_or(LedgerError::MissingBlock(*hash))?;
        let current = self.confirmation_height_get(&*txn, &sideband.account)?;
        if sideband.height <= current.height {
            return Ok(false);
        }
        txn.confirmation_height_put(
            &sideband.account,
            &ConfirmationHeightInfo {
                height: sideband.height,
                frontier: *hash,
            },
        )?;
        tracing::debug!(
            account = %sideband.account,
            height = sideband.height,
            "confirmation height raised"
        );
        Ok(true)
    }

    pub fn is_confirmed<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<bool, LedgerError> {
        let Some(sideband) = txn.block_sideband(hash)? else {
            return Ok(false);
        };
        let confirmed = self.confirmation_height_get(txn, &sideband.account)?;
        Ok(sideband.height <= confirmed.height)
    }
}

/// Iterator returned by [`Ledger::chain`]. Stops after the first error.
pub struct Chain<'t, T: ?Sized> {
    txn: &'t T,
    next: BlockHash,
}

impl<'t, T: ReadTxn + ?Sized> Iterator for Chain<'t, T> {
    type Item = Result<Block, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_zero() {
            return None;
        }
        let current = std::mem::replace(&mut self.next, BlockHash::ZERO);
        match self.txn.block_get_stored(&current) {
            Ok(Some(stored)) => {
                self.next = stored.sideband.successor;
                Some(Ok(stored.block))
            }
            Ok(None) => Some(Err(LedgerError::MissingBlock(current))),
            Err(error) => Some(Err(error.into())),
        }
    }
}
