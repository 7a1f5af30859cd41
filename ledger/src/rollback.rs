//! Undoing applied blocks, head first.

use lattice_store::{
    AccountInfo, AccountStore, AccountStoreMut, BlockStore, BlockStoreMut, FrontierStoreMut,
    PendingInfo, PendingKey, PendingStore, PendingStoreMut, RepWeightStoreMut, StoredBlock,
    WriteTxn,
};
use lattice_types::{Account, Amount, Block, BlockHash};

use crate::{Ledger, LedgerError};

fn destination_of(block: &Block) -> Option<Account> {
    block
        .destination_field()
        .or_else(|| block.link_field().map(|link| link.as_account()))
}

fn source_of(block: &Block) -> Option<BlockHash> {
    block
        .source_field()
        .or_else(|| block.link_field().map(|link| link.as_block_hash()))
}

impl Ledger {
    /// Roll back `hash`, which must be the head of its account and above
    /// the account's confirmation height.
    ///
    /// Rolling back a send whose funds were already received first rolls
    /// back the receiving chain until the pending entry is back. Returns
    /// every block removed, in removal order. `txn` must hold
    /// [`crate::PROCESS_TABLES`]; on error it must be dropped.
    pub fn rollback(
        &self,
        txn: &mut dyn WriteTxn,
        hash: &BlockHash,
    ) -> Result<Vec<Block>, LedgerError> {
        let mut removed = Vec::new();
        self.rollback_head(txn, hash, &mut removed)?;
        Ok(removed)
    }

    /// Roll back the chain owning `hash` from its head down to and
    /// including `hash`.
    pub fn rollback_to(
        &self,
        txn: &mut dyn WriteTxn,
        hash: &BlockHash,
    ) -> Result<Vec<Block>, LedgerError> {
        let account = txn
            .block_sideband(hash)?
            .ok_or(LedgerError::MissingBlock(*hash))?
            .account;
        let mut removed = Vec::new();
        while txn.block_exists(hash)? {
            let head = txn
                .account_get(&account)?
                .ok_or(LedgerError::MissingAccount(account))?
                .head;
            self.rollback_head(txn, &head, &mut removed)?;
        }
        Ok(removed)
    }

    fn rollback_head(
        &self,
        txn: &mut dyn WriteTxn,
        hash: &BlockHash,
        removed: &mut Vec<Block>,
    ) -> Result<(), LedgerError> {
        let StoredBlock { block, sideband } = txn
            .block_get_stored(hash)?
            .ok_or(LedgerError::MissingBlock(*hash))?;
        let account = sideband.account;
        let info = txn
            .account_get(&account)?
            .ok_or(LedgerError::MissingAccount(account))?;
        if info.head != *hash {
            return Err(LedgerError::RollbackNotHead {
                hash: *hash,
                head: info.head,
            });
        }
        let confirmed = self.confirmation_height_get(&*txn, &account)?.height;
        if sideband.height <= confirmed {
            return Err(LedgerError::RollbackConfirmed {
                hash: *hash,
                height: sideband.height,
                confirmed,
            });
        }

        if sideband.details.is_send {
            let destination = destination_of(&block).ok_or(LedgerError::MissingBlock(*hash))?;
            let key = PendingKey::new(destination, *hash);
            while !txn.pending_exists(&key)? {
                let head = txn
                    .account_get(&destination)?
                    .ok_or(LedgerError::MissingAccount(destination))?
                    .head;
                self.rollback_head(txn, &head, removed)?;
            }
            txn.pending_del(&key)?;
        }

        let previous = block.previous();
        let previous_sideband = if previous.is_zero() {
            None
        } else {
            Some(
                txn.block_sideband(&previous)?
                    .ok_or(LedgerError::MissingBlock(previous))?,
            )
        };
        let previous_balance = previous_sideband
            .as_ref()
            .map_or(Amount::ZERO, |sideband| sideband.balance);

        if sideband.details.is_receive {
            let source = source_of(&block).ok_or(LedgerError::MissingBlock(*hash))?;
            let source_sideband = txn
                .block_sideband(&source)?
                .ok_or(LedgerError::MissingBlock(source))?;
            txn.pending_put(
                &PendingKey::new(account, source),
                &PendingInfo {
                    source: source_sideband.account,
                    amount: sideband.balance.saturating_sub(previous_balance),
                    epoch: source_sideband.epoch,
                },
            )?;
        }

        let representative = self.representative_of(&*txn, &info.rep_block)?;
        txn.rep_weight_sub(&representative, info.balance)?;

        match previous_sideband {
            Some(previous_sideband) => {
                let rep_block = self
                    .representative_block(&*txn, &previous)?
                    .ok_or(LedgerError::MissingBlock(previous))?;
                let previous_representative = self.representative_of(&*txn, &rep_block)?;
                txn.rep_weight_add(&previous_representative, previous_sideband.balance)?;
                txn.account_put(
                    &account,
                    &AccountInfo {
                        head: previous,
                        rep_block,
                        open_block: info.open_block,
                        balance: previous_sideband.balance,
                        modified: self.clock.now(),
                        block_count: info.block_count - 1,
                        epoch: previous_sideband.epoch,
                    },
                )?;
                txn.frontier_del(hash)?;
                txn.frontier_put(&previous, &account)?;
                txn.block_set_successor(&previous, &BlockHash::ZERO)?;
            }
            None => {
                txn.account_del(&account)?;
                txn.frontier_del(hash)?;
            }
        }
        txn.block_del(hash)?;

        tracing::debug!(%hash, %account, height = sideband.height, "rolled back block");
        removed.push(block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::{Link, Signature, StateBlock};

    fn state(link: Link) -> Block {
        Block::State(StateBlock {
            account: Account::new([1; 32]),
            previous: BlockHash::new([2; 32]),
            representative: Account::new([3; 32]),
            balance: Amount::raw(10),
            link,
            signature: Signature::default(),
            work: 0,
        })
    }

    #[test]
    fn state_link_is_read_as_destination_or_source() {
        let block = state(Link::new([9; 32]));
        assert_eq!(destination_of(&block), Some(Account::new([9; 32])));
        assert_eq!(source_of(&block), Some(BlockHash::new([9; 32])));
    }
}
