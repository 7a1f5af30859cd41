//! Block validation and application.
//!
//! Checks run in a fixed order and later checks rely on earlier ones:
//! sanity, previous block present, duplicate, chain position (fork),
//! signature, work, then the checks specific to what the block does.
//! Nothing is written before every check has passed, except that gap
//! blocks are parked in the unchecked table.

use lattice_crypto::verify_block_signature;
use lattice_store::{
    AccountInfo, AccountStore, AccountStoreMut, BlockDetails, BlockSideband, BlockStore,
    BlockStoreMut, FrontierStore, FrontierStoreMut, PendingInfo, PendingKey, PendingStore,
    PendingStoreMut, RepWeightStoreMut, UncheckedStoreMut, WriteTxn,
};
use lattice_types::{Account, Amount, Block, BlockHash, Epoch, Link};
use lattice_work::WorkBlockKind;

use crate::{Ledger, LedgerError, ProcessResult, ProcessReturn};

/// What a block does to its account, with the fields each check needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Effect {
    Send { balance: Amount, destination: Account },
    /// Receive or open.
    Receive { source: BlockHash },
    /// Representative change only; the balance must not move.
    Change { declared: Option<Amount> },
    Epoch { representative: Account, balance: Amount },
}

/// Everything `apply` writes for an accepted block.
struct Applied {
    account: Account,
    previous: Option<AccountInfo>,
    rep_block: BlockHash,
    balance: Amount,
    amount: Amount,
    epoch: Epoch,
    details: BlockDetails,
    pending_account: Account,
    created: Option<(PendingKey, PendingInfo)>,
    consumed: Option<PendingKey>,
}

type Verdict = Result<Applied, ProcessReturn>;

fn reject(code: ProcessResult, account: Account) -> Result<Verdict, LedgerError> {
    Ok(Err(ProcessReturn::rejected(code, account)))
}

/// The block under validation and its account's state before it.
struct Context<'b> {
    block: &'b Block,
    hash: BlockHash,
    account: Account,
    info: Option<AccountInfo>,
}

impl Context<'_> {
    fn previous_balance(&self) -> Amount {
        self.info.as_ref().map_or(Amount::ZERO, |info| info.balance)
    }

    fn previous_epoch(&self) -> Epoch {
        self.info.as_ref().map_or(Epoch::Epoch0, |info| info.epoch)
    }

    fn reject(&self, code: ProcessResult) -> Result<Verdict, LedgerError> {
        reject(code, self.account)
    }

    fn accept(
        self,
        balance: Amount,
        amount: Amount,
        epoch: Epoch,
        details: BlockDetails,
    ) -> Applied {
        let rep_block = if self.block.representative_field().is_some() {
            self.hash
        } else {
            self.info.as_ref().map_or(self.hash, |info| info.rep_block)
        };
        Applied {
            account: self.account,
            previous: self.info,
            rep_block,
            balance,
            amount,
            epoch,
            details,
            pending_account: Account::ZERO,
            created: None,
            consumed: None,
        }
    }
}

fn effect(block: &Block, previous_balance: Amount, epoch_link: &Link) -> Effect {
    match block {
        Block::Send(send) => Effect::Send {
            balance: send.balance,
            destination: send.destination,
        },
        Block::Receive(receive) => Effect::Receive {
            source: receive.source,
        },
        Block::Open(open) => Effect::Receive {
            source: open.source,
        },
        Block::Change(_) => Effect::Change { declared: None },
        Block::State(state) => {
            if state.link == *epoch_link && state.balance == previous_balance {
                Effect::Epoch {
                    representative: state.representative,
                    balance: state.balance,
                }
            } else if state.balance < previous_balance {
                Effect::Send {
                    balance: state.balance,
                    destination: state.link.as_account(),
                }
            } else if !state.link.is_zero() {
                Effect::Receive {
                    source: state.link.as_block_hash(),
                }
            } else {
                Effect::Change {
                    declared: Some(state.balance),
                }
            }
        }
    }
}

impl Ledger {
    /// Validate `block` and, if valid, apply it inside `txn`.
    ///
    /// Validation failures are returned as a `ProcessResult`, not an error.
    /// `txn` must hold [`crate::PROCESS_TABLES`]. The caller commits.
    pub fn process(
        &self,
        txn: &mut dyn WriteTxn,
        block: &Block,
    ) -> Result<ProcessReturn, LedgerError> {
        let hash = block.hash();
        let result = match self.validate(txn, block, hash)? {
            Ok(applied) => {
                let result = ProcessReturn {
                    code: ProcessResult::Progress,
                    account: applied.account,
                    amount: applied.amount,
                    pending_account: applied.pending_account,
                };
                self.apply(txn, block, &hash, applied)?;
                result
            }
            Err(rejected) => rejected,
        };
        tracing::trace!(%hash, result = %result.code, "processed block");
        Ok(result)
    }

    fn validate(
        &self,
        txn: &mut dyn WriteTxn,
        block: &Block,
        hash: BlockHash,
    ) -> Result<Verdict, LedgerError> {
        let named = block.account_field().unwrap_or(Account::ZERO);
        if block.account_field().is_some_and(|account| account.is_zero()) {
            return reject(ProcessResult::OpenedBurnAccount, Account::ZERO);
        }

        let previous = block.previous();
        if !previous.is_zero() && !txn.block_exists(&previous)? {
            txn.unchecked_put(&previous, block)?;
            return reject(ProcessResult::GapPrevious, named);
        }

        if let Some(sideband) = txn.block_sideband(&hash)? {
            return reject(ProcessResult::Old, sideband.account);
        }

        let (account, info) = match block {
            Block::Send(_) | Block::Receive(_) | Block::Change(_) => {
                let predecessor = txn
                    .block_get(&previous)?
                    .ok_or(LedgerError::MissingBlock(previous))?;
                if !predecessor.is_legacy() {
                    return reject(ProcessResult::BlockPosition, Account::ZERO);
                }
                let Some(account) = txn.frontier_get(&previous)? else {
                    return reject(ProcessResult::Fork, Account::ZERO);
                };
                let info = txn
                    .account_get(&account)?
                    .ok_or(LedgerError::MissingAccount(account))?;
                debug_assert_eq!(info.head, previous);
                (account, Some(info))
            }
            Block::Open(open) => {
                if txn.account_exists(&open.account)? {
                    return reject(ProcessResult::Fork, open.account);
                }
                (open.account, None)
            }
            Block::State(state) => {
                let info = txn.account_get(&state.account)?;
                match &info {
                    Some(info) if previous.is_zero() || previous != info.head => {
                        return reject(ProcessResult::Fork, state.account);
                    }
                    None if !previous.is_zero() => {
                        return reject(ProcessResult::BlockPosition, state.account);
                    }
                    _ => {}
                }
                (state.account, info)
            }
        };

        let ctx = Context {
            block,
            hash,
            account,
            info,
        };
        let effect = effect(block, ctx.previous_balance(), &self.constants.epoch_link);

        let signer = match effect {
            Effect::Epoch { .. } => self.constants.epoch_signer,
            _ => account,
        };
        if !verify_block_signature(block, &signer) {
            return ctx.reject(ProcessResult::BadSignature);
        }

        let work_kind = match effect {
            Effect::Receive { .. } => WorkBlockKind::ReceiveOrOpen,
            Effect::Epoch { .. } => WorkBlockKind::Epoch,
            Effect::Send { .. } | Effect::Change { .. } => WorkBlockKind::Base,
        };
        if !self
            .constants
            .work
            .is_valid(&block.root(), block.work(), work_kind)
        {
            return ctx.reject(ProcessResult::InsufficientWork);
        }

        match effect {
            Effect::Send {
                balance,
                destination,
            } => self.check_send(ctx, balance, destination),
            Effect::Receive { source } => self.check_receive(txn, ctx, source),
            Effect::Change { declared } => self.check_change(ctx, declared),
            Effect::Epoch {
                representative,
                balance,
            } => self.check_epoch(txn, ctx, representative, balance),
        }
    }

    fn check_send(
        &self,
        ctx: Context<'_>,
        balance: Amount,
        destination: Account,
    ) -> Result<Verdict, LedgerError> {
        let Some(amount) = ctx.previous_balance().checked_sub(balance) else {
            return ctx.reject(ProcessResult::NegativeSpend);
        };
        let epoch = ctx.previous_epoch();
        let pending = PendingInfo {
            source: ctx.account,
            amount,
            epoch,
        };
        let key = PendingKey::new(destination, ctx.hash);
        let details = BlockDetails {
            is_send: true,
            ..Default::default()
        };
        let mut applied = ctx.accept(balance, amount, epoch, details);
        applied.pending_account = destination;
        applied.created = Some((key, pending));
        Ok(Ok(applied))
    }

    fn check_receive(
        &self,
        txn: &mut dyn WriteTxn,
        ctx: Context<'_>,
        source: BlockHash,
    ) -> Result<Verdict, LedgerError> {
        if !txn.block_exists(&source)? {
            txn.unchecked_put(&source, ctx.block)?;
            return ctx.reject(ProcessResult::GapSource);
        }

        let key = PendingKey::new(ctx.account, source);
        let Some(pending) = txn.pending_get(&key)? else {
            let from_send = txn
                .block_sideband(&source)?
                .is_some_and(|sideband| sideband.details.is_send);
            return ctx.reject(if from_send {
                ProcessResult::Unreceivable
            } else {
                ProcessResult::NotReceiveFromSend
            });
        };
        if ctx.block.is_legacy() && pending.epoch != Epoch::Epoch0 {
            return ctx.reject(ProcessResult::Unreceivable);
        }

        let balance = ctx
            .previous_balance()
            .checked_add(pending.amount)
            .ok_or(LedgerError::Overflow(ctx.hash))?;
        if ctx
            .block
            .balance_field()
            .is_some_and(|declared| declared != balance)
        {
            return ctx.reject(ProcessResult::BalanceMismatch);
        }

        let epoch = ctx.previous_epoch().max(pending.epoch);
        let details = BlockDetails {
            is_receive: true,
            ..Default::default()
        };
        let mut applied = ctx.accept(balance, pending.amount, epoch, details);
        applied.consumed = Some(key);
        Ok(Ok(applied))
    }

    fn check_change(
        &self,
        ctx: Context<'_>,
        declared: Option<Amount>,
    ) -> Result<Verdict, LedgerError> {
        if ctx.info.is_none() {
            // A first state block must receive something.
            return ctx.reject(ProcessResult::GapSource);
        }
        let balance = ctx.previous_balance();
        if declared.is_some_and(|declared| declared != balance) {
            return ctx.reject(ProcessResult::BalanceMismatch);
        }
        let epoch = ctx.previous_epoch();
        Ok(Ok(ctx.accept(
            balance,
            Amount::ZERO,
            epoch,
            BlockDetails::default(),
        )))
    }

    fn check_epoch(
        &self,
        txn: &mut dyn WriteTxn,
        ctx: Context<'_>,
        representative: Account,
        balance: Amount,
    ) -> Result<Verdict, LedgerError> {
        match &ctx.info {
            Some(info) => {
                let current = self.representative_of(&*txn, &info.rep_block)?;
                if representative != current {
                    return ctx.reject(ProcessResult::RepresentativeMismatch);
                }
                if info.epoch != Epoch::Epoch0 {
                    return ctx.reject(ProcessResult::BlockPosition);
                }
            }
            None if !representative.is_zero() => {
                return ctx.reject(ProcessResult::RepresentativeMismatch);
            }
            None => {}
        }
        if balance != ctx.previous_balance() {
            return ctx.reject(ProcessResult::BalanceMismatch);
        }
        let details = BlockDetails {
            is_epoch: true,
            ..Default::default()
        };
        Ok(Ok(ctx.accept(balance, Amount::ZERO, Epoch::Epoch1, details)))
    }

    fn apply(
        &self,
        txn: &mut dyn WriteTxn,
        block: &Block,
        hash: &BlockHash,
        applied: Applied,
    ) -> Result<(), LedgerError> {
        let now = self.clock.now();
        let height = applied
            .previous
            .as_ref()
            .map_or(1, |info| info.block_count + 1);
        txn.block_put(
            hash,
            block,
            &BlockSideband {
                account: applied.account,
                successor: BlockHash::ZERO,
                balance: applied.balance,
                height,
                timestamp: now,
                epoch: applied.epoch,
                details: applied.details,
            },
        )?;
        let previous = block.previous();
        if !previous.is_zero() {
            txn.block_set_successor(&previous, hash)?;
        }

        if let Some(info) = &applied.previous {
            let old_representative = self.representative_of(&*txn, &info.rep_block)?;
            txn.rep_weight_sub(&old_representative, info.balance)?;
        }
        let representative = self.representative_of(&*txn, &applied.rep_block)?;
        txn.rep_weight_add(&representative, applied.balance)?;

        if let Some((key, info)) = &applied.created {
            txn.pending_put(key, info)?;
        }
        if let Some(key) = &applied.consumed {
            txn.pending_del(key)?;
        }

        txn.account_put(
            &applied.account,
            &AccountInfo {
                head: *hash,
                rep_block: applied.rep_block,
                open_block: applied
                    .previous
                    .as_ref()
                    .map_or(*hash, |info| info.open_block),
                balance: applied.balance,
                modified: now,
                block_count: height,
                epoch: applied.epoch,
            },
        )?;
        if let Some(info) = &applied.previous {
            txn.frontier_del(&info.head)?;
        }
        txn.frontier_put(hash, &applied.account)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::{Signature, StateBlock};

    fn state(balance: u128, link: Link) -> Block {
        Block::State(StateBlock {
            account: Account::new([1; 32]),
            previous: BlockHash::new([2; 32]),
            representative: Account::new([3; 32]),
            balance: Amount::raw(balance),
            link,
            signature: Signature::ZERO,
            work: 0,
        })
    }

    #[test]
    fn state_effect_follows_balance_and_link() {
        let epoch_link = Link::from_tag("epoch");
        let other = Link::new([7; 32]);

        assert!(matches!(
            effect(&state(10, other), Amount::raw(20), &epoch_link),
            Effect::Send { balance, .. } if balance == Amount::raw(10)
        ));
        assert_eq!(
            effect(&state(30, other), Amount::raw(20), &epoch_link),
            Effect::Receive {
                source: other.as_block_hash()
            }
        );
        assert_eq!(
            effect(&state(20, Link::ZERO), Amount::raw(20), &epoch_link),
            Effect::Change {
                declared: Some(Amount::raw(20))
            }
        );
        assert!(matches!(
            effect(&state(20, epoch_link), Amount::raw(20), &epoch_link),
            Effect::Epoch { .. }
        ));
        // An epoch link that moves funds is an ordinary send.
        assert!(matches!(
            effect(&state(5, epoch_link), Amount::raw(20), &epoch_link),
            Effect::Send { .. }
        ));
    }
}
