//! Last-generated vote sequence per account.
//!
//! Sequences are served from a two-generation in-memory cache in front of
//! the `VoteSequence` table. `flush` writes the current generation and
//! rotates it into `previous`, dropping the older one, so memory is bounded
//! by what changed in the last two flush intervals. The owner flushes on a
//! timer and before any migration. A flush must be followed by a commit of
//! the same transaction.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use lattice_types::Account;

use crate::record::fixed;
use crate::{ReadTxn, StoreError, Table, WriteTxn};

pub trait VoteSequenceStore: ReadTxn {
    fn vote_sequence_get(&self, account: &Account) -> Result<Option<u64>, StoreError> {
        self.get(Table::VoteSequence, account.as_bytes())?
            .map(|bytes| Ok(u64::from_be_bytes(fixed(&bytes, "vote sequence")?)))
            .transpose()
    }
}

impl<T: ReadTxn + ?Sized> VoteSequenceStore for T {}

#[derive(Default)]
struct Generations {
    current: HashMap<Account, u64>,
    previous: HashMap<Account, u64>,
}

impl Generations {
    fn cached(&self, account: &Account) -> Option<u64> {
        self.current
            .get(account)
            .or_else(|| self.previous.get(account))
            .copied()
    }
}

#[derive(Default)]
pub struct VoteSequenceCache {
    generations: Mutex<Generations>,
}

impl VoteSequenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Generations> {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup<T: ReadTxn + ?Sized>(
        generations: &Generations,
        txn: &T,
        account: &Account,
    ) -> Result<u64, StoreError> {
        match generations.cached(account) {
            Some(sequence) => Ok(sequence),
            None => Ok(txn.vote_sequence_get(account)?.unwrap_or(0)),
        }
    }

    /// Latest sequence generated for `account`, 0 if none.
    pub fn read<T: ReadTxn + ?Sized>(&self, txn: &T, account: &Account) -> Result<u64, StoreError> {
        let generations = self.lock();
        Self::lookup(&generations, txn, account)
    }

    /// Allocate the next sequence for `account`.
    pub fn bump<T: ReadTxn + ?Sized>(&self, txn: &T, account: &Account) -> Result<u64, StoreError> {
        let mut generations = self.lock();
        let next = Self::lookup(&generations, txn, account)? + 1;
        generations.current.insert(*account, next);
        Ok(next)
    }

    /// Record a sequence seen elsewhere; keeps whichever is higher.
    pub fn observe<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
        sequence: u64,
    ) -> Result<u64, StoreError> {
        let mut generations = self.lock();
        let known = Self::lookup(&generations, txn, account)?;
        if sequence > known {
            generations.current.insert(*account, sequence);
            Ok(sequence)
        } else {
            Ok(known)
        }
    }

    /// Persist the current generation and rotate. Returns the number of
    /// sequences written.
    pub fn flush<T: WriteTxn + ?Sized>(&self, txn: &mut T) -> Result<usize, StoreError> {
        let mut generations = self.lock();
        for (account, sequence) in &generations.current {
            txn.put(
                Table::VoteSequence,
                account.as_bytes(),
                &sequence.to_be_bytes(),
            )?;
        }
        let written = generations.current.len();
        generations.previous = std::mem::take(&mut generations.current);
        tracing::debug!(written, "flushed vote sequence cache");
        Ok(written)
    }

    /// Number of cached accounts across both generations.
    pub fn len(&self) -> usize {
        let generations = self.lock();
        generations.current.len() + generations.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
