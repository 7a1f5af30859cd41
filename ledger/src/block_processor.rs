//! Block processing with gap replay.
//!
//! Each block is validated and applied in its own write transaction, so a
//! crash between blocks never leaves indices out of step with the block
//! table. When a block makes progress, blocks parked in the unchecked table
//! waiting for its hash are queued behind the rest of the batch. A replayed
//! block leaves the unchecked table in the same transaction that processes
//! it, so an interrupted replay simply finds it parked again.

use std::collections::VecDeque;

use lattice_store::{Store, UncheckedStore, UncheckedStoreMut};
use lattice_types::{Block, BlockHash};

use crate::{Ledger, LedgerError, ProcessResult, ProcessReturn, PROCESS_TABLES};

/// Outcome for one block of a batch, replayed blocks included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedBlock {
    pub hash: BlockHash,
    pub result: ProcessReturn,
    /// Hash this block was parked under, for replayed blocks.
    pub replayed_from: Option<BlockHash>,
}

struct Queued {
    block: Block,
    dependency: Option<BlockHash>,
}

pub struct BlockProcessor<'a> {
    store: &'a dyn Store,
    ledger: &'a Ledger,
}

impl<'a> BlockProcessor<'a> {
    pub fn new(store: &'a dyn Store, ledger: &'a Ledger) -> Self {
        Self { store, ledger }
    }

    /// Process a single block and everything it unblocks.
    pub fn process(&self, block: Block) -> Result<Vec<ProcessedBlock>, LedgerError> {
        self.process_batch([block])
    }

    /// Process `blocks` in order, then every parked block they unblock.
    pub fn process_batch(
        &self,
        blocks: impl IntoIterator<Item = Block>,
    ) -> Result<Vec<ProcessedBlock>, LedgerError> {
        let mut queue: VecDeque<Queued> = blocks
            .into_iter()
            .map(|block| Queued {
                block,
                dependency: None,
            })
            .collect();
        let mut processed = Vec::with_capacity(queue.len());
        let mut replayed = 0usize;

        while let Some(Queued { block, dependency }) = queue.pop_front() {
            let hash = block.hash();
            let mut txn = self.store.begin_write(PROCESS_TABLES)?;
            if let Some(dependency) = &dependency {
                if !txn.unchecked_get(dependency)?.contains(&block) {
                    // Already replayed by an earlier entry of this batch.
                    continue;
                }
                txn.unchecked_del(dependency, &block)?;
                replayed += 1;
            }

            let result = self.ledger.process(txn.as_mut(), &block)?;
            let unblocked = if result.code == ProcessResult::Progress {
                txn.unchecked_get(&hash)?
            } else {
                Vec::new()
            };
            txn.commit()?;

            queue.extend(unblocked.into_iter().map(|block| Queued {
                block,
                dependency: Some(hash),
            }));
            processed.push(ProcessedBlock {
                hash,
                result,
                replayed_from: dependency,
            });
        }

        let progressed = processed
            .iter()
            .filter(|entry| entry.result.code == ProcessResult::Progress)
            .count();
        tracing::debug!(
            processed = processed.len(),
            progressed,
            replayed,
            "processed block batch"
        );
        Ok(processed)
    }
}
