use lattice_types::{Account, BlockHash, CodecError};
use thiserror::Error;

/// Failures of ledger operations that are not block validation outcomes.
///
/// Any of these leaves the write transaction in an unknown state; the
/// caller must drop it without committing.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Store(#[from] lattice_store::StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("cannot roll back {hash}: account head is {head}")]
    RollbackNotHead { hash: BlockHash, head: BlockHash },

    #[error("cannot roll back {hash} at height {height}: confirmed up to {confirmed}")]
    RollbackConfirmed {
        hash: BlockHash,
        height: u64,
        confirmed: u64,
    },

    #[error("block not found: {0}")]
    MissingBlock(BlockHash),

    #[error("account not found: {0}")]
    MissingAccount(Account),

    #[error("amount overflow applying {0}")]
    Overflow(BlockHash),
}
