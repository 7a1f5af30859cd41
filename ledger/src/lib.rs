//! Block-lattice ledger.
//!
//! Every account owns a chain of blocks. The ledger validates candidate
//! blocks against the stored account state and applies accepted ones,
//! keeping blocks, account heads, pending receivables, representative
//! weights and frontiers consistent inside a single write transaction.
//! Rollback reverses exactly what `process` wrote.

pub mod block_processor;
pub mod error;
pub mod genesis;
pub mod ledger;
pub mod process;
pub mod process_result;
pub mod rollback;

pub use block_processor::{BlockProcessor, ProcessedBlock};
pub use error::LedgerError;
pub use genesis::{dev_genesis_key, genesis_key, Genesis, LedgerConstants, EPOCH_V1_TAG};
pub use ledger::{Chain, Ledger, GENESIS_TABLES, PROCESS_TABLES};
pub use process_result::{ProcessResult, ProcessReturn};
