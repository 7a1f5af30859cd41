//! LMDB storage backend for the lattice ledger.
//!
//! One heed environment holds one named database per logical table. The
//! backend implements the `lattice-store` transaction traits directly;
//! typed access comes from the extension traits in that crate.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod transaction;

pub use environment::{LmdbConfig, LmdbStore, DATA_FILE};
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
