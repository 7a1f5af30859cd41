//! Nullable infrastructure for deterministic testing.
//!
//! Test-friendly implementations of the ledger's external dependencies that
//! return deterministic values, can be controlled programmatically and never
//! touch the filesystem:
//! - [`NullClock`]: time only moves when told to
//! - [`NullStore`]: the full [`lattice_store::Store`] contract in memory

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullStore;
