//! Anti-spam proof-of-work.
//!
//! A block's work value must hash together with the block's root to a
//! difficulty at or above a network-wide threshold. Generating work is the
//! wallet's job; the ledger only validates.

pub mod error;
pub mod thresholds;
pub mod validator;

pub use error::WorkError;
pub use thresholds::{WorkBlockKind, WorkThresholds};
pub use validator::{check_work, validate_work, work_difficulty};
