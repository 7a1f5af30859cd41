//! Fundamental types for the lattice ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! accounts, hashes, amounts, keys, timestamps, epochs, the fixed-layout binary
//! codec and the five block variants built on it.

pub mod account;
pub mod amount;
pub mod blocks;
pub mod codec;
pub mod epoch;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod time;

pub use account::Account;
pub use amount::Amount;
pub use blocks::{
    Block, BlockType, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock,
};
pub use codec::{Reader, Writer};
pub use epoch::Epoch;
pub use error::CodecError;
pub use hash::{BlockHash, Link, Root};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::{Clock, SystemClock, Timestamp};
