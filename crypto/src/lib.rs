//! Cryptographic primitives for the lattice ledger.
//!
//! - **Ed25519** for block signatures (the account key is the public key)
//! - **Blake2b-256** for general-purpose digests
//! - `lat_` account address text encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_account, encode_account, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_block, sign_message, verify_block_signature, verify_signature};
