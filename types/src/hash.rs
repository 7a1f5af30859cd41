//! 32-byte block identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Account;

/// Content digest of a block (blake2b-256, signature and work excluded).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a 64-character hex string.
    pub fn decode_hex(s: &str) -> Option<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    /// Build a hash from a 32-byte table key.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Some(Self(bytes.try_into().ok()?))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

/// The `link` field of a state block.
///
/// Interpreted as the destination account for a send, the source block hash
/// for a receive, or the epoch marker for an epoch upgrade.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Link([u8; 32]);

impl Link {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_account(&self) -> Account {
        Account::new(self.0)
    }

    pub fn as_block_hash(&self) -> BlockHash {
        BlockHash::new(self.0)
    }

    /// Epoch markers are ASCII tags left-aligned and zero padded.
    pub fn from_tag(tag: &str) -> Self {
        let mut bytes = [0u8; 32];
        let len = tag.len().min(32);
        bytes[..len].copy_from_slice(&tag.as_bytes()[..len]);
        Self(bytes)
    }
}

impl From<Account> for Link {
    fn from(account: Account) -> Self {
        Self(*account.as_bytes())
    }
}

impl From<BlockHash> for Link {
    fn from(hash: BlockHash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", hex::encode(&self.0[..4]))
    }
}

/// Chain anchor used for work: the previous hash, or the account for a first block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Root([u8; 32]);

impl Root {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<Account> for Root {
    fn from(account: Account) -> Self {
        Self(*account.as_bytes())
    }
}

impl From<BlockHash> for Root {
    fn from(hash: BlockHash) -> Self {
        Self(*hash.as_bytes())
    }
}
