//! Account and block epochs.

use serde::{Deserialize, Serialize};

/// Protocol generation an account (and each of its blocks) belongs to.
///
/// Epoch upgrades are performed by epoch blocks; they never rewrite history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Epoch {
    /// Legacy accounts and any account that has not been upgraded.
    #[default]
    Epoch0,
    /// Upgraded by an epoch block; legacy blocks are no longer accepted.
    Epoch1,
}

impl Epoch {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Epoch0 => 0,
            Self::Epoch1 => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Epoch0),
            1 => Some(Self::Epoch1),
            _ => None,
        }
    }
}
