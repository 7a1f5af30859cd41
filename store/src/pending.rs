//! Pending (receivable) entries.

use lattice_types::{Account, Amount, BlockHash, Epoch};
use serde::{Deserialize, Serialize};

use crate::record::{decode, encode, fixed};
use crate::{ReadTxn, StoreError, Table, WriteTxn};

/// `(destination, source block)`; encodes to 64 bytes ordered by
/// destination first, so one account's entries are contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PendingKey {
    pub account: Account,
    pub hash: BlockHash,
}

impl PendingKey {
    pub fn new(account: Account, hash: BlockHash) -> Self {
        Self { account, hash }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(self.account.as_bytes());
        bytes[32..].copy_from_slice(self.hash.as_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let bytes: [u8; 64] = fixed(bytes, "pending key")?;
        let mut account = [0u8; 32];
        let mut hash = [0u8; 32];
        account.copy_from_slice(&bytes[..32]);
        hash.copy_from_slice(&bytes[32..]);
        Ok(Self::new(Account::new(account), BlockHash::new(hash)))
    }
}

/// An unclaimed transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInfo {
    /// Sending account.
    pub source: Account,
    pub amount: Amount,
    /// Epoch of the send; legacy receives can only pocket epoch 0 entries.
    pub epoch: Epoch,
}

pub trait PendingStore: ReadTxn {
    fn pending_get(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
        self.get(Table::Pending, &key.to_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn pending_exists(&self, key: &PendingKey) -> Result<bool, StoreError> {
        self.exists(Table::Pending, &key.to_bytes())
    }

    /// Every pending entry of `account`, ordered by source hash.
    fn pending_for_account(
        &self,
        account: &Account,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
        let start = PendingKey::new(*account, BlockHash::ZERO).to_bytes();
        let mut entries = Vec::new();
        for entry in self.iter_from(Table::Pending, Some(&start))? {
            let (key, value) = entry?;
            let key = PendingKey::from_bytes(&key)?;
            if key.account != *account {
                break;
            }
            entries.push((key, decode(&value)?));
        }
        Ok(entries)
    }

    fn pending_all(&self) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
        self.iter(Table::Pending)?
            .map(|entry| {
                let (key, value) = entry?;
                Ok((PendingKey::from_bytes(&key)?, decode(&value)?))
            })
            .collect()
    }
}

impl<T: ReadTxn + ?Sized> PendingStore for T {}

pub trait PendingStoreMut: WriteTxn {
    fn pending_put(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError> {
        self.put(Table::Pending, &key.to_bytes(), &encode(info)?)
    }

    fn pending_del(&mut self, key: &PendingKey) -> Result<(), StoreError> {
        self.delete(Table::Pending, &key.to_bytes())
    }
}

impl<T: WriteTxn + ?Sized> PendingStoreMut for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_orders_by_account_then_hash() {
        let a = PendingKey::new(Account::new([1; 32]), BlockHash::new([9; 32]));
        let b = PendingKey::new(Account::new([2; 32]), BlockHash::new([0; 32]));
        assert!(a.to_bytes() < b.to_bytes());
        assert_eq!(PendingKey::from_bytes(&a.to_bytes()).unwrap(), a);
    }
}
