//! Account heads.

use lattice_types::{Account, Amount, BlockHash, Epoch, Timestamp};
use serde::{Deserialize, Serialize};

use crate::record::{decode, encode};
use crate::{ReadTxn, StoreError, Table, WriteTxn};

/// Per-account head record. Exists from the account's open block until the
/// open block itself is rolled back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Latest block in the chain (the frontier).
    pub head: BlockHash,
    /// Most recent block that named a representative.
    pub rep_block: BlockHash,
    pub open_block: BlockHash,
    pub balance: Amount,
    pub modified: Timestamp,
    pub block_count: u64,
    pub epoch: Epoch,
}

/// Lazily decoded `(account, info)` pairs.
pub type AccountIter<'a> =
    Box<dyn Iterator<Item = Result<(Account, AccountInfo), StoreError>> + 'a>;

pub trait AccountStore: ReadTxn {
    fn account_get(&self, account: &Account) -> Result<Option<AccountInfo>, StoreError> {
        self.get(Table::Accounts, account.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn account_exists(&self, account: &Account) -> Result<bool, StoreError> {
        self.exists(Table::Accounts, account.as_bytes())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        self.count(Table::Accounts)
    }

    /// Accounts in key order starting at `start`, decoded as the iterator
    /// advances.
    fn accounts_iter<'a>(&'a self, start: Option<&Account>) -> Result<AccountIter<'a>, StoreError> {
        let entries = self.iter_from(Table::Accounts, start.map(|a| &a.as_bytes()[..]))?;
        Ok(Box::new(entries.map(|entry| {
            let (key, value) = entry?;
            let account = Account::from_slice(&key)
                .ok_or_else(|| StoreError::Corruption("account key length".into()))?;
            Ok((account, decode(&value)?))
        })))
    }

    /// Accounts in key order starting at `start`.
    fn accounts_from(
        &self,
        start: Option<&Account>,
    ) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
        self.accounts_iter(start)?.collect()
    }
}

impl<T: ReadTxn + ?Sized> AccountStore for T {}

pub trait AccountStoreMut: WriteTxn {
    fn account_put(&mut self, account: &Account, info: &AccountInfo) -> Result<(), StoreError> {
        self.put(Table::Accounts, account.as_bytes(), &encode(info)?)
    }

    fn account_del(&mut self, account: &Account) -> Result<(), StoreError> {
        self.delete(Table::Accounts, account.as_bytes())
    }
}

impl<T: WriteTxn + ?Sized> AccountStoreMut for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_info_has_fixed_size() {
        let info = AccountInfo {
            head: BlockHash::new([1; 32]),
            rep_block: BlockHash::new([2; 32]),
            open_block: BlockHash::new([3; 32]),
            balance: Amount::MAX,
            modified: Timestamp::new(u64::MAX),
            block_count: 9,
            epoch: Epoch::Epoch1,
        };
        let bytes = encode(&info).unwrap();
        assert_eq!(bytes.len(), 32 * 3 + 16 + 8 + 8 + 4);
        assert_eq!(decode::<AccountInfo>(&bytes).unwrap(), info);
    }
}
