//! Confirmation heights.
//!
//! Blocks at or below an account's confirmation height are settled and
//! cannot be rolled back. Heights only grow, except through the explicit
//! administrative reset.

use lattice_types::{Account, BlockHash};
use serde::{Deserialize, Serialize};

use crate::record::{decode, encode};
use crate::{ReadTxn, StoreError, Table, WriteTxn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationHeightInfo {
    pub height: u64,
    /// Block at `height`, zero when nothing is confirmed.
    pub frontier: BlockHash,
}

pub trait ConfirmationHeightStore: ReadTxn {
    fn confirmation_height_get(
        &self,
        account: &Account,
    ) -> Result<Option<ConfirmationHeightInfo>, StoreError> {
        self.get(Table::ConfirmationHeight, account.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn confirmation_height_exists(&self, account: &Account) -> Result<bool, StoreError> {
        self.exists(Table::ConfirmationHeight, account.as_bytes())
    }
}

impl<T: ReadTxn + ?Sized> ConfirmationHeightStore for T {}

pub trait ConfirmationHeightStoreMut: WriteTxn {
    fn confirmation_height_put(
        &mut self,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError> {
        self.put(Table::ConfirmationHeight, account.as_bytes(), &encode(info)?)
    }

    fn confirmation_height_del(&mut self, account: &Account) -> Result<(), StoreError> {
        self.delete(Table::ConfirmationHeight, account.as_bytes())
    }
}

impl<T: WriteTxn + ?Sized> ConfirmationHeightStoreMut for T {}
