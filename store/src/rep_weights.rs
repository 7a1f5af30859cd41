//! Representative weights and online weight samples.
//!
//! A representative's weight is the sum of the balances of every account
//! naming it. Entries are maintained incrementally and removed at zero.

use lattice_types::{Account, Amount, Timestamp};

use crate::record::fixed;
use crate::{ReadTxn, StoreError, Table, WriteTxn};

fn decode_amount(bytes: &[u8]) -> Result<Amount, StoreError> {
    Ok(Amount::from_be_bytes(fixed(bytes, "amount")?))
}

pub trait RepWeightStore: ReadTxn {
    /// Zero for representatives with no entry.
    fn rep_weight(&self, representative: &Account) -> Result<Amount, StoreError> {
        match self.get(Table::RepWeights, representative.as_bytes())? {
            Some(bytes) => decode_amount(&bytes),
            None => Ok(Amount::ZERO),
        }
    }

    fn rep_weights_all(&self) -> Result<Vec<(Account, Amount)>, StoreError> {
        self.iter(Table::RepWeights)?
            .map(|entry| {
                let (key, value) = entry?;
                let rep = Account::new(fixed(&key, "representative")?);
                Ok((rep, decode_amount(&value)?))
            })
            .collect()
    }
}

impl<T: ReadTxn + ?Sized> RepWeightStore for T {}

pub trait RepWeightStoreMut: WriteTxn {
    fn rep_weight_add(&mut self, representative: &Account, amount: Amount) -> Result<(), StoreError> {
        if amount.is_zero() {
            return Ok(());
        }
        let weight = self
            .rep_weight(representative)?
            .checked_add(amount)
            .ok_or_else(|| StoreError::Corruption(format!("weight of {representative} overflows")))?;
        self.put(Table::RepWeights, representative.as_bytes(), &weight.to_be_bytes())
    }

    fn rep_weight_sub(&mut self, representative: &Account, amount: Amount) -> Result<(), StoreError> {
        if amount.is_zero() {
            return Ok(());
        }
        let weight = self
            .rep_weight(representative)?
            .checked_sub(amount)
            .ok_or_else(|| StoreError::Corruption(format!("weight of {representative} underflows")))?;
        if weight.is_zero() {
            self.delete(Table::RepWeights, representative.as_bytes())
        } else {
            self.put(Table::RepWeights, representative.as_bytes(), &weight.to_be_bytes())
        }
    }
}

impl<T: WriteTxn + ?Sized> RepWeightStoreMut for T {}

/// Samples of online voting weight keyed by sample time.
pub trait OnlineWeightStore: ReadTxn {
    /// Samples oldest first.
    fn online_weight_all(&self) -> Result<Vec<(Timestamp, Amount)>, StoreError> {
        self.iter(Table::OnlineWeight)?
            .map(|entry| {
                let (key, value) = entry?;
                let at = u64::from_be_bytes(fixed(&key, "online weight time")?);
                Ok((Timestamp::new(at), decode_amount(&value)?))
            })
            .collect()
    }
}

impl<T: ReadTxn + ?Sized> OnlineWeightStore for T {}

pub trait OnlineWeightStoreMut: WriteTxn {
    fn online_weight_put(&mut self, at: Timestamp, weight: Amount) -> Result<(), StoreError> {
        self.put(
            Table::OnlineWeight,
            &at.as_secs().to_be_bytes(),
            &weight.to_be_bytes(),
        )
    }
}

impl<T: WriteTxn + ?Sized> OnlineWeightStoreMut for T {}
