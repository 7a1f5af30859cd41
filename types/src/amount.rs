//! Raw token amounts.
//!
//! Amounts are fixed-point integers (u128) counted in raw units. There is no
//! floating point anywhere in balance arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub const fn raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn number(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_arithmetic_detects_overflow() {
        assert_eq!(Amount::MAX.checked_add(Amount::raw(1)), None);
        assert_eq!(Amount::ZERO.checked_sub(Amount::raw(1)), None);
        assert_eq!(
            Amount::raw(5).checked_sub(Amount::raw(3)),
            Some(Amount::raw(2))
        );
    }

    #[test]
    fn big_endian_bytes_preserve_order() {
        let small = Amount::raw(255).to_be_bytes();
        let large = Amount::raw(256).to_be_bytes();
        assert!(small < large);
        assert_eq!(Amount::from_be_bytes(large), Amount::raw(256));
    }
}
