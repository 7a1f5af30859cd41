//! Fixed-layout encoding of store records.
//!
//! Records use bincode with fixed-width integers, so every record of a type
//! has the same size and decoding rejects leftovers.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::StoreError;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    options()
        .serialize(value)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    options()
        .deserialize(bytes)
        .map_err(|e| StoreError::Corruption(e.to_string()))
}

/// Copy a fixed-size key or value out of stored bytes.
pub fn fixed<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N], StoreError> {
    bytes.try_into().map_err(|_| {
        StoreError::Corruption(format!(
            "{what}: expected {N} bytes, found {}",
            bytes.len()
        ))
    })
}
