//! Decode errors for the binary codec.

use thiserror::Error;

/// Failure to decode a fixed-layout record or block.
///
/// Decoding never falls back to defaults: every short, oversized or
/// mistagged buffer is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("truncated input: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("unknown block type tag {0}")]
    UnknownType(u8),

    #[error("block type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: u8, found: u8 },

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("malformed record: {0}")]
    Malformed(String),
}
