//! PoW validation.

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};
use lattice_types::Root;

use crate::WorkError;

/// Difficulty of `work` against `root`: the 8-byte Blake2b digest of
/// `work (LE) || root`, read as a little-endian integer.
pub fn work_difficulty(root: &Root, work: u64) -> u64 {
    let mut hasher = Blake2b::<U8>::new();
    hasher.update(work.to_le_bytes());
    hasher.update(root.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hasher.finalize());
    u64::from_le_bytes(out)
}

/// Whether `work` meets `threshold` for `root`. A zero threshold disables the check.
pub fn validate_work(root: &Root, work: u64, threshold: u64) -> bool {
    work_difficulty(root, work) >= threshold
}

pub fn check_work(root: &Root, work: u64, threshold: u64) -> Result<(), WorkError> {
    let actual = work_difficulty(root, work);
    if actual >= threshold {
        Ok(())
    } else {
        Err(WorkError::InsufficientDifficulty {
            actual,
            minimum: threshold,
        })
    }
}
