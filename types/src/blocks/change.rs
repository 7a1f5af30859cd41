use blake2::Digest;

use super::Blake2b256;
use crate::{Account, BlockHash, CodecError, Reader, Signature, Writer};

/// Legacy representative change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeBlock {
    pub previous: BlockHash,
    pub representative: Account,
    pub signature: Signature,
    pub work: u64,
}

impl ChangeBlock {
    pub const SIZE: usize = 32 + 32 + 64 + 8;

    pub(crate) fn hash_into(&self, hasher: &mut Blake2b256) {
        hasher.update(self.previous.as_bytes());
        hasher.update(self.representative.as_bytes());
    }

    pub(crate) fn serialize(&self, w: &mut Writer) {
        w.write_bytes(self.previous.as_bytes());
        w.write_bytes(self.representative.as_bytes());
        w.write_bytes(self.signature.as_bytes());
        w.write_u64_le(self.work);
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            previous: BlockHash::new(r.read_array()?),
            representative: Account::new(r.read_array()?),
            signature: Signature(r.read_array()?),
            work: r.read_u64_le()?,
        })
    }
}
