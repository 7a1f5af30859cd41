use blake2::Digest;

use super::Blake2b256;
use crate::{BlockHash, CodecError, Reader, Signature, Writer};

/// Legacy receive: pockets the pending entry created by `source`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveBlock {
    pub previous: BlockHash,
    pub source: BlockHash,
    pub signature: Signature,
    pub work: u64,
}

impl ReceiveBlock {
    pub const SIZE: usize = 32 + 32 + 64 + 8;

    pub(crate) fn hash_into(&self, hasher: &mut Blake2b256) {
        hasher.update(self.previous.as_bytes());
        hasher.update(self.source.as_bytes());
    }

    pub(crate) fn serialize(&self, w: &mut Writer) {
        w.write_bytes(self.previous.as_bytes());
        w.write_bytes(self.source.as_bytes());
        w.write_bytes(self.signature.as_bytes());
        w.write_u64_le(self.work);
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            previous: BlockHash::new(r.read_array()?),
            source: BlockHash::new(r.read_array()?),
            signature: Signature(r.read_array()?),
            work: r.read_u64_le()?,
        })
    }
}
