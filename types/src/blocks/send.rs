use blake2::Digest;

use super::Blake2b256;
use crate::{Account, Amount, BlockHash, CodecError, Reader, Signature, Writer};

/// Legacy send: moves `previous balance - balance` to `destination`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendBlock {
    pub previous: BlockHash,
    pub destination: Account,
    /// Balance of the sending account after this block.
    pub balance: Amount,
    pub signature: Signature,
    pub work: u64,
}

impl SendBlock {
    pub const SIZE: usize = 32 + 32 + 16 + 64 + 8;

    pub(crate) fn hash_into(&self, hasher: &mut Blake2b256) {
        hasher.update(self.previous.as_bytes());
        hasher.update(self.destination.as_bytes());
        hasher.update(self.balance.to_be_bytes());
    }

    pub(crate) fn serialize(&self, w: &mut Writer) {
        w.write_bytes(self.previous.as_bytes());
        w.write_bytes(self.destination.as_bytes());
        w.write_u128_be(self.balance.number());
        w.write_bytes(self.signature.as_bytes());
        w.write_u64_le(self.work);
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            previous: BlockHash::new(r.read_array()?),
            destination: Account::new(r.read_array()?),
            balance: Amount::raw(r.read_u128_be()?),
            signature: Signature(r.read_array()?),
            work: r.read_u64_le()?,
        })
    }
}
