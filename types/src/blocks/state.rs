use blake2::Digest;

use super::{Blake2b256, BlockType};
use crate::{Account, Amount, BlockHash, CodecError, Link, Reader, Signature, Writer};

/// Unified block carrying the complete account state after it is applied.
///
/// Whether it sends, receives, changes representative or upgrades the epoch
/// is derived from the previous balance and `link`, not from a tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBlock {
    pub account: Account,
    pub previous: BlockHash,
    pub representative: Account,
    pub balance: Amount,
    pub link: Link,
    pub signature: Signature,
    pub work: u64,
}

/// Hash preamble separating state hashes from every legacy layout.
fn preamble() -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = BlockType::State.as_u8();
    bytes
}

impl StateBlock {
    pub const SIZE: usize = 32 + 32 + 32 + 16 + 32 + 64 + 8;

    pub(crate) fn hash_into(&self, hasher: &mut Blake2b256) {
        hasher.update(preamble());
        hasher.update(self.account.as_bytes());
        hasher.update(self.previous.as_bytes());
        hasher.update(self.representative.as_bytes());
        hasher.update(self.balance.to_be_bytes());
        hasher.update(self.link.as_bytes());
    }

    pub(crate) fn serialize(&self, w: &mut Writer) {
        w.write_bytes(self.account.as_bytes());
        w.write_bytes(self.previous.as_bytes());
        w.write_bytes(self.representative.as_bytes());
        w.write_u128_be(self.balance.number());
        w.write_bytes(self.link.as_bytes());
        w.write_bytes(self.signature.as_bytes());
        w.write_u64_be(self.work);
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            account: Account::new(r.read_array()?),
            previous: BlockHash::new(r.read_array()?),
            representative: Account::new(r.read_array()?),
            balance: Amount::raw(r.read_u128_be()?),
            link: Link::new(r.read_array()?),
            signature: Signature(r.read_array()?),
            work: r.read_u64_be()?,
        })
    }
}
