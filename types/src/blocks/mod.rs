//! The five block variants and their common surface.
//!
//! A block is a tagged union; every operation matches exhaustively, so a new
//! variant cannot be forgotten by `hash`, `root`, the codec or the ledger.

mod change;
mod open;
mod receive;
mod send;
mod state;

pub use change::ChangeBlock;
pub use open::OpenBlock;
pub use receive::ReceiveBlock;
pub use send::SendBlock;
pub use state::StateBlock;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::{Account, Amount, BlockHash, CodecError, Link, Reader, Root, Signature, Writer};

pub(crate) type Blake2b256 = Blake2b<U32>;

fn finalize(hasher: Blake2b256) -> BlockHash {
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    BlockHash::new(out)
}

/// On-disk and on-wire type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum BlockType {
    Invalid = 0,
    NotABlock = 1,
    Send = 2,
    Receive = 3,
    Open = 4,
    Change = 5,
    State = 6,
}

impl BlockType {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Invalid,
            1 => Self::NotABlock,
            2 => Self::Send,
            3 => Self::Receive,
            4 => Self::Open,
            5 => Self::Change,
            6 => Self::State,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Encoded body size, `None` for tags that carry no block.
    pub fn serialized_size(self) -> Option<usize> {
        match self {
            Self::Send => Some(SendBlock::SIZE),
            Self::Receive => Some(ReceiveBlock::SIZE),
            Self::Open => Some(OpenBlock::SIZE),
            Self::Change => Some(ChangeBlock::SIZE),
            Self::State => Some(StateBlock::SIZE),
            Self::Invalid | Self::NotABlock => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Send(_) => BlockType::Send,
            Block::Receive(_) => BlockType::Receive,
            Block::Open(_) => BlockType::Open,
            Block::Change(_) => BlockType::Change,
            Block::State(_) => BlockType::State,
        }
    }

    /// Digest of the signed content. Signature and work do not contribute.
    pub fn hash(&self) -> BlockHash {
        let mut hasher = Blake2b256::new();
        match self {
            Block::Send(b) => b.hash_into(&mut hasher),
            Block::Receive(b) => b.hash_into(&mut hasher),
            Block::Open(b) => b.hash_into(&mut hasher),
            Block::Change(b) => b.hash_into(&mut hasher),
            Block::State(b) => b.hash_into(&mut hasher),
        }
        finalize(hasher)
    }

    /// Identity including signature and work.
    pub fn full_hash(&self) -> BlockHash {
        let mut hasher = Blake2b256::new();
        hasher.update(self.hash().as_bytes());
        hasher.update(self.signature().as_bytes());
        hasher.update(self.work().to_le_bytes());
        finalize(hasher)
    }

    /// Previous block in the chain, zero for a first block.
    pub fn previous(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.previous,
            Block::Receive(b) => b.previous,
            Block::Open(_) => BlockHash::ZERO,
            Block::Change(b) => b.previous,
            Block::State(b) => b.previous,
        }
    }

    pub fn root(&self) -> Root {
        match self {
            Block::Open(b) => Root::from(b.account),
            Block::State(b) if b.previous.is_zero() => Root::from(b.account),
            _ => Root::from(self.previous()),
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            Block::Send(b) => b.signature,
            Block::Receive(b) => b.signature,
            Block::Open(b) => b.signature,
            Block::Change(b) => b.signature,
            Block::State(b) => b.signature,
        }
    }

    pub fn set_signature(&mut self, signature: Signature) {
        match self {
            Block::Send(b) => b.signature = signature,
            Block::Receive(b) => b.signature = signature,
            Block::Open(b) => b.signature = signature,
            Block::Change(b) => b.signature = signature,
            Block::State(b) => b.signature = signature,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Block::Send(b) => b.work,
            Block::Receive(b) => b.work,
            Block::Open(b) => b.work,
            Block::Change(b) => b.work,
            Block::State(b) => b.work,
        }
    }

    pub fn set_work(&mut self, work: u64) {
        match self {
            Block::Send(b) => b.work = work,
            Block::Receive(b) => b.work = work,
            Block::Open(b) => b.work = work,
            Block::Change(b) => b.work = work,
            Block::State(b) => b.work = work,
        }
    }

    /// Account named in the block itself (open and state blocks only).
    pub fn account_field(&self) -> Option<Account> {
        match self {
            Block::Open(b) => Some(b.account),
            Block::State(b) => Some(b.account),
            _ => None,
        }
    }

    pub fn representative_field(&self) -> Option<Account> {
        match self {
            Block::Open(b) => Some(b.representative),
            Block::Change(b) => Some(b.representative),
            Block::State(b) => Some(b.representative),
            Block::Send(_) | Block::Receive(_) => None,
        }
    }

    /// Source hash of a legacy receive or open.
    pub fn source_field(&self) -> Option<BlockHash> {
        match self {
            Block::Receive(b) => Some(b.source),
            Block::Open(b) => Some(b.source),
            _ => None,
        }
    }

    pub fn destination_field(&self) -> Option<Account> {
        match self {
            Block::Send(b) => Some(b.destination),
            _ => None,
        }
    }

    pub fn balance_field(&self) -> Option<Amount> {
        match self {
            Block::Send(b) => Some(b.balance),
            Block::State(b) => Some(b.balance),
            _ => None,
        }
    }

    pub fn link_field(&self) -> Option<Link> {
        match self {
            Block::State(b) => Some(b.link),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, Block::State(_))
    }

    /// Body bytes without the type tag.
    pub fn serialize(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(StateBlock::SIZE);
        self.write(&mut w);
        w.into_inner()
    }

    /// Type tag followed by the body.
    pub fn serialize_typed(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(1 + StateBlock::SIZE);
        w.write_u8(self.block_type().as_u8());
        self.write(&mut w);
        w.into_inner()
    }

    pub fn write(&self, w: &mut Writer) {
        match self {
            Block::Send(b) => b.serialize(w),
            Block::Receive(b) => b.serialize(w),
            Block::Open(b) => b.serialize(w),
            Block::Change(b) => b.serialize(w),
            Block::State(b) => b.serialize(w),
        }
    }

    /// Decode a body of the given type. The input must be exactly one block.
    pub fn deserialize(block_type: BlockType, bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(bytes);
        let block = Self::read(block_type, &mut r)?;
        r.finish()?;
        Ok(block)
    }

    /// Decode a tag-prefixed block. The input must be exactly one block.
    pub fn deserialize_typed(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(bytes);
        let block = Self::read_typed(&mut r)?;
        r.finish()?;
        Ok(block)
    }

    pub fn read_typed(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let tag = r.read_u8()?;
        let block_type = BlockType::from_u8(tag).ok_or(CodecError::UnknownType(tag))?;
        Self::read(block_type, r)
    }

    pub fn read(block_type: BlockType, r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(match block_type {
            BlockType::Send => Block::Send(SendBlock::deserialize(r)?),
            BlockType::Receive => Block::Receive(ReceiveBlock::deserialize(r)?),
            BlockType::Open => Block::Open(OpenBlock::deserialize(r)?),
            BlockType::Change => Block::Change(ChangeBlock::deserialize(r)?),
            BlockType::State => Block::State(StateBlock::deserialize(r)?),
            BlockType::Invalid | BlockType::NotABlock => {
                return Err(CodecError::UnknownType(block_type.as_u8()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_send() -> Block {
        Block::Send(SendBlock {
            previous: BlockHash::new([1; 32]),
            destination: Account::new([2; 32]),
            balance: Amount::raw(1000),
            signature: Signature([3; 64]),
            work: 42,
        })
    }

    fn sample_state(previous: BlockHash) -> Block {
        Block::State(StateBlock {
            account: Account::new([4; 32]),
            previous,
            representative: Account::new([5; 32]),
            balance: Amount::raw(7),
            link: Link::new([6; 32]),
            signature: Signature([7; 64]),
            work: 99,
        })
    }

    #[test]
    fn hash_ignores_signature_and_work() {
        let block = sample_send();
        let mut other = block.clone();
        other.set_signature(Signature([0xEE; 64]));
        other.set_work(7);
        assert_eq!(block.hash(), other.hash());
        assert_ne!(block.full_hash(), other.full_hash());
    }

    #[test]
    fn typed_round_trip() {
        let block = sample_state(BlockHash::new([9; 32]));
        let bytes = block.serialize_typed();
        assert_eq!(bytes.len(), 1 + StateBlock::SIZE);
        assert_eq!(Block::deserialize_typed(&bytes).unwrap(), block);
    }

    #[test]
    fn decode_rejects_wrong_tag_and_size() {
        let block = sample_send();
        let body = block.serialize();
        assert!(matches!(
            Block::deserialize(BlockType::Receive, &body),
            Err(CodecError::TrailingBytes(_))
        ));
        assert!(matches!(
            Block::deserialize(BlockType::Send, &body[..body.len() - 1]),
            Err(CodecError::Truncated { .. })
        ));
        assert_eq!(
            Block::deserialize_typed(&[0xFF]),
            Err(CodecError::UnknownType(0xFF))
        );
        assert_eq!(
            Block::deserialize_typed(&[BlockType::NotABlock.as_u8()]),
            Err(CodecError::UnknownType(1))
        );
    }

    #[test]
    fn root_falls_back_to_account_for_first_block() {
        let first = sample_state(BlockHash::ZERO);
        assert_eq!(first.root(), Root::from(Account::new([4; 32])));
        let next = sample_state(BlockHash::new([9; 32]));
        assert_eq!(next.root(), Root::from(BlockHash::new([9; 32])));
    }

    #[test]
    fn state_and_legacy_hashes_are_domain_separated() {
        // Same leading bytes, different variant: never equal, never same hash.
        let change = Block::Change(ChangeBlock {
            previous: BlockHash::new([4; 32]),
            representative: Account::new([5; 32]),
            signature: Signature::ZERO,
            work: 0,
        });
        let state = sample_state(BlockHash::new([4; 32]));
        assert_ne!(change, state);
        assert_ne!(change.hash(), state.hash());
    }

    #[test]
    fn serialized_sizes_match_declared() {
        for block in [sample_send(), sample_state(BlockHash::ZERO)] {
            assert_eq!(
                Some(block.serialize().len()),
                block.block_type().serialized_size()
            );
        }
    }
}
