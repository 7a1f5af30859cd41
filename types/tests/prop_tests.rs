use proptest::prelude::*;

use lattice_types::{
    Account, Amount, Block, BlockHash, ChangeBlock, Link, OpenBlock, ReceiveBlock, SendBlock,
    Signature, StateBlock,
};

fn hash32() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

fn signature() -> impl Strategy<Value = Signature> {
    (hash32(), hash32()).prop_map(|(a, b)| {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&a);
        bytes[32..].copy_from_slice(&b);
        Signature(bytes)
    })
}

fn any_block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (hash32(), hash32(), any::<u128>(), signature(), any::<u64>()).prop_map(
            |(previous, destination, balance, signature, work)| {
                Block::Send(SendBlock {
                    previous: BlockHash::new(previous),
                    destination: Account::new(destination),
                    balance: Amount::raw(balance),
                    signature,
                    work,
                })
            }
        ),
        (hash32(), hash32(), signature(), any::<u64>()).prop_map(
            |(previous, source, signature, work)| {
                Block::Receive(ReceiveBlock {
                    previous: BlockHash::new(previous),
                    source: BlockHash::new(source),
                    signature,
                    work,
                })
            }
        ),
        (hash32(), hash32(), hash32(), signature(), any::<u64>()).prop_map(
            |(source, representative, account, signature, work)| {
                Block::Open(OpenBlock {
                    source: BlockHash::new(source),
                    representative: Account::new(representative),
                    account: Account::new(account),
                    signature,
                    work,
                })
            }
        ),
        (hash32(), hash32(), signature(), any::<u64>()).prop_map(
            |(previous, representative, signature, work)| {
                Block::Change(ChangeBlock {
                    previous: BlockHash::new(previous),
                    representative: Account::new(representative),
                    signature,
                    work,
                })
            }
        ),
        (
            (hash32(), hash32(), hash32()),
            any::<u128>(),
            hash32(),
            signature(),
            any::<u64>()
        )
            .prop_map(
                |((account, previous, representative), balance, link, signature, work)| {
                    Block::State(StateBlock {
                        account: Account::new(account),
                        previous: BlockHash::new(previous),
                        representative: Account::new(representative),
                        balance: Amount::raw(balance),
                        link: Link::new(link),
                        signature,
                        work,
                    })
                }
            ),
    ]
}

proptest! {
    /// Every variant decodes back to an equal block, through both entry points.
    #[test]
    fn block_codec_round_trip(block in any_block()) {
        let typed = block.serialize_typed();
        prop_assert_eq!(&Block::deserialize_typed(&typed).unwrap(), &block);
        let body = block.serialize();
        prop_assert_eq!(Block::deserialize(block.block_type(), &body).unwrap(), block);
    }

    /// The hash is stable and blind to signature and work.
    #[test]
    fn hash_is_stable_and_content_only(block in any_block(), sig in signature(), work in any::<u64>()) {
        let hash = block.hash();
        prop_assert_eq!(hash, block.hash());
        let mut resigned = block.clone();
        resigned.set_signature(sig);
        resigned.set_work(work);
        prop_assert_eq!(resigned.hash(), hash);
    }

    /// Any strict prefix of an encoded block is rejected.
    #[test]
    fn truncated_blocks_never_decode(block in any_block(), cut in 1usize..64) {
        let typed = block.serialize_typed();
        let len = typed.len().saturating_sub(cut);
        prop_assert!(Block::deserialize_typed(&typed[..len]).is_err());
    }

    #[test]
    fn block_hash_is_zero_correct(bytes in hash32()) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Key types keep a fixed 32-byte bincode layout.
    #[test]
    fn account_bincode_is_fixed_width(bytes in hash32()) {
        let account = Account::new(bytes);
        let encoded = bincode::serialize(&account).unwrap();
        prop_assert_eq!(encoded.len(), 32);
        let decoded: Account = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, account);
    }
}
