//! Genesis block and per-network ledger constants.
//!
//! The genesis block is a legacy open block whose source is the genesis
//! account itself. It is written directly by `Ledger::initialize`, never
//! through `process`, and holds the entire supply. Keys are derived from a
//! fixed per-network seed so every node agrees on the genesis hash; only
//! the dev key is meant to be used for signing.

use lattice_crypto::{blake2b_256, keypair_from_seed, sign_block};
use lattice_types::{Account, Amount, Block, BlockHash, KeyPair, Link, NetworkId, OpenBlock, Signature};
use lattice_work::WorkThresholds;

/// Link value marking a state block as an epoch upgrade.
pub const EPOCH_V1_TAG: &str = "epoch v1 block";

/// Work threshold of the test network.
const TEST_WORK_BASE: u64 = 0xFF00_0000_0000_0000;

fn genesis_seed(network: NetworkId) -> [u8; 32] {
    blake2b_256(format!("lattice genesis {}", network.as_str()).as_bytes())
}

/// Signing key of the genesis account on `network`.
pub fn genesis_key(network: NetworkId) -> KeyPair {
    keypair_from_seed(&genesis_seed(network))
}

/// The dev network genesis key, for tests and local tooling.
pub fn dev_genesis_key() -> KeyPair {
    genesis_key(NetworkId::Dev)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Genesis {
    pub account: Account,
    pub block: Block,
    pub supply: Amount,
}

impl Genesis {
    pub fn for_network(network: NetworkId) -> Self {
        let key = genesis_key(network);
        let account = key.account();
        let mut block = Block::Open(OpenBlock {
            source: BlockHash::new(*account.as_bytes()),
            representative: account,
            account,
            signature: Signature::ZERO,
            work: 0,
        });
        sign_block(&mut block, &key.private);
        Self {
            account,
            block,
            supply: Amount::MAX,
        }
    }

    pub fn hash(&self) -> BlockHash {
        self.block.hash()
    }
}

/// Everything network specific the ledger needs.
#[derive(Clone, Debug)]
pub struct LedgerConstants {
    pub network: NetworkId,
    pub genesis: Genesis,
    pub epoch_link: Link,
    /// Account whose key signs epoch blocks.
    pub epoch_signer: Account,
    pub work: WorkThresholds,
}

impl LedgerConstants {
    pub fn for_network(network: NetworkId) -> Self {
        let genesis = Genesis::for_network(network);
        let work = match network {
            NetworkId::Live => WorkThresholds::new(),
            NetworkId::Test => WorkThresholds::with_base(TEST_WORK_BASE),
            NetworkId::Dev => WorkThresholds::with_base(0),
        };
        Self {
            network,
            epoch_signer: genesis.account,
            genesis,
            epoch_link: Link::from_tag(EPOCH_V1_TAG),
            work,
        }
    }

    pub fn dev() -> Self {
        Self::for_network(NetworkId::Dev)
    }

    /// Replace the work thresholds, e.g. with a configured override.
    pub fn with_work(mut self, work: WorkThresholds) -> Self {
        self.work = work;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::verify_block_signature;

    #[test]
    fn genesis_hash_is_deterministic() {
        assert_eq!(
            Genesis::for_network(NetworkId::Dev).hash(),
            Genesis::for_network(NetworkId::Dev).hash()
        );
    }

    #[test]
    fn networks_have_distinct_genesis() {
        let live = Genesis::for_network(NetworkId::Live);
        let test = Genesis::for_network(NetworkId::Test);
        let dev = Genesis::for_network(NetworkId::Dev);
        assert_ne!(live.hash(), test.hash());
        assert_ne!(test.hash(), dev.hash());
        assert_ne!(live.account, dev.account);
    }

    #[test]
    fn genesis_is_signed_by_its_account() {
        let genesis = Genesis::for_network(NetworkId::Dev);
        assert!(verify_block_signature(&genesis.block, &genesis.account));
        assert_eq!(genesis.account, dev_genesis_key().account());
        assert_eq!(genesis.block.root(), lattice_types::Root::from(genesis.account));
    }

    #[test]
    fn dev_network_disables_work() {
        let constants = LedgerConstants::dev();
        assert_eq!(constants.work.base, 0);
        assert_eq!(constants.epoch_signer, constants.genesis.account);
    }
}
