use proptest::prelude::*;

use lattice_types::{BlockHash, Root};
use lattice_work::{validate_work, work_difficulty, WorkBlockKind, WorkThresholds};

proptest! {
    /// Zero difficulty always passes regardless of work.
    #[test]
    fn zero_difficulty_always_passes(
        hash_bytes in prop::array::uniform32(0u8..),
        work in any::<u64>(),
    ) {
        let root = Root::from(BlockHash::new(hash_bytes));
        prop_assert!(validate_work(&root, work, 0));
    }

    /// Validation agrees with the computed difficulty on both sides of it.
    #[test]
    fn threshold_boundary_matches_difficulty(
        hash_bytes in prop::array::uniform32(0u8..),
        work in any::<u64>(),
    ) {
        let root = Root::from(BlockHash::new(hash_bytes));
        let difficulty = work_difficulty(&root, work);
        prop_assert!(validate_work(&root, work, difficulty));
        if difficulty < u64::MAX {
            prop_assert!(!validate_work(&root, work, difficulty + 1));
        }
    }

    /// Thresholds never decrease from base to receive to epoch.
    #[test]
    fn thresholds_are_ordered(base in 1u64..u64::MAX) {
        let t = WorkThresholds::with_base(base);
        let send = t.threshold_for(WorkBlockKind::Base);
        let receive = t.threshold_for(WorkBlockKind::ReceiveOrOpen);
        let epoch = t.threshold_for(WorkBlockKind::Epoch);
        prop_assert!(send <= receive);
        prop_assert!(receive <= epoch);
    }
}
