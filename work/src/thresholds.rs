//! Block-kind-aware PoW difficulty thresholds.
//!
//! - Receive and open blocks (legacy or state) need a higher difficulty,
//!   since pocketing funds costs the sender nothing
//! - Sends and representative changes use the base difficulty
//! - Epoch blocks use the highest difficulty

use lattice_types::Root;

use crate::WorkError;

/// Block kind for threshold selection. The ledger classifies a block
/// (including state blocks, by their effect) before asking for a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkBlockKind {
    /// Sends and representative changes.
    Base,
    /// Receive or open.
    ReceiveOrOpen,
    /// Epoch upgrade.
    Epoch,
}

const BASE_THRESHOLD: u64 = 0xFFFFFE00_00000000;
const RECEIVE_MULTIPLIER: f64 = 8.0;
const EPOCH_MULTIPLIER: f64 = 64.0;

/// Per-block-type PoW thresholds.
///
/// Higher threshold values = harder work required.  The `multiply` helper
/// scales difficulty by shrinking the "inverse gap" (`u64::MAX - threshold`)
/// which raises the bar the work nonce must clear.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkThresholds {
    pub base: u64,
    pub receive_multiplier: f64,
    pub epoch_multiplier: f64,
}

impl WorkThresholds {
    pub fn new() -> Self {
        Self {
            base: BASE_THRESHOLD,
            receive_multiplier: RECEIVE_MULTIPLIER,
            epoch_multiplier: EPOCH_MULTIPLIER,
        }
    }

    /// Construct with a custom base (dev networks and tests; 0 disables PoW).
    pub fn with_base(base: u64) -> Self {
        Self {
            base,
            receive_multiplier: RECEIVE_MULTIPLIER,
            epoch_multiplier: EPOCH_MULTIPLIER,
        }
    }

    /// Custom multipliers; both must be at least 1.0.
    pub fn with_multipliers(
        base: u64,
        receive_multiplier: f64,
        epoch_multiplier: f64,
    ) -> Result<Self, WorkError> {
        for m in [receive_multiplier, epoch_multiplier] {
            if !(m >= 1.0) {
                return Err(WorkError::InvalidMultiplier(m));
            }
        }
        Ok(Self {
            base,
            receive_multiplier,
            epoch_multiplier,
        })
    }

    /// Whether `work` is sufficient for a block of `kind` anchored at `root`.
    pub fn is_valid(&self, root: &Root, work: u64, kind: WorkBlockKind) -> bool {
        crate::validate_work(root, work, self.threshold_for(kind))
    }

    /// Get the required work difficulty for a specific block kind.
    pub fn threshold_for(&self, kind: WorkBlockKind) -> u64 {
        match kind {
            WorkBlockKind::ReceiveOrOpen => self.multiply(self.base, self.receive_multiplier),
            WorkBlockKind::Epoch => self.multiply(self.base, self.epoch_multiplier),
            WorkBlockKind::Base => self.base,
        }
    }

    /// Scale difficulty: higher threshold = harder work.
    ///
    /// The "difficulty inverse" is `u64::MAX - threshold`. Dividing that by the
    /// multiplier shrinks the gap, raising the threshold.  When `base` is 0
    /// (PoW disabled), all derived thresholds are also 0.
    fn multiply(&self, base: u64, multiplier: f64) -> u64 {
        if base == 0 {
            return 0;
        }
        let difficulty_inv = u64::MAX - base;
        let scaled_inv = (difficulty_inv as f64 / multiplier) as u64;
        u64::MAX - scaled_inv
    }
}

impl Default for WorkThresholds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_harder_than_send() {
        let thresholds = WorkThresholds::new();
        let send = thresholds.threshold_for(WorkBlockKind::Base);
        let receive = thresholds.threshold_for(WorkBlockKind::ReceiveOrOpen);
        assert!(receive > send, "receive threshold ({receive}) must exceed send ({send})");
    }

    #[test]
    fn epoch_hardest() {
        let thresholds = WorkThresholds::new();
        let epoch = thresholds.threshold_for(WorkBlockKind::Epoch);
        let receive = thresholds.threshold_for(WorkBlockKind::ReceiveOrOpen);
        assert!(epoch > receive, "epoch threshold ({epoch}) must exceed receive ({receive})");
    }

    #[test]
    fn base_is_unchanged() {
        let thresholds = WorkThresholds::new();
        assert_eq!(thresholds.threshold_for(WorkBlockKind::Base), BASE_THRESHOLD);
    }

    #[test]
    fn custom_base_propagates() {
        let thresholds = WorkThresholds::with_base(1000);
        assert_eq!(thresholds.threshold_for(WorkBlockKind::Base), 1000);
        let recv = thresholds.threshold_for(WorkBlockKind::ReceiveOrOpen);
        assert!(recv > 1000);
    }

    #[test]
    fn zero_base_disables_every_kind() {
        let thresholds = WorkThresholds::with_base(0);
        for kind in [
            WorkBlockKind::Base,
            WorkBlockKind::ReceiveOrOpen,
            WorkBlockKind::Epoch,
        ] {
            assert_eq!(thresholds.threshold_for(kind), 0);
        }
    }

    #[test]
    fn multipliers_below_one_rejected() {
        assert_eq!(
            WorkThresholds::with_multipliers(1, 0.5, 64.0),
            Err(WorkError::InvalidMultiplier(0.5))
        );
        assert!(WorkThresholds::with_multipliers(1, 1.0, f64::NAN).is_err());
        assert!(WorkThresholds::with_multipliers(1, 8.0, 64.0).is_ok());
    }
}
