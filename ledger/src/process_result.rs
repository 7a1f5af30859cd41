//! Outcomes of processing a block.

use lattice_types::{Account, Amount};

/// Result of validating a block against the ledger.
///
/// Everything except `Progress` leaves the store untouched, apart from
/// gap results parking the block in the unchecked table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessResult {
    /// Block was applied.
    Progress,
    BadSignature,
    /// Block is already in the ledger.
    Old,
    /// Send declaring a balance above the account's current balance.
    NegativeSpend,
    /// Another block already occupies this chain position.
    Fork,
    /// Previous block unknown; parked under the previous hash.
    GapPrevious,
    /// Source block unknown; parked under the source hash.
    GapSource,
    InsufficientWork,
    /// Declared balance disagrees with the transferred amount.
    BalanceMismatch,
    /// No pending entry to receive, or one a legacy block cannot pocket.
    Unreceivable,
    /// Block kind not allowed at this point of the chain.
    BlockPosition,
    /// Receive whose source block is not a send.
    NotReceiveFromSend,
    /// Epoch block changing the representative.
    RepresentativeMismatch,
    /// Block for the all-zero burn account.
    OpenedBurnAccount,
}

impl ProcessResult {
    pub fn is_gap(self) -> bool {
        matches!(self, ProcessResult::GapPrevious | ProcessResult::GapSource)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessResult::Progress => "progress",
            ProcessResult::BadSignature => "bad_signature",
            ProcessResult::Old => "old",
            ProcessResult::NegativeSpend => "negative_spend",
            ProcessResult::Fork => "fork",
            ProcessResult::GapPrevious => "gap_previous",
            ProcessResult::GapSource => "gap_source",
            ProcessResult::InsufficientWork => "insufficient_work",
            ProcessResult::BalanceMismatch => "balance_mismatch",
            ProcessResult::Unreceivable => "unreceivable",
            ProcessResult::BlockPosition => "block_position",
            ProcessResult::NotReceiveFromSend => "not_receive_from_send",
            ProcessResult::RepresentativeMismatch => "representative_mismatch",
            ProcessResult::OpenedBurnAccount => "opened_burn_account",
        }
    }
}

impl std::fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `process` outcome plus what the block did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessReturn {
    pub code: ProcessResult,
    /// Owning account, zero when it could not be determined.
    pub account: Account,
    /// Amount moved by the block; zero for changes and epoch blocks.
    pub amount: Amount,
    /// Destination of a send, zero otherwise.
    pub pending_account: Account,
}

impl ProcessReturn {
    pub(crate) fn rejected(code: ProcessResult, account: Account) -> Self {
        Self {
            code,
            account,
            amount: Amount::ZERO,
            pending_account: Account::ZERO,
        }
    }
}
