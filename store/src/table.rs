//! Logical tables and the per-table write locks.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A logical table. Variants are declared in alphabetical order of their
/// names, and that order (`Ord`) is the lock acquisition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Accounts,
    Blocks,
    ConfirmationHeight,
    Frontiers,
    Meta,
    OnlineWeight,
    Peers,
    Pending,
    RepWeights,
    Unchecked,
    /// Single-value unchecked table of schema versions before 4.
    UncheckedLegacy,
    /// Retired in schema version 5.
    Unsynced,
    VoteSequence,
}

/// Whether `count` must be exact for a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountPolicy {
    Exact,
    /// The backend may answer with an estimate; callers must not depend on it.
    Estimate,
}

impl Table {
    pub const COUNT: usize = 13;

    pub const ALL: [Table; Table::COUNT] = [
        Table::Accounts,
        Table::Blocks,
        Table::ConfirmationHeight,
        Table::Frontiers,
        Table::Meta,
        Table::OnlineWeight,
        Table::Peers,
        Table::Pending,
        Table::RepWeights,
        Table::Unchecked,
        Table::UncheckedLegacy,
        Table::Unsynced,
        Table::VoteSequence,
    ];

    /// On-disk name.
    pub fn name(self) -> &'static str {
        match self {
            Table::Accounts => "accounts",
            Table::Blocks => "blocks",
            Table::ConfirmationHeight => "confirmation_height",
            Table::Frontiers => "frontiers",
            Table::Meta => "meta",
            Table::OnlineWeight => "online_weight",
            Table::Peers => "peers",
            Table::Pending => "pending",
            Table::RepWeights => "rep_weights",
            Table::Unchecked => "unchecked",
            Table::UncheckedLegacy => "unchecked_legacy",
            Table::Unsynced => "unsynced",
            Table::VoteSequence => "vote_sequence",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Duplicate-key policy of the current schema.
    pub fn allows_duplicates(self) -> bool {
        matches!(self, Table::Unchecked)
    }

    pub fn count_policy(self) -> CountPolicy {
        match self {
            Table::Blocks | Table::Unchecked => CountPolicy::Estimate,
            _ => CountPolicy::Exact,
        }
    }
}

/// One mutex per table.
///
/// A write transaction holds the locks of every table it declared for its
/// whole lifetime. Locks are always taken in `Table` order, so two writers
/// with overlapping table sets cannot deadlock.
pub struct TableLocks {
    locks: [Mutex<()>; Table::COUNT],
}

impl TableLocks {
    pub fn new() -> Self {
        Self {
            locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    /// Block until every table in `tables` is exclusively held.
    pub fn acquire(&self, tables: &[Table]) -> TableGuards<'_> {
        let mut sorted = tables.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        // A poisoned lock guards no data; the panicking writer's engine
        // transaction was aborted when it unwound.
        let guards = sorted
            .iter()
            .map(|t| {
                self.locks[t.index()]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
            })
            .collect();
        TableGuards {
            tables: sorted,
            _guards: guards,
        }
    }
}

impl Default for TableLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Held table locks; released on drop.
pub struct TableGuards<'a> {
    tables: Vec<Table>,
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl TableGuards<'_> {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn holds(&self, table: Table) -> bool {
        self.tables.binary_search(&table).is_ok()
    }
}
