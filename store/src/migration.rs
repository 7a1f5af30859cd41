//! Schema migration engine.
//!
//! The stored schema version gates which upgrade steps run at open. Steps
//! run in order inside one write transaction over every table, and the new
//! version is persisted last. Every step checks for its own result before
//! acting, so replaying it on an already upgraded layout changes nothing.

use lattice_types::{Account, Block, BlockHash};

use crate::flusher::flush_vote_cache;
use crate::{
    AccountStore, BlockStore, BlockStoreMut, ConfirmationHeightInfo, ConfirmationHeightStore,
    ConfirmationHeightStoreMut, MetaStore, MetaStoreMut, RepWeightStoreMut, Store, StoreError,
    Table, VoteSequenceCache, WriteTxn,
};

/// Oldest layout that can still be upgraded in place.
pub const MINIMUM_SCHEMA_VERSION: u32 = 1;
/// The layout this code reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 5;

/// One upgrade from `from` to `from + 1`.
pub struct MigrationStep {
    pub from: u32,
    pub description: &'static str,
    pub run: fn(&mut dyn WriteTxn) -> Result<(), StoreError>,
}

pub const MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        from: 1,
        description: "recompute representative weights from account balances",
        run: rebuild_rep_weights,
    },
    MigrationStep {
        from: 2,
        description: "backfill block successor links",
        run: backfill_successors,
    },
    MigrationStep {
        from: 3,
        description: "move unchecked blocks into the duplicate-key table",
        run: move_unchecked_to_duplicate_table,
    },
    MigrationStep {
        from: 4,
        description: "retire unsynced table and add confirmation heights",
        run: add_confirmation_heights,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Empty store stamped with the current version.
    Initialized,
    UpToDate,
    Upgraded { from: u32, to: u32 },
}

/// Brings a store to [`CURRENT_SCHEMA_VERSION`] at open.
pub struct Migrator<'a> {
    store: &'a dyn Store,
    vote_cache: Option<&'a VoteSequenceCache>,
}

impl<'a> Migrator<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            vote_cache: None,
        }
    }

    /// Flush `cache` before any step runs.
    pub fn with_vote_cache(mut self, cache: &'a VoteSequenceCache) -> Self {
        self.vote_cache = Some(cache);
        self
    }

    /// Check the stored version and upgrade if needed.
    ///
    /// Refuses newer-than-supported and older-than-minimum layouts, and any
    /// upgrade of a read-only store. A store without a version record is
    /// fresh when it holds no accounts or blocks, and version 1 otherwise.
    pub fn run(&self) -> Result<MigrationOutcome, StoreError> {
        let version = match self.stored_version()? {
            (Some(v), _) => v,
            (None, true) => return self.initialize(),
            (None, false) => MINIMUM_SCHEMA_VERSION,
        };

        check_version(version, self.store.read_only())?;
        if version == CURRENT_SCHEMA_VERSION {
            tracing::info!(version, "database schema is up to date");
            return Ok(MigrationOutcome::UpToDate);
        }

        if let Some(cache) = self.vote_cache {
            flush_vote_cache(self.store, cache)?;
        }

        let mut txn = self.store.begin_write(&Table::ALL)?;
        for from in version..CURRENT_SCHEMA_VERSION {
            run_step(from, txn.as_mut())?;
        }
        txn.version_put(CURRENT_SCHEMA_VERSION)?;
        txn.commit()?;

        tracing::info!(
            from = version,
            to = CURRENT_SCHEMA_VERSION,
            "migration complete"
        );
        Ok(MigrationOutcome::Upgraded {
            from: version,
            to: CURRENT_SCHEMA_VERSION,
        })
    }

    /// Check that the store can be read as it is, without writing. A store
    /// that would need any upgrade is refused. Returns the layout version;
    /// an empty store without a version record reads as current.
    pub fn verify(&self) -> Result<u32, StoreError> {
        let version = match self.stored_version()? {
            (Some(v), _) => v,
            (None, true) => CURRENT_SCHEMA_VERSION,
            (None, false) => MINIMUM_SCHEMA_VERSION,
        };
        check_version(version, true)?;
        Ok(version)
    }

    /// The version record, and whether the store holds no accounts or blocks.
    fn stored_version(&self) -> Result<(Option<u32>, bool), StoreError> {
        let txn = self.store.begin_read()?;
        let empty = txn.is_empty(Table::Accounts)? && txn.is_empty(Table::Blocks)?;
        Ok((txn.version_get()?, empty))
    }

    fn initialize(&self) -> Result<MigrationOutcome, StoreError> {
        if self.store.read_only() {
            return Err(StoreError::ReadOnlyUpgrade {
                found: 0,
                current: CURRENT_SCHEMA_VERSION,
            });
        }
        let mut txn = self.store.begin_write(&[Table::Meta])?;
        txn.version_put(CURRENT_SCHEMA_VERSION)?;
        txn.commit()?;
        tracing::info!(version = CURRENT_SCHEMA_VERSION, "initialized empty database");
        Ok(MigrationOutcome::Initialized)
    }
}

/// Whether a store at `version` may be opened.
pub fn check_version(version: u32, read_only: bool) -> Result<(), StoreError> {
    if version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::FutureSchema {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if version < MINIMUM_SCHEMA_VERSION {
        return Err(StoreError::SchemaTooOld {
            found: version,
            minimum: MINIMUM_SCHEMA_VERSION,
        });
    }
    if read_only && version < CURRENT_SCHEMA_VERSION {
        return Err(StoreError::ReadOnlyUpgrade {
            found: version,
            current: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(())
}

/// Run the single step upgrading `from` to `from + 1`.
pub fn run_step(from: u32, txn: &mut dyn WriteTxn) -> Result<(), StoreError> {
    let step = MIGRATIONS
        .iter()
        .find(|s| s.from == from)
        .ok_or(StoreError::UnknownMigration(from))?;
    tracing::info!(from, to = from + 1, step = step.description, "running migration");
    (step.run)(txn)
}

fn all_accounts(txn: &dyn WriteTxn) -> Result<Vec<(Account, crate::AccountInfo)>, StoreError> {
    txn.accounts_from(None)
}

/// Representative named by the block at `rep_block`.
fn representative_at(txn: &dyn WriteTxn, rep_block: &BlockHash) -> Result<Account, StoreError> {
    txn.block_get(rep_block)?
        .and_then(|b| b.representative_field())
        .ok_or_else(|| StoreError::Corruption(format!("rep block {rep_block} has no representative")))
}

fn rebuild_rep_weights(txn: &mut dyn WriteTxn) -> Result<(), StoreError> {
    txn.drop_table(Table::RepWeights)?;
    for (_, info) in all_accounts(txn)? {
        let representative = representative_at(txn, &info.rep_block)?;
        txn.rep_weight_add(&representative, info.balance)?;
    }
    Ok(())
}

fn backfill_successors(txn: &mut dyn WriteTxn) -> Result<(), StoreError> {
    let mut linked = 0u64;
    for (account, info) in all_accounts(txn)? {
        let mut successor = BlockHash::ZERO;
        let mut hash = info.head;
        while !hash.is_zero() {
            let stored = txn
                .block_get_stored(&hash)?
                .ok_or_else(|| StoreError::Corruption(format!("chain of {account} is missing {hash}")))?;
            if stored.sideband.successor.is_zero() && !successor.is_zero() {
                txn.block_set_successor(&hash, &successor)?;
                linked += 1;
            }
            successor = hash;
            hash = stored.block.previous();
        }
    }
    tracing::debug!(linked, "successor links written");
    Ok(())
}

fn move_unchecked_to_duplicate_table(txn: &mut dyn WriteTxn) -> Result<(), StoreError> {
    let legacy = txn
        .iter(Table::UncheckedLegacy)?
        .collect::<Result<Vec<_>, _>>()?;
    for (key, value) in &legacy {
        txn.put(Table::Unchecked, key, value)?;
    }
    txn.drop_table(Table::UncheckedLegacy)?;
    tracing::debug!(moved = legacy.len(), "unchecked entries moved");
    Ok(())
}

/// The genesis block is the only open block whose source is its own
/// account; every other open block receives an existing send.
fn is_genesis_open(block: &Block, account: &Account) -> bool {
    matches!(block, Block::Open(open) if open.source.as_bytes() == account.as_bytes())
}

/// Every account starts unconfirmed except genesis, which is confirmed at
/// its open block.
fn add_confirmation_heights(txn: &mut dyn WriteTxn) -> Result<(), StoreError> {
    txn.drop_table(Table::Unsynced)?;
    for (account, info) in all_accounts(txn)? {
        if txn.confirmation_height_exists(&account)? {
            continue;
        }
        let genesis = txn
            .block_get(&info.open_block)?
            .is_some_and(|open| is_genesis_open(&open, &account));
        let height = if genesis {
            ConfirmationHeightInfo {
                height: 1,
                frontier: info.open_block,
            }
        } else {
            ConfirmationHeightInfo::default()
        };
        txn.confirmation_height_put(&account, &height)?;
    }
    Ok(())
}
