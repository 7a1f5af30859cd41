//! Maintenance operations on a ledger data directory.
//!
//! Every command that writes opens the store read-write and runs the
//! schema migrator first, so it always works on the current schema. Commands
//! that only read refuse a store that is not already current.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use lattice_crypto::{decode_account, encode_account};
use lattice_ledger::{BlockProcessor, Ledger, ProcessResult};
use lattice_store::maintenance::{self, VersionReport};
use lattice_store::{MigrationOutcome, Migrator, Store};
use lattice_store_lmdb::{check_data_dir, check_integrity, IntegrityReport, LmdbStore};
use lattice_types::{Block, SystemClock};
use serde::Serialize;

use crate::config::LedgerConfig;

const VACUUM_DIR: &str = "vacuum";
const VACUUM_BACKUP: &str = "backup.vacuum.mdb";

fn open_store(config: &LedgerConfig, read_only: bool) -> anyhow::Result<LmdbStore> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    if read_only && !config.data_dir.exists() {
        bail!("no ledger at {}", config.data_dir.display());
    }
    LmdbStore::open(&config.data_dir, &config.lmdb_config(), read_only)
        .with_context(|| format!("opening ledger at {}", config.data_dir.display()))
}

/// Open read-write and bring the schema up to date.
fn open_migrated(config: &LedgerConfig) -> anyhow::Result<(LmdbStore, MigrationOutcome)> {
    let store = open_store(config, false)?;
    let outcome = Migrator::new(&store)
        .run()
        .context("upgrading database schema")?;
    Ok((store, outcome))
}

/// Open read-only and refuse any layout other than the current one.
fn open_checked(config: &LedgerConfig) -> anyhow::Result<LmdbStore> {
    let store = open_store(config, true)?;
    Migrator::new(&store)
        .verify()
        .context("checking database schema")?;
    Ok(store)
}

fn ledger(config: &LedgerConfig) -> anyhow::Result<Ledger> {
    Ok(Ledger::new(
        config.ledger_constants()?,
        Arc::new(SystemClock),
    ))
}

pub fn migrate(config: &LedgerConfig) -> anyhow::Result<MigrationOutcome> {
    Ok(open_migrated(config)?.1)
}

/// Migrate, then write the genesis block if the ledger is empty. Returns
/// whether genesis was written.
pub fn initialize(config: &LedgerConfig) -> anyhow::Result<bool> {
    let (store, _) = open_migrated(config)?;
    Ok(ledger(config)?.initialize(&store)?)
}

pub fn clear_unchecked(config: &LedgerConfig) -> anyhow::Result<u64> {
    let (store, _) = open_migrated(config)?;
    Ok(maintenance::clear_unchecked(&store)?)
}

pub fn clear_peers(config: &LedgerConfig) -> anyhow::Result<u64> {
    let (store, _) = open_migrated(config)?;
    Ok(maintenance::clear_peers(&store)?)
}

pub fn clear_online_weight(config: &LedgerConfig) -> anyhow::Result<u64> {
    let (store, _) = open_migrated(config)?;
    Ok(maintenance::clear_online_weight(&store)?)
}

/// Reset all confirmation heights; the genesis account stays confirmed at
/// its open block.
pub fn reset_confirmation_height(config: &LedgerConfig) -> anyhow::Result<u64> {
    let (store, _) = open_migrated(config)?;
    let genesis = config.ledger_constants()?.genesis;
    Ok(maintenance::reset_confirmation_height(
        &store,
        Some((genesis.account, genesis.hash())),
    )?)
}

/// Compact the data file in place: copy into a scratch directory, then
/// swap the copy in for the original once the store is closed.
pub fn vacuum(config: &LedgerConfig) -> anyhow::Result<PathBuf> {
    let data_dir = &config.data_dir;
    let scratch = data_dir.join(VACUUM_DIR);
    if scratch.exists() {
        std::fs::remove_dir_all(&scratch)
            .with_context(|| format!("removing stale {}", scratch.display()))?;
    }
    {
        let (store, _) = open_migrated(config)?;
        maintenance::vacuum(&store, &scratch)?;
    }

    let data_file = data_dir.join(lattice_store_lmdb::DATA_FILE);
    let backup = data_dir.join(VACUUM_BACKUP);
    std::fs::rename(&data_file, &backup).context("moving original data file aside")?;
    std::fs::rename(scratch.join(lattice_store_lmdb::DATA_FILE), &data_file)
        .context("moving compacted data file into place")?;
    std::fs::remove_file(&backup).context("removing original data file")?;
    std::fs::remove_dir_all(&scratch).context("removing scratch directory")?;
    tracing::info!(path = %data_file.display(), "vacuum complete");
    Ok(data_file)
}

/// Schema versions and table sizes. Does not migrate.
pub fn version(config: &LedgerConfig) -> anyhow::Result<VersionReport> {
    let store = open_store(config, true)?;
    Ok(maintenance::version_report(&store)?)
}

pub fn check(config: &LedgerConfig) -> anyhow::Result<IntegrityReport> {
    let store = open_checked(config)?;
    Ok(check_integrity(&store)?)
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub processed: usize,
    pub progressed: usize,
    pub old: usize,
    pub gaps: usize,
    pub rejected: usize,
}

/// Process blocks from a file of hex-encoded, type-tagged blocks, one per
/// line. Blank lines and lines starting with `#` are skipped.
pub fn import(config: &LedgerConfig, path: &Path) -> anyhow::Result<ImportSummary> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let blocks = parse_blocks(&content)?;

    let (store, _) = open_migrated(config)?;
    let ledger = ledger(config)?;
    ledger.initialize(&store)?;
    import_blocks(&store, &ledger, blocks)
}

fn parse_blocks(content: &str) -> anyhow::Result<Vec<Block>> {
    content
        .lines()
        .enumerate()
        .map(|(number, line)| (number + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            let bytes = hex::decode(line).with_context(|| format!("line {number}: not hex"))?;
            Block::deserialize_typed(&bytes).with_context(|| format!("line {number}: bad block"))
        })
        .collect()
}

pub(crate) fn import_blocks(
    store: &dyn Store,
    ledger: &Ledger,
    blocks: Vec<Block>,
) -> anyhow::Result<ImportSummary> {
    let results = BlockProcessor::new(store, ledger).process_batch(blocks)?;
    let mut summary = ImportSummary {
        processed: results.len(),
        ..Default::default()
    };
    for entry in &results {
        match entry.result.code {
            ProcessResult::Progress => summary.progressed += 1,
            ProcessResult::Old => summary.old += 1,
            code if code.is_gap() => summary.gaps += 1,
            code => {
                summary.rejected += 1;
                tracing::warn!(hash = %entry.hash, result = %code, "block rejected");
            }
        }
    }
    Ok(summary)
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub address: String,
    pub opened: bool,
    pub balance: String,
    pub head: Option<String>,
    pub block_count: u64,
    pub representative: Option<String>,
    pub weight: String,
    pub pending: usize,
    pub confirmation_height: u64,
}

/// Read-only view of one account, given as a `lat_` address or hex key.
pub fn account(config: &LedgerConfig, address: &str) -> anyhow::Result<AccountSummary> {
    let store = open_checked(config)?;
    account_summary(&store, &ledger(config)?, address)
}

pub(crate) fn account_summary(
    store: &dyn Store,
    ledger: &Ledger,
    address: &str,
) -> anyhow::Result<AccountSummary> {
    let Some(account) =
        decode_account(address).or_else(|| lattice_types::Account::decode_hex(address))
    else {
        bail!("'{address}' is neither an address nor a hex account key");
    };

    let txn = store.begin_read()?;
    let info = ledger.account_get(&*txn, &account)?;
    let representative = match &info {
        Some(info) => ledger
            .block_get(&*txn, &info.rep_block)?
            .and_then(|block| block.representative_field()),
        None => None,
    };
    Ok(AccountSummary {
        address: encode_account(&account),
        opened: info.is_some(),
        balance: ledger.balance(&*txn, &account)?.number().to_string(),
        head: info.as_ref().map(|info| info.head.to_string()),
        block_count: info.as_ref().map_or(0, |info| info.block_count),
        representative: representative.as_ref().map(encode_account),
        weight: ledger.weight(&*txn, &account)?.number().to_string(),
        pending: ledger.pending_for_account(&*txn, &account)?.len(),
        confirmation_height: ledger.confirmation_height_get(&*txn, &account)?.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::{keypair_from_seed, sign_block};
    use lattice_ledger::{dev_genesis_key, LedgerConstants};
    use lattice_nullables::{NullClock, NullStore};
    use lattice_store::{MetaStoreMut, StoreError, Table, CURRENT_SCHEMA_VERSION};
    use lattice_types::{Amount, SendBlock, Signature};

    fn config(dir: &Path) -> LedgerConfig {
        LedgerConfig {
            data_dir: dir.join("ledger"),
            lmdb_map_size: 16 * 1024 * 1024,
            ..Default::default()
        }
    }

    #[test]
    fn initialize_writes_genesis_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        assert!(initialize(&config).unwrap());
        assert!(!initialize(&config).unwrap());

        let report = version(&config).unwrap();
        assert_eq!(report.stored, Some(report.current));
        let blocks = report.tables.iter().find(|t| t.table == "blocks").unwrap();
        assert_eq!(blocks.entries, 1);
    }

    #[test]
    fn read_only_commands_need_an_existing_ledger() {
        let dir = tempfile::tempdir().unwrap();
        assert!(version(&config(dir.path())).is_err());
        assert!(check(&config(dir.path())).is_err());
    }

    #[test]
    fn reset_keeps_genesis_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        initialize(&config).unwrap();
        assert_eq!(reset_confirmation_height(&config).unwrap(), 1);

        let genesis = dev_genesis_key().account();
        let summary = account(&config, &encode_account(&genesis)).unwrap();
        assert_eq!(summary.confirmation_height, 1);
        assert_eq!(summary.balance, u128::MAX.to_string());
        assert_eq!(summary.representative, Some(encode_account(&genesis)));
    }

    #[test]
    fn vacuum_swaps_in_a_compacted_copy() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        initialize(&config).unwrap();

        let data_file = vacuum(&config).unwrap();
        assert!(data_file.exists());
        assert!(!config.data_dir.join(VACUUM_DIR).exists());
        assert!(!config.data_dir.join(VACUUM_BACKUP).exists());
        assert!(check(&config).unwrap().is_healthy());
        assert!(!initialize(&config).unwrap());
    }

    #[test]
    fn clearing_empty_tables_removes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        initialize(&config).unwrap();
        assert_eq!(clear_unchecked(&config).unwrap(), 0);
        assert_eq!(clear_peers(&config).unwrap(), 0);
        assert_eq!(clear_online_weight(&config).unwrap(), 0);
        assert_eq!(migrate(&config).unwrap(), MigrationOutcome::UpToDate);
    }

    #[test]
    fn import_reads_hex_lines() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let genesis = LedgerConstants::dev().genesis;
        let mut send = Block::Send(SendBlock {
            previous: genesis.hash(),
            destination: keypair_from_seed(&[2; 32]).account(),
            balance: Amount::raw(u128::MAX - 5),
            signature: Signature::ZERO,
            work: 0,
        });
        sign_block(&mut send, &dev_genesis_key().private);
        let file = dir.path().join("blocks.txt");
        std::fs::write(
            &file,
            format!("# one send\n{}\n\n", hex::encode(send.serialize_typed())),
        )
        .unwrap();

        let summary = import(&config, &file).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                processed: 1,
                progressed: 1,
                ..Default::default()
            }
        );
        let again = import(&config, &file).unwrap();
        assert_eq!(again.old, 1);
    }

    fn stamp_version(config: &LedgerConfig, version: u32) {
        let store = LmdbStore::open(&config.data_dir, &config.lmdb_config(), false).unwrap();
        let mut txn = store.begin_write(&[Table::Meta]).unwrap();
        txn.version_put(version).unwrap();
        txn.commit().unwrap();
    }

    fn store_error(error: &anyhow::Error) -> &StoreError {
        error.downcast_ref::<StoreError>().expect("store error in chain")
    }

    #[test]
    fn read_only_commands_refuse_an_old_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        initialize(&config).unwrap();
        stamp_version(&config, 1);
        let genesis = encode_account(&dev_genesis_key().account());

        let error = account(&config, &genesis).unwrap_err();
        assert!(matches!(
            store_error(&error),
            StoreError::ReadOnlyUpgrade { found: 1, .. }
        ));
        let error = check(&config).unwrap_err();
        assert!(matches!(
            store_error(&error),
            StoreError::ReadOnlyUpgrade { found: 1, .. }
        ));
        assert_eq!(version(&config).unwrap().stored, Some(1));
    }

    #[test]
    fn read_only_commands_refuse_a_future_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        initialize(&config).unwrap();
        stamp_version(&config, CURRENT_SCHEMA_VERSION + 94);
        let genesis = encode_account(&dev_genesis_key().account());

        let error = account(&config, &genesis).unwrap_err();
        assert!(matches!(
            store_error(&error),
            StoreError::FutureSchema { found: 99, .. }
        ));
        let error = check(&config).unwrap_err();
        assert!(matches!(store_error(&error), StoreError::FutureSchema { .. }));
        assert!(migrate(&config).is_err());
    }

    #[test]
    fn malformed_import_lines_are_reported() {
        assert!(parse_blocks("zz\n").is_err());
        assert!(parse_blocks("0600\n").is_err());
        assert_eq!(parse_blocks("# nothing\n\n").unwrap(), Vec::new());
    }

    #[test]
    fn account_summary_of_an_unopened_account() {
        let store = NullStore::new();
        let ledger = Ledger::new(LedgerConstants::dev(), Arc::new(NullClock::new(0)));
        ledger.initialize(&store).unwrap();

        let key = keypair_from_seed(&[7; 32]);
        let summary = account_summary(&store, &ledger, &encode_account(&key.account())).unwrap();
        assert!(!summary.opened);
        assert_eq!(summary.balance, "0");
        assert_eq!(summary.head, None);
        assert!(account_summary(&store, &ledger, "lat_nonsense").is_err());
    }
}
