//! Administrative operations behind the daemon's maintenance commands.

use std::path::Path;

use lattice_types::{Account, BlockHash};
use serde::Serialize;

use crate::{
    AccountStore, ConfirmationHeightInfo, ConfirmationHeightStoreMut, MetaStore, Store,
    StoreError, Table, CURRENT_SCHEMA_VERSION, MINIMUM_SCHEMA_VERSION,
};

fn clear_table(store: &dyn Store, table: Table) -> Result<u64, StoreError> {
    let mut txn = store.begin_write(&[table])?;
    let removed = txn.count(table)?;
    txn.drop_table(table)?;
    txn.commit()?;
    tracing::info!(table = table.name(), removed, "cleared table");
    Ok(removed)
}

/// Drop every parked gap block. Returns how many entries were removed.
pub fn clear_unchecked(store: &dyn Store) -> Result<u64, StoreError> {
    clear_table(store, Table::Unchecked)
}

pub fn clear_peers(store: &dyn Store) -> Result<u64, StoreError> {
    clear_table(store, Table::Peers)
}

pub fn clear_online_weight(store: &dyn Store) -> Result<u64, StoreError> {
    clear_table(store, Table::OnlineWeight)
}

/// Reset every account's confirmation height to 0. `genesis`, when given,
/// stays confirmed at height 1. Returns the number of accounts reset.
pub fn reset_confirmation_height(
    store: &dyn Store,
    genesis: Option<(Account, BlockHash)>,
) -> Result<u64, StoreError> {
    let mut txn = store.begin_write(&[Table::Accounts, Table::ConfirmationHeight])?;
    let accounts = txn.accounts_from(None)?;
    for (account, _) in &accounts {
        let info = match genesis {
            Some((genesis_account, open)) if genesis_account == *account => {
                ConfirmationHeightInfo {
                    height: 1,
                    frontier: open,
                }
            }
            _ => ConfirmationHeightInfo::default(),
        };
        txn.confirmation_height_put(account, &info)?;
    }
    txn.commit()?;
    tracing::info!(accounts = accounts.len(), "confirmation heights reset");
    Ok(accounts.len() as u64)
}

/// Write a compacted copy of the store into `destination`.
pub fn vacuum(store: &dyn Store, destination: &Path) -> Result<(), StoreError> {
    tracing::info!(destination = %destination.display(), "writing compacted copy");
    store.copy_compacted(destination)
}

#[derive(Clone, Debug, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub entries: u64,
    pub estimated: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct VersionReport {
    pub backend: &'static str,
    pub stored: Option<u32>,
    pub minimum: u32,
    pub current: u32,
    pub tables: Vec<TableCount>,
}

pub fn version_report(store: &dyn Store) -> Result<VersionReport, StoreError> {
    let txn = store.begin_read()?;
    let tables = Table::ALL
        .iter()
        .map(|table| {
            Ok(TableCount {
                table: table.name(),
                entries: txn.count(*table)?,
                estimated: table.count_policy() == crate::CountPolicy::Estimate,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;
    Ok(VersionReport {
        backend: store.backend_name(),
        stored: txn.version_get()?,
        minimum: MINIMUM_SCHEMA_VERSION,
        current: CURRENT_SCHEMA_VERSION,
        tables,
    })
}
