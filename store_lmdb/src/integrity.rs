//! LMDB database integrity checks.
//!
//! Run before maintenance commands touch a data directory, to detect
//! damage early.

use std::path::Path;

use lattice_store::{ReadTxn, Store, StoreError, Table};

use crate::environment::DATA_FILE;
use crate::LmdbStore;

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub tables_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Exact key width of a table, `None` for free-form keys.
fn key_len(table: Table) -> Option<usize> {
    match table {
        Table::Meta => None,
        Table::OnlineWeight => Some(8),
        Table::Peers => Some(18),
        Table::Pending => Some(64),
        _ => Some(32),
    }
}

/// Walk every table and check key widths.
///
/// Read failures and malformed keys are recorded in the report rather than
/// aborting the walk.
pub fn check_integrity(store: &LmdbStore) -> Result<IntegrityReport, StoreError> {
    let mut report = IntegrityReport::default();
    let txn = store.begin_read()?;

    for table in Table::ALL {
        if store.database(table).is_none() {
            // Not created yet: acceptable for a read-only open of an old store.
            continue;
        }
        report.tables_checked += 1;
        check_table(txn.as_ref(), table, &mut report);
    }

    tracing::info!(
        tables = report.tables_checked,
        entries = report.total_entries,
        errors = report.errors.len(),
        "integrity check finished"
    );
    Ok(report)
}

fn check_table(txn: &dyn ReadTxn, table: Table, report: &mut IntegrityReport) {
    let iter = match txn.iter(table) {
        Ok(iter) => iter,
        Err(e) => {
            report
                .errors
                .push(format!("failed to read table '{}': {e}", table.name()));
            return;
        }
    };
    for entry in iter {
        match entry {
            Ok((key, _)) => {
                report.total_entries += 1;
                if let Some(expected) = key_len(table) {
                    if key.len() != expected {
                        report.errors.push(format!(
                            "table '{}' has a {}-byte key, expected {expected}",
                            table.name(),
                            key.len()
                        ));
                    }
                }
            }
            Err(e) => {
                report
                    .errors
                    .push(format!("failed to read table '{}': {e}", table.name()));
                return;
            }
        }
    }
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// a wrong path or an interrupted vacuum.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join(DATA_FILE);
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but {DATA_FILE} is missing at {}",
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::tests::open_test_store;

    #[test]
    fn check_data_dir_fresh_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(&dir.path().join("missing")).is_ok());
    }

    #[test]
    fn check_data_dir_without_data_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(dir.path()).is_err());
    }

    #[test]
    fn fresh_store_is_healthy() {
        let (dir, store) = open_test_store();
        assert!(check_data_dir(dir.path()).is_ok());
        let report = check_integrity(&store).unwrap();
        assert!(report.is_healthy());
        assert_eq!(report.tables_checked, Table::COUNT as u32);
        assert_eq!(report.total_entries, 0);
    }

    #[test]
    fn malformed_key_is_reported() {
        let (_dir, store) = open_test_store();
        let mut txn = store.begin_write(&[Table::Accounts, Table::Meta]).unwrap();
        txn.put(Table::Accounts, &[1; 31], b"x").unwrap();
        txn.put(Table::Meta, b"anything", b"x").unwrap();
        txn.commit().unwrap();

        let report = check_integrity(&store).unwrap();
        assert_eq!(report.total_entries, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(!report.is_healthy());
    }
}
