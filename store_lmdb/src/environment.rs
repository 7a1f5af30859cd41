//! LMDB environment setup.

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{CompactionOption, Database, DatabaseFlags, Env, EnvFlags, EnvOpenOptions};

use lattice_store::{ReadTxn, Store, StoreError, Table, TableLocks, WriteTxn};

use crate::error::backend;
use crate::transaction::{LmdbReadTxn, LmdbWriteTxn};
use crate::LmdbError;

/// Name of the LMDB data file inside an environment directory.
pub const DATA_FILE: &str = "data.mdb";

#[derive(Clone, Debug)]
pub struct LmdbConfig {
    /// Maximum size of the memory map in bytes.
    pub map_size: usize,
    pub max_dbs: u32,
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            map_size: 64 * 1024 * 1024 * 1024,
            max_dbs: 32,
        }
    }
}

/// The heed environment plus one database handle per table.
///
/// A read-only store opens only the tables that already exist; a missing
/// table reads as empty.
pub struct LmdbStore {
    pub(crate) env: Env,
    pub(crate) databases: [Option<Database<Bytes, Bytes>>; Table::COUNT],
    pub(crate) locks: TableLocks,
    read_only: bool,
    path: PathBuf,
}

impl LmdbStore {
    /// Open or create an environment at `path`.
    pub fn open(path: &Path, config: &LmdbConfig, read_only: bool) -> Result<Self, LmdbError> {
        if !read_only {
            std::fs::create_dir_all(path)?;
        }

        let mut options = EnvOpenOptions::new();
        options.map_size(config.map_size).max_dbs(config.max_dbs);
        // SAFETY: the environment is opened once per path by this process and
        // the flags only restrict it to read-only access.
        let env = unsafe {
            if read_only {
                options.flags(EnvFlags::READ_ONLY);
            }
            options.open(path)?
        };

        let mut databases = [None; Table::COUNT];
        if read_only {
            let rtxn = env.read_txn()?;
            for table in Table::ALL {
                databases[table.index()] =
                    env.open_database::<Bytes, Bytes>(&rtxn, Some(table.name()))?;
            }
            rtxn.commit()?;
        } else {
            let mut wtxn = env.write_txn()?;
            for table in Table::ALL {
                let mut db_options = env.database_options().types::<Bytes, Bytes>();
                db_options.name(table.name());
                if table.allows_duplicates() {
                    db_options.flags(DatabaseFlags::DUP_SORT);
                }
                databases[table.index()] = Some(db_options.create(&mut wtxn)?);
            }
            wtxn.commit()?;
        }

        tracing::info!(path = %path.display(), read_only, "opened LMDB store");
        Ok(Self {
            env,
            databases,
            locks: TableLocks::new(),
            read_only,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn database(&self, table: Table) -> Option<Database<Bytes, Bytes>> {
        self.databases[table.index()]
    }
}

impl Drop for LmdbStore {
    fn drop(&mut self) {
        // heed keeps every opened env in a process-wide registry; take ours
        // out so the path can be reopened with other flags. The env itself
        // closes once `self.env` drops. Waiting on the event here would never
        // return while that clone is alive.
        let _closing = self.env.clone().prepare_for_closing();
        tracing::debug!(path = %self.path.display(), "closing LMDB store");
    }
}

impl Store for LmdbStore {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>, StoreError> {
        let txn = self.env.read_txn().map_err(backend)?;
        Ok(Box::new(LmdbReadTxn { store: self, txn }))
    }

    fn begin_write(&self, tables: &[Table]) -> Result<Box<dyn WriteTxn + '_>, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        // Table locks first, the engine's writer lock last.
        let guards = self.locks.acquire(tables);
        let txn = self.env.write_txn().map_err(backend)?;
        Ok(Box::new(LmdbWriteTxn {
            store: self,
            txn,
            guards,
        }))
    }

    fn read_only(&self) -> bool {
        self.read_only
    }

    fn copy_compacted(&self, destination: &Path) -> Result<(), StoreError> {
        std::fs::create_dir_all(destination).map_err(LmdbError::from)?;
        self.env
            .copy_to_file(destination.join(DATA_FILE), CompactionOption::Enabled)
            .map_err(backend)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "lmdb"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lattice_store::{MetaStore, MetaStoreMut};

    pub(crate) fn test_config() -> LmdbConfig {
        LmdbConfig {
            map_size: 16 * 1024 * 1024,
            max_dbs: 32,
        }
    }

    pub(crate) fn open_test_store() -> (tempfile::TempDir, LmdbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LmdbStore::open(dir.path(), &test_config(), false).unwrap();
        (dir, store)
    }

    #[test]
    fn creates_every_table() {
        let (_dir, store) = open_test_store();
        assert!(store.databases.iter().all(Option::is_some));
        assert!(!store.read_only());
        assert_eq!(store.backend_name(), "lmdb");
    }

    #[test]
    fn read_only_store_sees_existing_data_and_refuses_writes() {
        let (dir, store) = open_test_store();
        let mut txn = store.begin_write(&[Table::Meta]).unwrap();
        txn.version_put(5).unwrap();
        txn.commit().unwrap();
        drop(store);

        let store = LmdbStore::open(dir.path(), &test_config(), true).unwrap();
        assert!(store.read_only());
        let txn = store.begin_read().unwrap();
        assert_eq!(txn.count(Table::Meta).unwrap(), 1);
        drop(txn);
        assert!(matches!(
            store.begin_write(&[Table::Meta]),
            Err(StoreError::ReadOnly)
        ));
    }

    #[test]
    fn dropped_store_reopens_with_other_flags() {
        let (dir, store) = open_test_store();
        let mut txn = store.begin_write(&[Table::Meta]).unwrap();
        txn.version_put(7).unwrap();
        txn.commit().unwrap();
        drop(store);

        for read_only in [true, false, true] {
            let store = LmdbStore::open(dir.path(), &test_config(), read_only).unwrap();
            assert_eq!(store.read_only(), read_only);
            assert_eq!(store.begin_read().unwrap().version_get().unwrap(), Some(7));
        }
    }

    #[test]
    fn compacted_copy_reopens_with_same_contents() {
        let (_dir, store) = open_test_store();
        let mut txn = store.begin_write(&[Table::Peers]).unwrap();
        for i in 0u8..10 {
            txn.put(Table::Peers, &[i; 18], &[0; 8]).unwrap();
        }
        txn.commit().unwrap();

        let target = tempfile::tempdir().unwrap();
        let copy_dir = target.path().join("copy");
        store.copy_compacted(&copy_dir).unwrap();
        assert!(copy_dir.join(DATA_FILE).exists());

        let copy = LmdbStore::open(&copy_dir, &test_config(), false).unwrap();
        let txn = copy.begin_read().unwrap();
        assert_eq!(txn.count(Table::Peers).unwrap(), 10);
    }
}
