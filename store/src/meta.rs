//! Store metadata: the schema version record.

use crate::record::fixed;
use crate::{ReadTxn, StoreError, Table, WriteTxn};

pub const VERSION_KEY: &[u8] = b"version";

pub trait MetaStore: ReadTxn {
    /// Stored schema version; `None` for stores that predate version stamping
    /// or have never been opened.
    fn version_get(&self) -> Result<Option<u32>, StoreError> {
        self.get(Table::Meta, VERSION_KEY)?
            .map(|bytes| Ok(u32::from_be_bytes(fixed(&bytes, "schema version")?)))
            .transpose()
    }
}

impl<T: ReadTxn + ?Sized> MetaStore for T {}

pub trait MetaStoreMut: WriteTxn {
    fn version_put(&mut self, version: u32) -> Result<(), StoreError> {
        self.put(Table::Meta, VERSION_KEY, &version.to_be_bytes())
    }
}

impl<T: WriteTxn + ?Sized> MetaStoreMut for T {}
