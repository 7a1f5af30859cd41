use lattice_types::CodecError;
use thiserror::Error;

use crate::Table;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),

    #[error("table {0:?} was not locked by this write transaction")]
    TableNotLocked(Table),

    #[error("store is open read-only")]
    ReadOnly,

    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchema { found: u32, supported: u32 },

    #[error("database schema version {found} is older than {minimum}; upgrade with an intermediate release first")]
    SchemaTooOld { found: u32, minimum: u32 },

    #[error("database schema version {found} needs upgrading to {current}, which a read-only store cannot do")]
    ReadOnlyUpgrade { found: u32, current: u32 },

    #[error("no migration registered from schema version {0}")]
    UnknownMigration(u32),
}

impl From<CodecError> for StoreError {
    fn from(e: CodecError) -> Self {
        StoreError::Corruption(e.to_string())
    }
}
