use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(#[from] heed::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table {0} is missing from the environment")]
    MissingTable(&'static str),
}

impl From<LmdbError> for lattice_store::StoreError {
    fn from(e: LmdbError) -> Self {
        lattice_store::StoreError::Backend(e.to_string())
    }
}

/// Shorthand for heed results inside trait impls returning `StoreError`.
pub(crate) fn backend(e: heed::Error) -> lattice_store::StoreError {
    LmdbError::from(e).into()
}
