use thiserror::Error;

use downselect_core::SelectionError;

use crate::storage::StorageError;

/// Everything the pipeline and the binaries can fail with.
#[derive(Debug, Error)]
pub enum DownSelectError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("inconsistent selector state: {0}")]
    State(String),
}

pub type DownSelectResult<T> = Result<T, DownSelectError>;

impl From<std::io::Error> for DownSelectError {
    fn from(e: std::io::Error) -> Self {
        DownSelectError::Storage(StorageError::from(e))
    }
}
