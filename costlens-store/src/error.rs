//! Store error types.

use std::path::PathBuf;

use costlens_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data itself is invalid.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A required cost table was not found in the data directory.
    #[error("Missing cost table {name:?} in {dir}")]
    MissingTable {
        /// Expected table name (file stem).
        name: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// The data directory does not exist.
    #[error("Data directory not found: {0}")]
    NoDataDir(PathBuf),
}

impl StoreError {
    /// Returns true if the error came from a missing file or table.
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            StoreError::MissingTable { .. } | StoreError::NoDataDir(_) => true,
            _ => false,
        }
    }
}
