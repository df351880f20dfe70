use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by the disk store.
pub enum DiskError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No entry exists for the key.
    #[error("no entry for key '{key}'")]
    NotFound {
        /// Key that was looked up.
        key: String,
    },

    /// Key failed sanitization.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey {
        /// Offending key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Storage folder is missing/unavailable.
    #[error("storage folder unavailable: {path}")]
    FolderUnavailable {
        /// Folder that was unavailable.
        path: PathBuf,
    },
}

/// Convenience result type for disk store operations.
pub type DiskResult<T> = Result<T, DiskError>;
