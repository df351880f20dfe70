use thiserror::Error;

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::disk::DiskError;

#[derive(Debug, Error)]
/// Errors surfaced by [`crate::Storage`] operations.
///
/// Every public operation either succeeds or returns exactly one of these;
/// there are no partial-success states. Memory-tier misses are not errors.
pub enum StorageError {
    /// Value could not be encoded to bytes.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Bytes could not be decoded as the requested type (bad payload, wrong
    /// target type, or a category mismatch with the stored entry).
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// No disk entry exists for the key.
    #[error("no entry for key '{key}'")]
    NotFound {
        /// Key that was looked up.
        key: String,
    },

    /// Filesystem-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// On-disk entry carries a codec kind this build does not know.
    #[error("unsupported codec kind: {kind}")]
    UnsupportedType {
        /// Kind byte found in the entry's envelope.
        kind: u8,
    },

    /// Key failed sanitization.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey {
        /// Offending key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Save would push the folder past the configured disk budget.
    #[error("folder would grow to {projected} bytes, over the {limit} byte budget")]
    CapacityExceeded {
        /// Folder size the save would produce.
        projected: u64,
        /// Configured budget.
        limit: u64,
    },

    /// Configuration failed validation at construction.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<CodecError> for StorageError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encoding { reason } => StorageError::Encoding(reason),
            CodecError::UnknownKind { kind } => StorageError::UnsupportedType { kind },
            other => StorageError::Decoding(other.to_string()),
        }
    }
}

impl From<DiskError> for StorageError {
    fn from(err: DiskError) -> Self {
        match err {
            DiskError::Io(e) => StorageError::Io(e),
            DiskError::NotFound { key } => StorageError::NotFound { key },
            DiskError::InvalidKey { key, reason } => StorageError::InvalidKey { key, reason },
            DiskError::FolderUnavailable { path } => StorageError::Io(std::io::Error::other(
                format!("storage folder unavailable: {}", path.display()),
            )),
        }
    }
}

/// Convenience result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
