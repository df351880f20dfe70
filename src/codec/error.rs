use thiserror::Error;

use super::{Category, CodecKind};

#[derive(Debug, Error)]
/// Errors returned by the codec layer.
pub enum CodecError {
    /// Value could not be encoded to bytes.
    #[error("encoding failed: {reason}")]
    Encoding {
        /// Error message.
        reason: String,
    },

    /// Bytes could not be decoded as the requested type.
    #[error("decoding failed: {reason}")]
    Decoding {
        /// Error message.
        reason: String,
    },

    /// Payload is shorter than the envelope header.
    #[error("payload too short for envelope: {len} bytes")]
    TruncatedEnvelope {
        /// Actual payload length.
        len: usize,
    },

    /// Envelope magic bytes did not match.
    #[error("bad envelope magic")]
    BadMagic,

    /// Envelope version is newer than this build understands.
    #[error("unsupported envelope version: {version}")]
    UnsupportedVersion {
        /// Version byte found in the envelope.
        version: u8,
    },

    /// Envelope carries a codec kind this build does not know.
    #[error("unknown codec kind: {kind}")]
    UnknownKind {
        /// Kind byte found in the envelope.
        kind: u8,
    },

    /// Entry was written by a different codec category than the one requested.
    #[error("expected a {expected} payload, found {found}")]
    CategoryMismatch {
        /// Category the caller asked for.
        expected: Category,
        /// Codec recorded in the envelope.
        found: CodecKind,
    },
}

/// Convenience result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
