//! Structured codec (serde values).

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Category, CodecError, CodecKind, CodecResult, open_expecting, seal};

/// Wire format used for structured values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructuredFormat {
    /// Human-readable JSON (`serde_json`).
    #[default]
    Json,
    /// Compact binary (`bincode`).
    Bincode,
}

impl StructuredFormat {
    /// Returns the envelope kind this format writes.
    pub fn kind(self) -> CodecKind {
        match self {
            StructuredFormat::Json => CodecKind::Json,
            StructuredFormat::Bincode => CodecKind::Bincode,
        }
    }
}

/// Encodes `value` with `format`, envelope included.
pub fn encode<T: Serialize>(value: &T, format: StructuredFormat) -> CodecResult<Vec<u8>> {
    let payload = match format {
        StructuredFormat::Json => serde_json::to_vec(value).map_err(|e| CodecError::Encoding {
            reason: e.to_string(),
        })?,
        StructuredFormat::Bincode => {
            bincode::serialize(value).map_err(|e| CodecError::Encoding {
                reason: e.to_string(),
            })?
        }
    };

    Ok(seal(format.kind(), &payload))
}

/// Decodes a structured entry, dispatching on the format recorded in the
/// envelope.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    let (kind, payload) = open_expecting(bytes, Category::Structured)?;

    match kind {
        CodecKind::Json => serde_json::from_slice(payload).map_err(|e| CodecError::Decoding {
            reason: e.to_string(),
        }),
        CodecKind::Bincode => bincode::deserialize(payload).map_err(|e| CodecError::Decoding {
            reason: e.to_string(),
        }),
        other => Err(CodecError::CategoryMismatch {
            expected: Category::Structured,
            found: other,
        }),
    }
}
