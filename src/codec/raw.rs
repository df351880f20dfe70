//! Raw codec (identity transform beyond the envelope tag).

use super::{Category, CodecKind, CodecResult, open_expecting, seal};

/// Wraps `bytes` in a raw-kind envelope.
pub fn encode(bytes: &[u8]) -> Vec<u8> {
    seal(CodecKind::Raw, bytes)
}

/// Unwraps a raw entry back to its original bytes.
pub fn decode(bytes: &[u8]) -> CodecResult<Vec<u8>> {
    let (_, payload) = open_expecting(bytes, Category::Raw)?;
    Ok(payload.to_vec())
}
