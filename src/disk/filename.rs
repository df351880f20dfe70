//! Key ↔ filename mapping.
//!
//! Keys are percent-escaped and suffixed with the store extension. The
//! mapping is injective (distinct keys never share a filename), traversal-safe
//! (`/`, `\` and `%` are escaped) and reversible, so listings can report the
//! original key.

use super::error::{DiskError, DiskResult};

/// Extension carried by every entry file.
pub const EXTENSION: &str = "stash";

/// Escaped keys longer than this are rejected; most filesystems cap a file
/// name at 255 bytes and the extension still has to fit.
pub const MAX_ESCAPED_LEN: usize = 240;

/// Maps `key` to its entry file name, rejecting keys that cannot be
/// represented.
pub fn file_name(key: &str) -> DiskResult<String> {
    if key.is_empty() {
        return Err(DiskError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty".to_string(),
        });
    }

    let escaped = urlencoding::encode(key);
    if escaped.len() > MAX_ESCAPED_LEN {
        return Err(DiskError::InvalidKey {
            key: key.to_string(),
            reason: format!(
                "escaped form is {} bytes, over the {} byte limit",
                escaped.len(),
                MAX_ESCAPED_LEN
            ),
        });
    }

    Ok(format!("{}.{}", escaped, EXTENSION))
}

/// Recovers the original key from an entry file name. Returns `None` for
/// temp files and foreign files.
pub fn key_of(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() {
        return None;
    }

    urlencoding::decode(stem).ok().map(|cow| cow.into_owned())
}
