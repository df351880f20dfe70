//! Codecs and the on-disk envelope.
//!
//! Every payload written to disk starts with a 4-byte envelope header
//! (`MAGIC`, format version, codec kind) so entries are self-describing:
//! reads dispatch on the recorded kind instead of trusting a caller hint.

pub mod error;
pub mod image;
pub mod raw;
pub mod structured;


pub use error::{CodecError, CodecResult};
pub use image::{DEFAULT_JPEG_QUALITY, ImageFormat};
pub use structured::StructuredFormat;

/// Magic bytes opening every envelope.
pub const MAGIC: [u8; 2] = *b"CS";

/// Current envelope format version.
pub const VERSION: u8 = 1;

/// Envelope header length in bytes.
pub const HEADER_LEN: usize = 4;

/// Codec recorded in an envelope, one per wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodecKind {
    /// Structured value, JSON wire format.
    Json = 1,
    /// Structured value, bincode wire format.
    Bincode = 2,
    /// Raw byte blob.
    Raw = 3,
    /// Compressed bitmap.
    Image = 4,
}

impl CodecKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(CodecKind::Json),
            2 => Some(CodecKind::Bincode),
            3 => Some(CodecKind::Raw),
            4 => Some(CodecKind::Image),
            _ => None,
        }
    }

    /// Returns the value category this codec belongs to.
    pub fn category(self) -> Category {
        match self {
            CodecKind::Json | CodecKind::Bincode => Category::Structured,
            CodecKind::Raw => Category::Raw,
            CodecKind::Image => Category::Image,
        }
    }
}

impl std::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CodecKind::Json => "json",
            CodecKind::Bincode => "bincode",
            CodecKind::Raw => "raw",
            CodecKind::Image => "image",
        };
        write!(f, "{}", name)
    }
}

/// Value category a caller declares at the save/load boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Serde-serializable record.
    Structured,
    /// Opaque byte blob.
    Raw,
    /// In-memory bitmap.
    Image,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Structured => "structured",
            Category::Raw => "raw",
            Category::Image => "image",
        };
        write!(f, "{}", name)
    }
}

/// Prefixes `payload` with an envelope header for `kind`.
pub fn seal(kind: CodecKind, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.push(VERSION);
    bytes.push(kind as u8);
    bytes.extend_from_slice(payload);
    bytes
}

/// Validates the envelope header and returns the recorded kind plus the
/// payload that follows it.
pub fn open(bytes: &[u8]) -> CodecResult<(CodecKind, &[u8])> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TruncatedEnvelope { len: bytes.len() });
    }

    if bytes[0..2] != MAGIC {
        return Err(CodecError::BadMagic);
    }

    let version = bytes[2];
    if version != VERSION {
        return Err(CodecError::UnsupportedVersion { version });
    }

    let kind = CodecKind::from_byte(bytes[3]).ok_or(CodecError::UnknownKind { kind: bytes[3] })?;

    Ok((kind, &bytes[HEADER_LEN..]))
}

/// Like [`open`], but additionally checks the recorded kind against the
/// category the caller asked for.
pub fn open_expecting(bytes: &[u8], expected: Category) -> CodecResult<(CodecKind, &[u8])> {
    let (kind, payload) = open(bytes)?;

    if kind.category() != expected {
        return Err(CodecError::CategoryMismatch {
            expected,
            found: kind,
        });
    }

    Ok((kind, payload))
}
