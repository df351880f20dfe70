//! cachette: a two-tier object cache.
//!
//! Values are addressed by string keys inside a named folder. A fast
//! in-process memory tier sits over a durable file-per-key disk tier; saves
//! write through both, loads read through the memory tier first. Three value
//! categories are supported, each with its own codec:
//!
//! - structured serde values (JSON or bincode wire format),
//! - raw byte blobs,
//! - images (PNG or JPEG containers).
//!
//! # Example
//!
//! ```no_run
//! use cachette::{Storage, StorageConfig};
//!
//! # fn main() -> cachette::StorageResult<()> {
//! let storage = Storage::new(StorageConfig::new("./.cachette", "users"))?;
//!
//! storage.save("count", &42_i64)?;
//! let count: i64 = storage.load("count")?;
//! assert_eq!(count, 42);
//!
//! storage.remove("count")?;
//! # Ok(())
//! # }
//! ```
//!
//! The memory tier is an optimization only: entries may be evicted at any
//! time and every miss falls back to disk, so the filesystem is always the
//! source of truth.

pub mod codec;
pub mod config;
pub mod disk;
pub mod memory;
pub mod storage;

pub use codec::{Category, CodecError, CodecKind, CodecResult, ImageFormat, StructuredFormat};
pub use config::{ConfigError, StorageConfig};
pub use disk::{DiskError, DiskResult, DiskStore, Entry};
pub use memory::MemoryCache;
pub use storage::{Storage, StorageError, StorageResult};

// The bitmap type at the image-codec boundary, re-exported so callers need
// no direct `image` dependency for basic use.
pub use image::DynamicImage;
