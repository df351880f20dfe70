//! Storage orchestrator: one configuration binding the codec layer, the disk
//! store and the memory cache.
//!
//! Writes are write-through (disk first, then memory); reads are read-through
//! (memory hit returns immediately, a miss decodes from disk and repopulates
//! the memory tier). The memory tier is an optimization only and is never
//! treated as authoritative.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::{StorageError, StorageResult};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use image::DynamicImage;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::codec::{self, Category, ImageFormat, StructuredFormat};
use crate::config::StorageConfig;
use crate::disk::{DiskStore, Entry};
use crate::memory::MemoryCache;

/// Two-tier object store addressed by string keys.
///
/// A `Storage` instance owns one on-disk folder and one in-memory cache.
/// All operations are synchronous and safe to call from multiple threads;
/// operations on the same key are serialized, distinct keys proceed in
/// parallel, and [`Storage::remove_all`] excludes everything else for its
/// duration.
pub struct Storage {
    config: StorageConfig,
    disk: DiskStore,
    memory: MemoryCache,

    // Per-key operations hold the read side; remove_all holds the write side
    // and so acts as a barrier.
    gate: RwLock<()>,

    // Striped per-key locks. Same key → same stripe, so a save and a load on
    // one key never interleave a partial sequence; distinct keys usually land
    // on distinct stripes and run concurrently.
    key_locks: Vec<Mutex<()>>,
}

impl Storage {
    const LOCK_STRIPES: usize = 64;

    /// Opens a storage for `config`, creating the backing folder if needed.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        config.validate()?;

        let disk = DiskStore::open(config.folder_path())?;
        let memory = MemoryCache::with_capacity(config.memory_capacity);
        let key_locks = (0..Self::LOCK_STRIPES).map(|_| Mutex::new(())).collect();

        info!(folder = %disk.folder().display(), "opened storage");

        Ok(Self {
            config,
            disk,
            memory,
            gate: RwLock::new(()),
            key_locks,
        })
    }

    /// Returns the configuration this storage was built with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the resolved folder backing this storage.
    pub fn folder_path(&self) -> &Path {
        self.disk.folder()
    }

    // -- save ---------------------------------------------------------------

    /// Saves a structured value under `key` using the configured format.
    pub fn save<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        self.save_with(key, value, self.config.structured_format)
    }

    /// Saves a structured value under `key` with an explicit wire format.
    #[instrument(skip(self, value))]
    pub fn save_with<T>(&self, key: &str, value: &T, format: StructuredFormat) -> StorageResult<()>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let bytes = codec::structured::encode(value, format)?;
        self.store(key, &bytes, Category::Structured, || value.clone())
    }

    /// Saves a raw byte blob under `key`.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn save_raw(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let sealed = codec::raw::encode(bytes);
        self.store(key, &sealed, Category::Raw, || bytes.to_vec())
    }

    /// Saves an image under `key` using the configured container format.
    pub fn save_image(&self, key: &str, image: &DynamicImage) -> StorageResult<()> {
        self.save_image_with(key, image, self.config.image_format)
    }

    /// Saves an image under `key` with an explicit container format.
    #[instrument(skip(self, image))]
    pub fn save_image_with(
        &self,
        key: &str,
        image: &DynamicImage,
        format: ImageFormat,
    ) -> StorageResult<()> {
        let bytes = codec::image::encode(image, format)?;
        self.store(key, &bytes, Category::Image, || image.clone())
    }

    // -- load ---------------------------------------------------------------

    /// Loads the structured value saved under `key`.
    ///
    /// A memory hit returns the cached value without touching disk. On a miss
    /// the entry is read, decoded with the format recorded in its envelope,
    /// cached, and returned.
    #[instrument(skip(self))]
    pub fn load<T>(&self, key: &str) -> StorageResult<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let _gate = self.gate.read();
        let _key_guard = self.key_lock(key).lock();

        if let Some(value) = self.memory.get_as::<T>(key, Category::Structured) {
            debug!(key, "memory hit");
            return Ok(value);
        }

        debug!(key, "memory miss, reading disk");
        let bytes = self.disk.read(key)?;
        let value: T = codec::structured::decode(&bytes)?;
        self.memory.set(key, Category::Structured, value.clone());

        Ok(value)
    }

    /// Loads the raw byte blob saved under `key`.
    #[instrument(skip(self))]
    pub fn load_raw(&self, key: &str) -> StorageResult<Vec<u8>> {
        let _gate = self.gate.read();
        let _key_guard = self.key_lock(key).lock();

        if let Some(bytes) = self.memory.get_as::<Vec<u8>>(key, Category::Raw) {
            debug!(key, "memory hit");
            return Ok(bytes);
        }

        debug!(key, "memory miss, reading disk");
        let sealed = self.disk.read(key)?;
        let bytes = codec::raw::decode(&sealed)?;
        self.memory.set(key, Category::Raw, bytes.clone());

        Ok(bytes)
    }

    /// Loads the image saved under `key`.
    #[instrument(skip(self))]
    pub fn load_image(&self, key: &str) -> StorageResult<DynamicImage> {
        let _gate = self.gate.read();
        let _key_guard = self.key_lock(key).lock();

        if let Some(image) = self.memory.get_as::<DynamicImage>(key, Category::Image) {
            debug!(key, "memory hit");
            return Ok(image);
        }

        debug!(key, "memory miss, reading disk");
        let bytes = self.disk.read(key)?;
        let image = codec::image::decode(&bytes)?;
        self.memory.set(key, Category::Image, image.clone());

        Ok(image)
    }

    // -- removal ------------------------------------------------------------

    /// Deletes the entry for `key` from disk and memory.
    ///
    /// Fails with [`StorageError::NotFound`] when `key` has no disk entry;
    /// callers wanting silent idempotence should check [`Storage::exists`]
    /// first.
    #[instrument(skip(self))]
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        let _gate = self.gate.read();
        let _key_guard = self.key_lock(key).lock();

        self.disk.delete(key)?;
        self.memory.invalidate(key);

        Ok(())
    }

    /// Deletes every entry and clears the memory cache.
    ///
    /// The folder is recreated empty, so the instance stays usable. Succeeds
    /// on an already-empty storage.
    #[instrument(skip(self))]
    pub fn remove_all(&self) -> StorageResult<()> {
        let _gate = self.gate.write();

        self.disk.remove_folder()?;
        self.memory.clear();
        self.disk.ensure_folder()?;

        info!(folder = %self.disk.folder().display(), "cleared storage");
        Ok(())
    }

    // -- queries ------------------------------------------------------------

    /// Returns `true` if a disk entry for `key` exists.
    ///
    /// Only the disk is consulted; the memory tier never answers this.
    pub fn exists(&self, key: &str) -> bool {
        let _gate = self.gate.read();
        self.disk.exists(key)
    }

    /// Enumerates every on-disk entry, unordered.
    ///
    /// Callers needing an order sort explicitly, e.g. by
    /// [`Entry::modified`].
    pub fn files(&self) -> StorageResult<Vec<Entry>> {
        let _gate = self.gate.read();
        Ok(self.disk.list()?)
    }

    /// Total size of all on-disk entries in bytes.
    pub fn folder_size(&self) -> StorageResult<u64> {
        let _gate = self.gate.read();
        Ok(self.disk.size()?)
    }

    /// Returns `true` if the folder holds no entries.
    pub fn is_empty(&self) -> StorageResult<bool> {
        let _gate = self.gate.read();
        Ok(self.disk.is_empty()?)
    }

    /// Drops every in-memory record without touching disk.
    ///
    /// Subsequent loads fall back to disk, exactly as after an eviction.
    pub fn clear_memory_cache(&self) {
        self.memory.clear();
    }

    // -- internals ----------------------------------------------------------

    /// Shared save path: capacity check, disk write, then cache update.
    /// The cache is touched only after the disk write is confirmed.
    fn store<T>(
        &self,
        key: &str,
        bytes: &[u8],
        category: Category,
        cached: impl FnOnce() -> T,
    ) -> StorageResult<()>
    where
        T: Send + Sync + 'static,
    {
        let _gate = self.gate.read();
        let _key_guard = self.key_lock(key).lock();

        self.check_capacity(key, bytes.len() as u64)?;
        self.disk.write(key, bytes)?;
        self.memory.set(key, category, cached());

        Ok(())
    }

    fn check_capacity(&self, key: &str, incoming: u64) -> StorageResult<()> {
        let Some(limit) = self.config.max_disk_bytes else {
            return Ok(());
        };

        let current = self.disk.size()?;
        let replaced = self.disk.entry_size(key)?.unwrap_or(0);
        let projected = current - replaced + incoming;

        if projected > limit {
            return Err(StorageError::CapacityExceeded { projected, limit });
        }

        Ok(())
    }

    fn key_lock(&self, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) & (Self::LOCK_STRIPES - 1);
        &self.key_locks[index]
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("folder", &self.disk.folder())
            .field("memory", &self.memory)
            .finish()
    }
}
