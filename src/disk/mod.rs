//! Durable tier (flat folder, one file per key).

pub mod error;
pub mod filename;


pub use error::{DiskError, DiskResult};
pub use filename::EXTENSION;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::NamedTempFile;
use tracing::debug;

/// Metadata for one on-disk entry, derived from the directory listing.
///
/// The filesystem is the source of truth; there is no sidecar index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Original key (recovered from the file name).
    pub name: String,
    /// Entry size in bytes, envelope included.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

#[derive(Debug, Clone)]
/// Stores entry bytes in a flat folder, one file per key.
pub struct DiskStore {
    folder: PathBuf,
}

impl DiskStore {
    /// Opens a store rooted at `folder`, creating the folder if absent.
    pub fn open(folder: PathBuf) -> DiskResult<Self> {
        let store = Self { folder };
        store.ensure_folder()?;
        Ok(store)
    }

    /// Returns the backing folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Ensures the backing folder exists.
    pub fn ensure_folder(&self) -> DiskResult<()> {
        if !self.folder.exists() {
            fs::create_dir_all(&self.folder).map_err(|_| DiskError::FolderUnavailable {
                path: self.folder.clone(),
            })?;
        }
        Ok(())
    }

    fn entry_path(&self, key: &str) -> DiskResult<PathBuf> {
        Ok(self.folder.join(filename::file_name(key)?))
    }

    /// Writes `bytes` under `key`, replacing any previous entry.
    ///
    /// The bytes land in a temp file in the same folder first and are renamed
    /// into place, so a concurrent reader never observes a partial entry.
    pub fn write(&self, key: &str, bytes: &[u8]) -> DiskResult<()> {
        let path = self.entry_path(key)?;
        self.ensure_folder()?;

        let mut temp = NamedTempFile::new_in(&self.folder)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| DiskError::Io(e.error))?;

        debug!(key, len = bytes.len(), "wrote entry");
        Ok(())
    }

    /// Reads the entry bytes for `key`.
    pub fn read(&self, key: &str) -> DiskResult<Vec<u8>> {
        let path = self.entry_path(key)?;

        fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                DiskError::NotFound {
                    key: key.to_string(),
                }
            } else {
                DiskError::Io(e)
            }
        })
    }

    /// Deletes the entry for `key`.
    pub fn delete(&self, key: &str) -> DiskResult<()> {
        let path = self.entry_path(key)?;

        if !path.exists() {
            return Err(DiskError::NotFound {
                key: key.to_string(),
            });
        }

        fs::remove_file(&path)?;
        debug!(key, "deleted entry");
        Ok(())
    }

    /// Returns `true` if an entry for `key` exists.
    pub fn exists(&self, key: &str) -> bool {
        self.entry_path(key).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Size of the entry for `key`, or `None` if absent.
    pub fn entry_size(&self, key: &str) -> DiskResult<Option<u64>> {
        let path = self.entry_path(key)?;

        match fs::metadata(&path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DiskError::Io(e)),
        }
    }

    /// Lists every entry directly inside the folder, unordered.
    ///
    /// Temp files and foreign files are skipped; subfolders are not entered.
    pub fn list(&self) -> DiskResult<Vec<Entry>> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&self.folder)? {
            let dir_entry = dir_entry?;
            let metadata = dir_entry.metadata()?;

            if !metadata.is_file() {
                continue;
            }

            let os_name = dir_entry.file_name();
            if let Some(name) = os_name.to_str()
                && let Some(key) = filename::key_of(name)
            {
                entries.push(Entry {
                    name: key,
                    size: metadata.len(),
                    modified: metadata.modified()?,
                });
            }
        }

        Ok(entries)
    }

    /// Sum of all entry sizes in bytes.
    pub fn size(&self) -> DiskResult<u64> {
        Ok(self.list()?.iter().map(|entry| entry.size).sum())
    }

    /// Returns `true` if the folder holds no entries.
    pub fn is_empty(&self) -> DiskResult<bool> {
        Ok(self.list()?.is_empty())
    }

    /// Recursively deletes the whole folder tree. Idempotent.
    pub fn remove_folder(&self) -> DiskResult<()> {
        match fs::remove_dir_all(&self.folder) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DiskError::Io(e)),
        }
    }
}
