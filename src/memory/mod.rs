//! In-process tier (decoded values, bounded capacity).
//!
//! The memory tier is an optimization only. moka may evict any entry at any
//! time, so a miss here always falls back to disk and is never an error.


use moka::sync::Cache;
use std::any::Any;
use std::sync::Arc;

use crate::codec::Category;

/// One cached value plus the category it was saved under.
///
/// The category travels with the value so a hot lookup through the wrong
/// accessor (say, `load_raw` after a structured `save`) misses instead of
/// handing back a value of the wrong shape.
#[derive(Clone)]
pub struct CacheRecord {
    category: Category,
    value: Arc<dyn Any + Send + Sync>,
}

impl CacheRecord {
    /// Returns the category the value was saved under.
    pub fn category(&self) -> Category {
        self.category
    }
}

impl std::fmt::Debug for CacheRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRecord")
            .field("category", &self.category)
            .finish()
    }
}

/// In-memory cache of decoded values keyed by storage key.
pub struct MemoryCache {
    entries: Cache<String, CacheRecord>,
}

impl MemoryCache {
    const DEFAULT_CAPACITY: u64 = 10_000;

    /// Creates a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` entries.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Looks up the raw record for `key`.
    pub fn get(&self, key: &str) -> Option<CacheRecord> {
        self.entries.get(key)
    }

    /// Looks up `key` and returns a clone of the value when both the category
    /// and the concrete type match. Anything else is a miss.
    pub fn get_as<T>(&self, key: &str, category: Category) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let record = self.entries.get(key)?;
        if record.category != category {
            return None;
        }

        record
            .value
            .downcast::<T>()
            .ok()
            .map(|value| (*value).clone())
    }

    /// Stores `value` under `key`, replacing any previous record.
    pub fn set<T>(&self, key: &str, category: Category, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.insert(
            key.to_string(),
            CacheRecord {
                category,
                value: Arc::new(value),
            },
        );
    }

    /// Drops the record for `key`, if any.
    pub fn invalidate(&self, key: &str) {
        self.entries.invalidate(key);
    }

    /// Drops every record.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Returns the number of cached records.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Returns `true` if the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
