//! In-memory LRU image cache bounded by entry count and aggregate cost.

use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::{CacheKey, CachedImage};
use crate::domain::ports::{CacheLimits, CacheStats, ImageCachePort, StoreOutcome};

/// In-memory LRU cache for decoded images.
///
/// The entry map and the running cost total live behind one lock so they can never
/// disagree. Least recently used entries are evicted first.
pub struct MemoryImageCache {
    state: Mutex<CacheState>,
    limits: CacheLimits,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
    rejections: AtomicU64,
}

struct CacheState {
    entries: LruCache<CacheKey, CachedImage>,
    total_cost: u64,
}

impl CacheState {
    fn pop(&mut self, key: &CacheKey) -> Option<CachedImage> {
        let image = self.entries.pop(key)?;
        self.total_cost = self.total_cost.saturating_sub(image.cost());
        Some(image)
    }

    fn pop_lru(&mut self) -> Option<(CacheKey, CachedImage)> {
        let (key, image) = self.entries.pop_lru()?;
        self.total_cost = self.total_cost.saturating_sub(image.cost());
        Some((key, image))
    }
}

impl MemoryImageCache {
    /// Creates a new cache with the given limits.
    #[must_use]
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                total_cost: 0,
            }),
            limits,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default limits (100 entries, 100 MiB).
    #[must_use]
    pub fn with_default_limits() -> Self {
        Self::new(CacheLimits::default())
    }

    /// Returns the cached keys from most to least recently used.
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        let state = self.state.lock();
        state.entries.iter().map(|(key, _)| key.clone()).collect()
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::with_default_limits()
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl ImageCachePort for MemoryImageCache {
    fn get(&self, key: &CacheKey) -> Option<CachedImage> {
        let mut state = self.state.lock();
        if let Some(img) = state.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
            Some(img.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
            None
        }
    }

    fn peek(&self, key: &CacheKey) -> Option<CachedImage> {
        let state = self.state.lock();
        state.entries.peek(key).cloned()
    }

    fn put(&self, key: CacheKey, image: CachedImage) -> StoreOutcome {
        let cost = image.cost();
        if cost > self.limits.max_cost_bytes {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            warn!(
                key = %key,
                cost,
                limit = self.limits.max_cost_bytes,
                "Image exceeds cache cost limit, not caching"
            );
            return StoreOutcome::Rejected {
                cost,
                limit: self.limits.max_cost_bytes,
            };
        }

        let mut state = self.state.lock();
        let replaced = state.pop(&key).is_some();

        let mut evicted = 0;
        while state.entries.len() >= self.limits.max_entries
            || state
                .total_cost
                .checked_add(cost)
                .is_none_or(|total| total > self.limits.max_cost_bytes)
        {
            let Some((old_key, old)) = state.pop_lru() else {
                break;
            };
            evicted += 1;
            trace!(key = %old_key, cost = old.cost(), "Evicted image from memory cache");
        }

        state.entries.put(key.clone(), image);
        state.total_cost = state.total_cost.saturating_add(cost);

        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        debug!(
            key = %key,
            cost,
            evicted,
            entries = state.entries.len(),
            total_cost = state.total_cost,
            "Stored image in memory cache"
        );

        if replaced {
            StoreOutcome::Replaced { evicted }
        } else {
            StoreOutcome::Inserted { evicted }
        }
    }

    fn remove(&self, key: &CacheKey) -> Option<CachedImage> {
        let removed = self.state.lock().pop(key);
        if removed.is_some() {
            debug!(key = %key, "Removed image from memory cache");
        }
        removed
    }

    fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn total_cost(&self) -> u64 {
        self.state.lock().total_cost
    }

    fn limits(&self) -> CacheLimits {
        self.limits
    }

    #[allow(clippy::cast_precision_loss)]
    fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let (entries, total_cost) = {
            let state = self.state.lock();
            (state.entries.len(), state.total_cost)
        };
        CacheStats {
            hits,
            misses,
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            entries,
            total_cost,
            hit_rate,
        }
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.total_cost = 0;
        debug!("Cleared memory image cache");
    }
}
