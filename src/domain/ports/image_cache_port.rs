//! Port definition for image caching.

use crate::domain::entities::{CacheKey, CachedImage};

/// Default maximum number of cached images.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default maximum aggregate cost (100 MiB).
pub const DEFAULT_MAX_COST_BYTES: u64 = 100 * 1024 * 1024;

/// Count and cost bounds for a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    /// Maximum number of entries. Always at least one.
    pub max_entries: usize,
    /// Maximum sum of entry costs in bytes. Always at least one.
    pub max_cost_bytes: u64,
}

impl CacheLimits {
    /// Creates limits, clamping zero values to one.
    #[must_use]
    pub fn new(max_entries: usize, max_cost_bytes: u64) -> Self {
        Self {
            max_entries: max_entries.max(1),
            max_cost_bytes: max_cost_bytes.max(1),
        }
    }
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MAX_COST_BYTES)
    }
}

/// Result of a `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// A new entry was added after evicting `evicted` others.
    Inserted {
        /// Number of entries evicted to make room.
        evicted: usize,
    },
    /// An existing entry under the same key was replaced.
    Replaced {
        /// Number of other entries evicted to make room.
        evicted: usize,
    },
    /// The image alone exceeds the cost limit; the cache was left untouched.
    Rejected {
        /// Cost of the rejected image.
        cost: u64,
        /// The configured cost limit.
        limit: u64,
    },
}

impl StoreOutcome {
    /// Returns true if the image is now cached.
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of successful stores.
    pub inserts: u64,
    /// Number of entries evicted to satisfy a limit.
    pub evictions: u64,
    /// Number of stores rejected as oversized.
    pub rejections: u64,
    /// Current number of cached images.
    pub entries: usize,
    /// Current aggregate cost in bytes.
    pub total_cost: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images ({} bytes), {:.1}% hit rate ({} hits, {} misses, {} evictions, {} rejected)",
            self.entries,
            self.total_cost,
            self.hit_rate,
            self.hits,
            self.misses,
            self.evictions,
            self.rejections
        )
    }
}

/// Port for image caching operations.
/// Implementations must be thread-safe; every method is synchronous and non-blocking
/// beyond a short internal lock.
pub trait ImageCachePort: Send + Sync {
    /// Returns the cached image and marks it most recently used.
    fn get(&self, key: &CacheKey) -> Option<CachedImage>;

    /// Returns the cached image without touching recency.
    fn peek(&self, key: &CacheKey) -> Option<CachedImage>;

    /// Inserts or replaces an image, evicting as needed.
    fn put(&self, key: CacheKey, image: CachedImage) -> StoreOutcome;

    /// Removes an image from the cache.
    fn remove(&self, key: &CacheKey) -> Option<CachedImage>;

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the aggregate cost of all cached images.
    fn total_cost(&self) -> u64;

    /// Returns the configured limits.
    fn limits(&self) -> CacheLimits;

    /// Returns a snapshot of cache statistics.
    fn stats(&self) -> CacheStats;

    /// Clears all images from the cache.
    fn clear(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = CacheLimits::default();
        assert_eq!(limits.max_entries, 100);
        assert_eq!(limits.max_cost_bytes, 104_857_600);
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let limits = CacheLimits::new(0, 0);
        assert_eq!(limits.max_entries, 1);
        assert_eq!(limits.max_cost_bytes, 1);
    }
}
