//! Domain types for decoded images and load results.

use std::sync::Arc;

use super::CacheKey;
use crate::domain::errors::ImageError;

/// A decoded bitmap held in memory, tagged with its cost for capacity accounting.
///
/// Cloning is cheap: clones share the same immutable pixel buffer, so a handle given to a
/// caller can never be used to corrupt the copy held by the cache.
#[derive(Debug, Clone)]
pub struct CachedImage {
    bitmap: Arc<image::DynamicImage>,
    cost: u64,
}

impl CachedImage {
    /// Wraps a decoded bitmap. The cost is the size of its pixel buffer in bytes.
    #[must_use]
    pub fn new(bitmap: image::DynamicImage) -> Self {
        Self::from_shared(Arc::new(bitmap))
    }

    /// Wraps an already shared bitmap.
    #[must_use]
    pub fn from_shared(bitmap: Arc<image::DynamicImage>) -> Self {
        let cost = (bitmap.as_bytes().len() as u64).max(1);
        Self { bitmap, cost }
    }

    /// Overrides the computed cost. Zero is treated as one.
    #[must_use]
    pub fn with_cost(mut self, cost: u64) -> Self {
        self.cost = cost.max(1);
        self
    }

    /// Returns the decoded bitmap.
    #[must_use]
    pub fn bitmap(&self) -> &Arc<image::DynamicImage> {
        &self.bitmap
    }

    /// Memory cost in bytes.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Returns true if both handles point at the same bitmap allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bitmap, &other.bitmap)
    }
}

impl PartialEq for CachedImage {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.cost == other.cost && *self.bitmap == *other.bitmap)
    }
}

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the in-memory cache.
    MemoryCache,
    /// Downloaded and decoded.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A successfully loaded image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// The key the image was requested under.
    pub key: CacheKey,
    /// The decoded image.
    pub image: CachedImage,
    /// Where it came from.
    pub source: ImageSource,
}

/// Terminal outcome of a single load.
///
/// Failures keep their classification so they can be logged or inspected, while the
/// public `get_image` surface collapses everything except `Loaded` to an absent result.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The image is available.
    Loaded(LoadedImage),
    /// A stage failed; no cache entry was created.
    Failed(ImageError),
    /// The caller cancelled or the deadline passed before the load finished.
    Cancelled,
}

impl LoadOutcome {
    /// Returns the image if loaded.
    #[must_use]
    pub fn image(&self) -> Option<&CachedImage> {
        match self {
            Self::Loaded(loaded) => Some(&loaded.image),
            Self::Failed(_) | Self::Cancelled => None,
        }
    }

    /// Consumes the outcome, keeping only the image.
    #[must_use]
    pub fn into_image(self) -> Option<CachedImage> {
        match self {
            Self::Loaded(loaded) => Some(loaded.image),
            Self::Failed(_) | Self::Cancelled => None,
        }
    }

    /// Returns the source of a loaded image.
    #[must_use]
    pub const fn source(&self) -> Option<ImageSource> {
        match self {
            Self::Loaded(loaded) => Some(loaded.source),
            Self::Failed(_) | Self::Cancelled => None,
        }
    }

    /// Returns the error of a failed load.
    #[must_use]
    pub const fn error(&self) -> Option<&ImageError> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Loaded(_) | Self::Cancelled => None,
        }
    }

    /// Returns true if the load was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
